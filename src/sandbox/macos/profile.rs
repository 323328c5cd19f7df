//! Seatbelt profile generation for macOS sandbox.

use std::path::Path;

use crate::policy::{DenyRule, SandboxPlan};
use crate::sandbox::macos::glob::glob_to_seatbelt_regex;
use crate::utils::absolutize_str;

/// Per-user temporary and cache directories handed out by the system.
const TEMP_DIR_REGEX: &str = r"^/private/var/folders/[^/]+/[^/]+/(C|T|0)($|/)";

/// Roots that stay readable in strict mode.
pub const STRICT_READ_ROOTS: &[&str] = &[
    "/usr",
    "/bin",
    "/sbin",
    "/lib",
    "/etc",
    "/opt",
    "/var",
    "/dev",
    "/System",
    "/Library",
    "/Applications",
    "/private/var/folders",
];

/// Generate a Seatbelt profile for `plan`.
///
/// `home_dir` is only consulted for the keychain allowance; when it is unknown
/// the allowance is dropped with a warning.
pub fn generate_profile(plan: &SandboxPlan, home_dir: Option<&Path>) -> String {
    let mut profile = String::new();

    profile.push_str("(version 1)\n");
    profile.push_str("(import \"system.sb\")\n");
    profile.push_str("(allow default)\n");

    if plan.allow_all {
        return profile;
    }

    let allowed: Vec<String> = plan
        .allowed_paths
        .iter()
        .map(|path| absolutize_str(path, &plan.working_dir))
        .collect();

    generate_write_rules(&mut profile, plan, &allowed, home_dir);

    if plan.strict {
        generate_strict_read_rules(&mut profile, plan, &allowed);
    }

    for rule in &plan.deny_rules {
        generate_deny_rule(&mut profile, rule);
    }

    profile
}

fn generate_write_rules(
    profile: &mut String,
    plan: &SandboxPlan,
    allowed: &[String],
    home_dir: Option<&Path>,
) {
    profile.push_str("(deny file-write*)\n");
    profile.push_str(&format!(
        "(allow file-write* (regex #\"{}\"))\n",
        TEMP_DIR_REGEX
    ));

    if plan.allow_keychain {
        match home_dir {
            Some(home) => {
                let keychains = home.join("Library/Keychains").display().to_string();
                profile.push_str(&format!(
                    "(allow file-write* (subpath \"{}\"))\n",
                    escape_seatbelt_string(&keychains)
                ));
            }
            None => tracing::warn!("--allow-keychain: home directory unknown, skipping"),
        }
    }

    for path in allowed {
        push_path_rules(profile, "allow file-write*", path);
    }
}

fn generate_strict_read_rules(profile: &mut String, plan: &SandboxPlan, allowed: &[String]) {
    profile.push_str("(deny file-read*)\n");

    for root in STRICT_READ_ROOTS {
        profile.push_str(&format!("(allow file-read* (subpath \"{}\"))\n", root));
    }

    for path in &plan.read_paths {
        let abs = absolutize_str(path, &plan.working_dir);
        push_path_rules(profile, "allow file-read*", &abs);
    }

    for path in allowed {
        push_path_rules(profile, "allow file-read*", path);
    }
}

/// Emit a subpath rule for the tree and a literal rule for the node itself.
fn push_path_rules(profile: &mut String, action: &str, path: &str) {
    let escaped = escape_seatbelt_string(path);
    profile.push_str(&format!("({} (subpath \"{}\"))\n", action, escaped));
    profile.push_str(&format!("({} (literal \"{}\"))\n", action, escaped));
}

fn generate_deny_rule(profile: &mut String, rule: &DenyRule) {
    let filter = if rule.is_glob {
        format!("(regex #\"{}\")", glob_to_seatbelt_regex(&rule.pattern))
    } else {
        format!("(subpath \"{}\")", escape_seatbelt_string(&rule.pattern))
    };

    if rule.modes.covers_read() {
        profile.push_str(&format!("(deny file-read* {})\n", filter));
    }
    if rule.modes.covers_write() {
        profile.push_str(&format!("(deny file-write* {})\n", filter));
    }
}

/// Escape a string for use in a Seatbelt profile.
pub fn escape_seatbelt_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::AccessMode;
    use std::path::PathBuf;

    fn plan() -> SandboxPlan {
        SandboxPlan {
            command: "echo".to_string(),
            working_dir: PathBuf::from("/work"),
            ..Default::default()
        }
    }

    fn line_index(profile: &str, needle: &str) -> usize {
        profile
            .lines()
            .position(|line| line == needle)
            .unwrap_or_else(|| panic!("missing line {needle:?} in:\n{profile}"))
    }

    #[test]
    fn test_escape_seatbelt_string() {
        assert_eq!(escape_seatbelt_string("simple"), "simple");
        assert_eq!(escape_seatbelt_string("with\\slash"), "with\\\\slash");
        assert_eq!(escape_seatbelt_string("with\"quote"), "with\\\"quote");
    }

    #[test]
    fn test_allow_all_is_header_only() {
        let mut plan = plan();
        plan.allow_all = true;
        plan.allowed_paths = vec!["/tmp".to_string()];
        plan.deny_rules = vec![DenyRule::new("/secret", AccessMode::ReadWrite)];

        let profile = generate_profile(&plan, None);
        assert_eq!(
            profile,
            "(version 1)\n(import \"system.sb\")\n(allow default)\n"
        );
    }

    #[test]
    fn test_write_rules() {
        let mut plan = plan();
        plan.allowed_paths = vec!["/tmp/out".to_string(), "rel/dir".to_string()];

        let profile = generate_profile(&plan, None);
        assert!(profile.starts_with("(version 1)\n(import \"system.sb\")\n(allow default)\n"));
        assert!(profile.contains("(deny file-write*)\n"));
        assert!(profile.contains(
            "(allow file-write* (regex #\"^/private/var/folders/[^/]+/[^/]+/(C|T|0)($|/)\"))"
        ));
        assert!(profile.contains("(allow file-write* (subpath \"/tmp/out\"))"));
        assert!(profile.contains("(allow file-write* (literal \"/tmp/out\"))"));
        assert!(profile.contains("(allow file-write* (subpath \"/work/rel/dir\"))"));
        assert!(!profile.contains("file-read*"));
    }

    #[test]
    fn test_keychain() {
        let mut plan = plan();
        plan.allow_keychain = true;

        let profile = generate_profile(&plan, Some(Path::new("/Users/me")));
        assert!(profile.contains("(allow file-write* (subpath \"/Users/me/Library/Keychains\"))"));

        let profile = generate_profile(&plan, None);
        assert!(!profile.contains("Keychains"));
    }

    #[test]
    fn test_strict_read_rules() {
        let mut plan = plan();
        plan.strict = true;
        plan.read_paths = vec!["/home/me/.config".to_string()];
        plan.allowed_paths = vec!["/work".to_string()];

        let profile = generate_profile(&plan, None);
        let deny_read = line_index(&profile, "(deny file-read*)");
        assert!(deny_read > line_index(&profile, "(deny file-write*)"));
        for root in STRICT_READ_ROOTS {
            let rule = format!("(allow file-read* (subpath \"{}\"))", root);
            assert!(line_index(&profile, &rule) > deny_read);
        }
        assert!(profile.contains("(allow file-read* (subpath \"/home/me/.config\"))"));
        assert!(profile.contains("(allow file-read* (literal \"/home/me/.config\"))"));
        assert!(profile.contains("(allow file-read* (subpath \"/work\"))"));
        assert!(profile.contains("(allow file-read* (literal \"/work\"))"));
    }

    #[test]
    fn test_read_paths_ignored_outside_strict() {
        let mut plan = plan();
        plan.read_paths = vec!["/home/me/.config".to_string()];
        let profile = generate_profile(&plan, None);
        assert!(!profile.contains("/home/me/.config"));
    }

    #[test]
    fn test_deny_rules_come_last() {
        let mut plan = plan();
        plan.strict = true;
        plan.allowed_paths = vec!["/home/me".to_string()];
        plan.deny_rules = vec![
            DenyRule::new("/home/me/.ssh", AccessMode::ReadWrite),
            DenyRule::new("/home/*/secrets", AccessMode::Read),
            DenyRule::new("/home/me/.env", AccessMode::Write),
        ];

        let profile = generate_profile(&plan, None);
        let lines: Vec<&str> = profile.lines().collect();
        let last_allow = lines
            .iter()
            .rposition(|line| line.starts_with("(allow"))
            .unwrap();

        let ssh_read = line_index(&profile, "(deny file-read* (subpath \"/home/me/.ssh\"))");
        let ssh_write = line_index(&profile, "(deny file-write* (subpath \"/home/me/.ssh\"))");
        let glob = line_index(
            &profile,
            "(deny file-read* (regex #\"^/home/[^/]*/secrets(/|$)\"))",
        );
        let env = line_index(&profile, "(deny file-write* (subpath \"/home/me/.env\"))");

        assert!(ssh_read > last_allow);
        assert!(ssh_read < ssh_write);
        assert!(ssh_write < glob);
        assert!(glob < env);
        assert!(!profile.contains("(deny file-write* (regex"));
        assert!(!profile.contains("(deny file-read* (subpath \"/home/me/.env\"))"));
    }

    #[test]
    fn test_paths_are_escaped() {
        let mut plan = plan();
        plan.allowed_paths = vec!["/tmp/we\"ird".to_string()];
        let profile = generate_profile(&plan, None);
        assert!(profile.contains("(allow file-write* (subpath \"/tmp/we\\\"ird\"))"));
    }
}
