//! Environment variable expansion.
//!
//! Only `$VAR` and `${VAR}` are substituted. Nothing is executed and no
//! quoting or globbing is interpreted, so `$(cmd)` passes through verbatim.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static ENV_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)")
        .expect("static env reference regex")
});

/// Expand variables from the process environment. Unset variables become empty.
///
/// `HOME` falls back to the platform home directory when unset.
pub fn expand_env(input: &str) -> String {
    expand_env_with(input, |name| match std::env::var(name) {
        Ok(value) => Some(value),
        Err(_) if name == "HOME" => dirs::home_dir().map(|home| home.display().to_string()),
        Err(_) => None,
    })
}

/// Expand variables using `lookup`. Unresolved variables become empty.
pub fn expand_env_with<F>(input: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    match ENV_REF.replace_all(input, |caps: &Captures| {
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str())
            .unwrap_or_default();
        lookup(name).unwrap_or_default()
    }) {
        Cow::Borrowed(s) => s.to_string(),
        Cow::Owned(s) => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "TEST_VAR" => Some("test_value".to_string()),
            "HOME" => Some("/home/tester".to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_expand_forms() {
        assert_eq!(expand_env_with("/tmp/test", lookup), "/tmp/test");
        assert_eq!(expand_env_with("${TEST_VAR}/path", lookup), "test_value/path");
        assert_eq!(expand_env_with("$TEST_VAR/path", lookup), "test_value/path");
        assert_eq!(expand_env_with("$HOME/.config", lookup), "/home/tester/.config");
    }

    #[test]
    fn test_unset_expands_to_empty() {
        assert_eq!(expand_env_with("$MISSING/x", lookup), "/x");
        assert_eq!(expand_env_with("a${MISSING}b", lookup), "ab");
    }

    #[test]
    fn test_no_shell_semantics() {
        assert_eq!(expand_env_with("$(echo /x)/y", lookup), "$(echo /x)/y");
        assert_eq!(expand_env_with("`id`/y", lookup), "`id`/y");
        assert_eq!(
            expand_env_with("/path'with\"quotes/test", lookup),
            "/path'with\"quotes/test"
        );
        assert_eq!(expand_env_with("/path with spaces", lookup), "/path with spaces");
        assert_eq!(expand_env_with("/cost/$5", lookup), "/cost/$5");
        assert_eq!(expand_env_with("trailing$", lookup), "trailing$");
    }

    #[test]
    fn test_expand_env_uses_process_environment() {
        let home = std::env::var("HOME")
            .ok()
            .or_else(|| dirs::home_dir().map(|h| h.display().to_string()))
            .unwrap();
        assert_eq!(expand_env("$HOME/.npm"), format!("{}/.npm", home));
        assert_eq!(expand_env("$(echo /tmp)/test"), "$(echo /tmp)/test");
    }
}
