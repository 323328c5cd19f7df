//! Aggregation of presets and CLI flags into one sandbox plan.

use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::{AllowPath, Config, PresetRules};
use crate::error::SandboxError;
use crate::policy::auto::match_auto_presets;
use crate::policy::normalize::normalize;
use crate::policy::resolve::{resolve_preset, ResolvedPreset};
use crate::policy::rules::{AccessMode, DenyRule};
use crate::utils::absolutize_str;

/// The platform-neutral policy consumed by the compilers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SandboxPlan {
    /// Grant unrestricted access; all other fields are informational.
    pub allow_all: bool,
    pub allow_keychain: bool,
    pub allow_git: bool,
    pub strict: bool,
    /// Writable (and readable) absolute paths, unique, in first-seen order.
    pub allowed_paths: Vec<String>,
    /// Additional readable absolute paths for strict mode.
    pub read_paths: Vec<String>,
    pub deny_rules: Vec<DenyRule>,
    pub command: String,
    pub args: Vec<String>,
    /// Directory relative paths were resolved against.
    pub working_dir: PathBuf,
}

/// Everything the command line contributes to a plan.
#[derive(Debug, Clone, Default)]
pub struct PlanRequest {
    /// Presets named with `--preset`, in order.
    pub presets: Vec<String>,
    /// Ignore the config-level default presets.
    pub no_defaults: bool,
    pub allow: Vec<String>,
    pub allow_read: Vec<String>,
    pub deny: Vec<String>,
    pub deny_read: Vec<String>,
    pub deny_write: Vec<String>,
    pub strict: bool,
    pub allow_keychain: bool,
    pub allow_git: bool,
    pub allow_all: bool,
    pub command: String,
    pub args: Vec<String>,
}

/// Resolve the presets a request selects, in application order.
///
/// Order is: config defaults, `--preset` names, then auto-detected presets.
/// Defaults are dropped when the request disables them or any selected
/// preset carries `skip-defaults`.
pub fn select_presets(
    config: &Config,
    request: &PlanRequest,
) -> Result<Vec<ResolvedPreset>, SandboxError> {
    let auto = match_auto_presets(&request.command, &config.auto_presets)?;
    if !auto.is_empty() {
        tracing::debug!("Auto-detected presets for {}: {:?}", request.command, auto);
    }

    let selected = request
        .presets
        .iter()
        .chain(auto.iter())
        .map(|name| resolve_preset(config, name))
        .collect::<Result<Vec<_>, _>>()?;

    let skip_defaults =
        request.no_defaults || selected.iter().any(|preset| preset.rules.skip_defaults);

    let mut ordered = Vec::new();
    if skip_defaults {
        tracing::debug!("Skipping default presets");
    } else {
        for name in &config.defaults.presets {
            ordered.push(resolve_preset(config, name)?);
        }
    }
    ordered.extend(selected);

    Ok(ordered)
}

/// Build the sandbox plan for `request`.
///
/// `git_lookup` is called at most once, only when git access ends up enabled
/// and no allowed path already names a `.git` directory; its failure is logged
/// and contributes nothing.
pub fn build_plan<G>(
    config: &Config,
    request: &PlanRequest,
    cwd: &Path,
    git_lookup: G,
) -> Result<SandboxPlan, SandboxError>
where
    G: FnOnce(&Path) -> Result<PathBuf, SandboxError>,
{
    let presets = select_presets(config, request)?;

    let mut builder = PlanBuilder::new(cwd);
    for preset in &presets {
        tracing::debug!("Applying preset {}", preset.name);
        builder.add_rules(&normalize(&preset.rules));
    }

    builder.add_rules(&cli_rules(request));

    if builder.allow_git && !builder.has_git_dir() {
        match git_lookup(cwd) {
            Ok(dir) => builder.add_allow(&dir.display().to_string()),
            Err(e) => tracing::warn!("--allow-git: {}", e),
        }
    }

    Ok(builder.finish(request))
}

/// The request's own paths and flags, already literal.
fn cli_rules(request: &PlanRequest) -> PresetRules {
    let paths = |list: &[String]| -> Vec<AllowPath> {
        list.iter().map(AllowPath::new).collect()
    };
    PresetRules {
        skip_defaults: false,
        strict: request.strict,
        allow_keychain: request.allow_keychain,
        allow_git: request.allow_git,
        allow: paths(&request.allow),
        read: paths(&request.allow_read),
        deny: paths(&request.deny),
        deny_read: paths(&request.deny_read),
        deny_write: paths(&request.deny_write),
    }
}

struct PlanBuilder<'a> {
    cwd: &'a Path,
    allowed_paths: Vec<String>,
    allowed_seen: HashSet<String>,
    read_paths: Vec<String>,
    read_seen: HashSet<String>,
    deny_rules: Vec<DenyRule>,
    strict: bool,
    allow_keychain: bool,
    allow_git: bool,
}

impl<'a> PlanBuilder<'a> {
    fn new(cwd: &'a Path) -> Self {
        Self {
            cwd,
            allowed_paths: Vec::new(),
            allowed_seen: HashSet::new(),
            read_paths: Vec::new(),
            read_seen: HashSet::new(),
            deny_rules: Vec::new(),
            strict: false,
            allow_keychain: false,
            allow_git: false,
        }
    }

    fn add_rules(&mut self, rules: &PresetRules) {
        for path in &rules.allow {
            self.add_allow(&path.path);
        }
        for path in &rules.read {
            self.add_read(&path.path);
        }
        for path in &rules.deny {
            self.add_deny(&path.path, AccessMode::ReadWrite);
        }
        for path in &rules.deny_read {
            self.add_deny(&path.path, AccessMode::Read);
        }
        for path in &rules.deny_write {
            self.add_deny(&path.path, AccessMode::Write);
        }

        self.strict |= rules.strict;
        self.allow_keychain |= rules.allow_keychain;
        self.allow_git |= rules.allow_git;
    }

    /// Absolute form of `path`, or `None` for paths that expanded to nothing.
    fn absolute(&self, path: &str) -> Option<String> {
        if path.trim().is_empty() {
            tracing::warn!("ignoring empty path (unset environment variable?)");
            return None;
        }
        Some(absolutize_str(path, self.cwd))
    }

    fn add_allow(&mut self, path: &str) {
        if let Some(abs) = self.absolute(path) {
            if self.allowed_seen.insert(abs.clone()) {
                self.allowed_paths.push(abs);
            }
        }
    }

    fn has_git_dir(&self) -> bool {
        self.allowed_paths
            .iter()
            .any(|path| Path::new(path).file_name() == Some(OsStr::new(".git")))
    }

    fn add_read(&mut self, path: &str) {
        if let Some(abs) = self.absolute(path) {
            if self.read_seen.insert(abs.clone()) {
                self.read_paths.push(abs);
            }
        }
    }

    fn add_deny(&mut self, pattern: &str, modes: AccessMode) {
        if let Some(abs) = self.absolute(pattern) {
            let rule = DenyRule::new(abs, modes);
            if !self.deny_rules.contains(&rule) {
                self.deny_rules.push(rule);
            }
        }
    }

    fn finish(self, request: &PlanRequest) -> SandboxPlan {
        SandboxPlan {
            allow_all: request.allow_all,
            allow_keychain: self.allow_keychain,
            allow_git: self.allow_git,
            strict: self.strict,
            allowed_paths: self.allowed_paths,
            read_paths: self.read_paths,
            deny_rules: self.deny_rules,
            command: request.command.clone(),
            args: request.args.clone(),
            working_dir: self.cwd.to_path_buf(),
        }
    }
}
