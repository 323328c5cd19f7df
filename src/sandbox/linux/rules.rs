//! Landlock rule generation.
//!
//! Rules are computed from a [`SandboxPlan`] without touching the kernel so the
//! same set can be shown by `--dry-run` and applied before exec.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::policy::{DenyRule, SandboxPlan};
use crate::utils::{absolutize, is_device_path};

/// Roots that stay readable in strict mode, when they exist as directories.
pub const STRICT_READ_ROOTS: &[&str] = &[
    "/usr", "/bin", "/sbin", "/lib", "/lib64", "/etc", "/opt", "/var", "/dev", "/proc", "/sys",
];

/// What a rule's path refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleTarget {
    Dir,
    File,
}

/// Granted access class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleAccess {
    ReadOnly,
    ReadWrite,
}

/// One path-beneath rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LandlockRule {
    pub path: PathBuf,
    pub target: RuleTarget,
    pub access: RuleAccess,
    /// Allow linking and renaming across directories.
    pub refer: bool,
    /// Allow ioctl on character and block devices.
    pub ioctl_dev: bool,
}

impl LandlockRule {
    pub fn read_only(path: impl Into<PathBuf>, target: RuleTarget) -> Self {
        Self {
            path: path.into(),
            target,
            access: RuleAccess::ReadOnly,
            refer: false,
            ioctl_dev: false,
        }
    }

    pub fn read_write(path: impl Into<PathBuf>, target: RuleTarget) -> Self {
        Self {
            access: RuleAccess::ReadWrite,
            ..Self::read_only(path, target)
        }
    }

    pub fn with_refer(mut self) -> Self {
        self.refer = true;
        self
    }

    pub fn with_ioctl_dev(mut self) -> Self {
        self.ioctl_dev = true;
        self
    }
}

impl fmt::Display for LandlockRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let access = match self.access {
            RuleAccess::ReadOnly => "ro",
            RuleAccess::ReadWrite => "rw",
        };
        let target = match self.target {
            RuleTarget::Dir => "dir ",
            RuleTarget::File => "file",
        };
        write!(f, "{} {} {}", access, target, self.path.display())?;
        if self.refer {
            write!(f, " (+refer)")?;
        }
        if self.ioctl_dev {
            write!(f, " (+ioctl-dev)")?;
        }
        Ok(())
    }
}

/// Rules for one plan, with everything that could not be expressed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LandlockPolicy {
    /// No restriction is installed at all.
    pub unrestricted: bool,
    pub rules: Vec<LandlockRule>,
    /// Deny rules Landlock cannot enforce.
    pub warnings: Vec<String>,
    /// Allowances dropped because a deny rule names them.
    pub notices: Vec<String>,
}

/// Build the Landlock rule set for `plan`.
pub fn generate_rules(plan: &SandboxPlan) -> LandlockPolicy {
    let mut policy = LandlockPolicy::default();
    if plan.allow_all {
        policy.unrestricted = true;
        return policy;
    }

    let allowed: Vec<PathBuf> = plan
        .allowed_paths
        .iter()
        .map(|path| absolutize(path, &plan.working_dir))
        .collect();

    let read_denied = literal_denies(plan, |rule| rule.modes.covers_read());
    let write_denied = literal_denies(plan, |rule| rule.modes.covers_write());

    if plan.strict {
        for root in STRICT_READ_ROOTS {
            if stat_target(Path::new(root)) == Some(RuleTarget::Dir) {
                policy
                    .rules
                    .push(LandlockRule::read_only(*root, RuleTarget::Dir));
            }
        }
        let reads = plan
            .read_paths
            .iter()
            .map(|path| absolutize(path, &plan.working_dir))
            .chain(allowed.iter().cloned());
        for path in reads {
            if read_denied.contains(&path) {
                policy.notices.push(format!(
                    "skipping read allow for {} (matches deny rule)",
                    path.display()
                ));
                continue;
            }
            if let Some(target) = stat_target(&path) {
                policy.rules.push(LandlockRule::read_only(path, target));
            }
        }
    } else {
        policy
            .rules
            .push(LandlockRule::read_only("/", RuleTarget::Dir));
    }

    for rule in &plan.deny_rules {
        if rule.is_glob {
            policy.warnings.push(format!(
                "glob pattern {:?} cannot be enforced on Linux (Landlock requires literal paths); pattern will be ignored",
                rule.pattern
            ));
        } else if rule.modes.covers_read() && !plan.strict {
            policy.warnings.push(format!(
                "read deny {:?} cannot be enforced on Linux (Landlock is allowlist-only); use --strict for read protection",
                rule.pattern
            ));
        }
    }

    policy
        .rules
        .push(LandlockRule::read_write("/dev/null", RuleTarget::File));

    for path in allowed {
        if write_denied.contains(&path) {
            policy.notices.push(format!(
                "skipping write allow for {} (matches deny rule)",
                path.display()
            ));
            continue;
        }
        let Some(target) = stat_target(&path) else {
            tracing::debug!("Skipping missing allow path {}", path.display());
            continue;
        };
        policy.rules.push(write_rule(path, target));
    }

    report_shadowed_denies(plan, &mut policy);
    policy
}

fn literal_denies(plan: &SandboxPlan, covers: impl Fn(&DenyRule) -> bool) -> HashSet<PathBuf> {
    plan.deny_rules
        .iter()
        .filter(|rule| !rule.is_glob && covers(rule))
        .map(|rule| absolutize(&rule.pattern, &plan.working_dir))
        .collect()
}

fn write_rule(path: PathBuf, target: RuleTarget) -> LandlockRule {
    let device = is_device_path(&path);
    let rule = LandlockRule::read_write(path, target);
    match (target, device) {
        (_, true) => rule.with_ioctl_dev(),
        (RuleTarget::Dir, false) => rule.with_refer(),
        (RuleTarget::File, false) => rule,
    }
}

/// Warn about literal denies that overlap a granted rule.
///
/// Landlock only adds access, so a deny beneath a granted rule has no effect,
/// and neither has a deny on an ancestor of one.
fn report_shadowed_denies(plan: &SandboxPlan, policy: &mut LandlockPolicy) {
    for rule in plan.deny_rules.iter().filter(|rule| !rule.is_glob) {
        let denied = absolutize(&rule.pattern, &plan.working_dir);
        let read_denied = plan.strict && rule.modes.covers_read();
        let write_denied = rule.modes.covers_write();
        let relevant = |granted: &LandlockRule| match granted.access {
            RuleAccess::ReadOnly => read_denied,
            RuleAccess::ReadWrite => read_denied || write_denied,
        };

        let enclosing = policy.rules.iter().find(|granted| {
            let covers_path = match granted.target {
                RuleTarget::Dir => denied.starts_with(&granted.path),
                RuleTarget::File => denied == granted.path,
            };
            covers_path && relevant(granted)
        });
        if let Some(granted) = enclosing {
            policy.warnings.push(format!(
                "deny {:?} ({}) is inside granted path {} and cannot be enforced on Linux",
                rule.pattern,
                rule.modes,
                granted.path.display()
            ));
            continue;
        }

        let nested = policy
            .rules
            .iter()
            .find(|granted| granted.path.starts_with(&denied) && relevant(granted));
        if let Some(granted) = nested {
            policy.warnings.push(format!(
                "deny {:?} ({}) covers granted path {}, which stays accessible on Linux",
                rule.pattern,
                rule.modes,
                granted.path.display()
            ));
        }
    }
}

fn stat_target(path: &Path) -> Option<RuleTarget> {
    let metadata = std::fs::metadata(path).ok()?;
    Some(if metadata.is_dir() {
        RuleTarget::Dir
    } else {
        RuleTarget::File
    })
}
