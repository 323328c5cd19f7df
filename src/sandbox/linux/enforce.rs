//! Landlock enforcement for the current process.

use landlock::{
    Access, AccessFs, BitFlags, CompatLevel, Compatible, PathBeneath, PathFd, Ruleset,
    RulesetAttr, RulesetCreatedAttr, RulesetStatus, ABI,
};
use tracing::{debug, info};

use crate::error::SandboxError;
use crate::sandbox::linux::rules::{LandlockRule, RuleAccess, RuleTarget};

/// Highest ABI we request; older kernels get the subset they support.
const TARGET_ABI: ABI = ABI::V5;

/// How much of the ruleset the kernel applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enforcement {
    Full,
    Partial,
    None,
}

fn access_for(rule: &LandlockRule) -> BitFlags<AccessFs> {
    let mut access = match rule.access {
        RuleAccess::ReadOnly => AccessFs::from_read(TARGET_ABI),
        RuleAccess::ReadWrite => {
            AccessFs::from_all(TARGET_ABI) & !(AccessFs::Refer | AccessFs::IoctlDev)
        }
    };
    if rule.refer && rule.access == RuleAccess::ReadWrite {
        access |= AccessFs::Refer;
    }
    if rule.ioctl_dev {
        access |= AccessFs::IoctlDev;
    }
    if rule.target == RuleTarget::File {
        access &= AccessFs::from_file(TARGET_ABI);
    }
    access
}

/// Restrict the calling process to `rules`. Irreversible.
///
/// Kernels without Landlock yield [`Enforcement::None`] rather than an error.
pub fn apply_rules(rules: &[LandlockRule]) -> Result<Enforcement, SandboxError> {
    info!("Using Landlock ABI {:?}", TARGET_ABI);

    let mut ruleset = Ruleset::default()
        .set_compatibility(CompatLevel::BestEffort)
        .handle_access(AccessFs::from_all(TARGET_ABI))
        .map_err(|e| SandboxError::Landlock(format!("failed to handle fs access: {}", e)))?
        .create()
        .map_err(|e| SandboxError::Landlock(format!("failed to create ruleset: {}", e)))?;

    for rule in rules {
        let access = access_for(rule);
        debug!("Adding rule: {} with access {:?}", rule, access);

        let path_fd = PathFd::new(&rule.path).map_err(|e| {
            SandboxError::Landlock(format!("cannot open {}: {}", rule.path.display(), e))
        })?;
        ruleset = ruleset
            .add_rule(PathBeneath::new(path_fd, access))
            .map_err(|e| {
                SandboxError::Landlock(format!(
                    "cannot add rule for {}: {}",
                    rule.path.display(),
                    e
                ))
            })?;
    }

    let status = ruleset
        .restrict_self()
        .map_err(|e| SandboxError::Landlock(format!("failed to restrict self: {}", e)))?;

    Ok(match status.ruleset {
        RulesetStatus::FullyEnforced => Enforcement::Full,
        RulesetStatus::PartiallyEnforced => Enforcement::Partial,
        RulesetStatus::NotEnforced => Enforcement::None,
    })
}
