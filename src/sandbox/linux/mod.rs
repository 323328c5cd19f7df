//! Linux sandbox implementation using Landlock LSM.

#[cfg(target_os = "linux")]
pub mod enforce;
pub mod rules;

use std::fmt::Write as _;
use std::path::Path;

pub use rules::{
    generate_rules, LandlockPolicy, LandlockRule, RuleAccess, RuleTarget, STRICT_READ_ROOTS,
};

use crate::error::SandboxError;
use crate::policy::SandboxPlan;
use crate::sandbox::exec::{launch_env, LaunchRequest};
use crate::sandbox::{describe_paths, PolicyCompiler};
use crate::utils::Platform;

/// Compiles plans to Landlock rules and restricts the current process.
#[derive(Debug, Clone, Copy, Default)]
pub struct LandlockCompiler;

impl LandlockCompiler {
    pub fn new() -> Self {
        Self
    }
}

impl PolicyCompiler for LandlockCompiler {
    type Policy = LandlockPolicy;

    fn platform(&self) -> Platform {
        Platform::Linux
    }

    fn compile(&self, plan: &SandboxPlan) -> LandlockPolicy {
        let policy = generate_rules(plan);
        for warning in &policy.warnings {
            tracing::warn!("{}", warning);
        }
        for notice in &policy.notices {
            tracing::info!("{}", notice);
        }
        policy
    }

    fn describe(&self, plan: &SandboxPlan, policy: &LandlockPolicy) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Sandbox Profile (dry-run):");
        let _ = writeln!(out, "========================================");
        let _ = writeln!(out, "Platform: Linux");
        let _ = writeln!(out, "Technology: Landlock LSM");
        let _ = writeln!(out);
        let _ = writeln!(out, "The following restrictions would be applied:");
        let _ = writeln!(out);
        let _ = writeln!(out, "Rules:");

        if policy.unrestricted {
            let _ = writeln!(out, "- Allow all operations (--allow-all flag)");
            return out;
        }

        if plan.strict {
            let _ = writeln!(out, "- Allow read access to system directories only");
        } else {
            let _ = writeln!(out, "- Allow read access to all files");
        }
        let _ = writeln!(out, "- Deny write access except to:");
        let _ = writeln!(out, "  * /dev/null (for discarding output)");
        describe_paths(&mut out, plan);

        let _ = writeln!(out);
        let _ = writeln!(out, "Landlock rules:");
        let _ = writeln!(out, "----------------------------------------");
        for rule in &policy.rules {
            let _ = writeln!(out, "{}", rule);
        }
        let _ = writeln!(out, "----------------------------------------");

        for warning in &policy.warnings {
            let _ = writeln!(out, "warning: {}", warning);
        }
        for notice in &policy.notices {
            let _ = writeln!(out, "info: {}", notice);
        }
        out
    }

    fn enforce(
        &self,
        plan: &SandboxPlan,
        policy: LandlockPolicy,
        program: &Path,
    ) -> Result<LaunchRequest, SandboxError> {
        if !policy.unrestricted {
            restrict(&policy)?;
        }

        let mut argv = vec![plan.command.clone()];
        argv.extend(plan.args.iter().cloned());
        Ok(LaunchRequest {
            program: program.to_path_buf(),
            argv,
            env: launch_env(),
        })
    }
}

#[cfg(target_os = "linux")]
fn restrict(policy: &LandlockPolicy) -> Result<(), SandboxError> {
    match enforce::apply_rules(&policy.rules)? {
        enforce::Enforcement::Full => tracing::debug!("Landlock sandbox fully enforced"),
        enforce::Enforcement::Partial => {
            tracing::debug!("Landlock sandbox enforced in best-effort mode")
        }
        enforce::Enforcement::None => tracing::warn!(
            "Landlock is not available on this kernel; running without filesystem restrictions"
        ),
    }
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn restrict(_policy: &LandlockPolicy) -> Result<(), SandboxError> {
    Err(SandboxError::UnsupportedPlatform(format!(
        "Landlock requires Linux, running on {}",
        crate::utils::os_name()
    )))
}
