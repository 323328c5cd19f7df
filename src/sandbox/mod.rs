//! Platform-specific sandbox implementations.
//!
//! Both compilers are pure and build on every platform so their output can be
//! inspected anywhere; only enforcement is tied to the host OS.

pub mod exec;
pub mod linux;
pub mod macos;

use std::convert::Infallible;
use std::fmt::Write as _;
use std::path::Path;

use serde::Serialize;

pub use exec::{find_executable, launch_env, replace_process, LaunchRequest, IN_CAGE_ENV};
pub use linux::LandlockCompiler;
pub use macos::SeatbeltCompiler;

use crate::error::SandboxError;
use crate::output::{render_dry_run, OutputFormat};
use crate::policy::SandboxPlan;
use crate::utils::Platform;

/// Turns a [`SandboxPlan`] into a platform policy and installs it.
pub trait PolicyCompiler {
    /// The compiled, platform-native form of a plan.
    type Policy: Serialize;

    fn platform(&self) -> Platform;

    /// Compile `plan`. Never touches process state.
    fn compile(&self, plan: &SandboxPlan) -> Self::Policy;

    /// Human-readable summary for `--dry-run`.
    fn describe(&self, plan: &SandboxPlan, policy: &Self::Policy) -> String;

    /// Apply `policy` where that happens in-process and return what to exec.
    ///
    /// `program` is the resolved path of the plan's command.
    fn enforce(
        &self,
        plan: &SandboxPlan,
        policy: Self::Policy,
        program: &Path,
    ) -> Result<LaunchRequest, SandboxError>;
}

/// Compile, enforce and exec. Only returns on failure.
pub fn launch<C: PolicyCompiler>(
    compiler: &C,
    plan: &SandboxPlan,
) -> Result<Infallible, SandboxError> {
    let program = find_executable(&plan.command)?;
    let policy = compiler.compile(plan);
    let request = compiler.enforce(plan, policy, &program)?;
    replace_process(&request)
}

/// Run `plan` under the host platform's sandbox.
pub fn launch_native(plan: &SandboxPlan) -> Result<Infallible, SandboxError> {
    match Platform::current() {
        Some(Platform::MacOS) => launch(&SeatbeltCompiler::new(), plan),
        Some(Platform::Linux) => launch(&LandlockCompiler::new(), plan),
        None => Err(unsupported()),
    }
}

/// Render the `--dry-run` output for `plan` on the host platform.
pub fn dry_run_native(plan: &SandboxPlan, format: OutputFormat) -> Result<String, SandboxError> {
    match Platform::current() {
        Some(Platform::MacOS) => render_dry_run(&SeatbeltCompiler::new(), plan, format),
        Some(Platform::Linux) => render_dry_run(&LandlockCompiler::new(), plan, format),
        None => Err(unsupported()),
    }
}

fn unsupported() -> SandboxError {
    SandboxError::UnsupportedPlatform(format!(
        "{} (cage supports macOS and Linux)",
        crate::utils::os_name()
    ))
}

/// Shared dry-run lines for the paths a plan grants and denies.
pub(crate) fn describe_paths(out: &mut String, plan: &SandboxPlan) {
    for path in &plan.allowed_paths {
        let source = if plan.allow_git && path.contains(".git") {
            "--allow-git"
        } else {
            "user specified"
        };
        let _ = writeln!(out, "  * {} ({})", path, source);
    }

    if plan.strict && !plan.read_paths.is_empty() {
        let _ = writeln!(out, "- Allow reads from:");
        for path in &plan.read_paths {
            let _ = writeln!(out, "  * {}", path);
        }
    }

    if !plan.deny_rules.is_empty() {
        let _ = writeln!(out, "- Deny:");
        for rule in &plan.deny_rules {
            let kind = if rule.is_glob { ", glob" } else { "" };
            let _ = writeln!(out, "  * {} ({}{})", rule.pattern, rule.modes, kind);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{AccessMode, DenyRule};

    #[test]
    fn test_describe_paths() {
        let plan = SandboxPlan {
            allow_git: true,
            strict: true,
            allowed_paths: vec!["/work".to_string(), "/repo/.git".to_string()],
            read_paths: vec!["/home/me/.config".to_string()],
            deny_rules: vec![
                DenyRule::new("/home/me/.ssh", AccessMode::ReadWrite),
                DenyRule::new("/home/*/x", AccessMode::Read),
            ],
            ..Default::default()
        };
        let mut out = String::new();
        describe_paths(&mut out, &plan);

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            vec![
                "  * /work (user specified)",
                "  * /repo/.git (--allow-git)",
                "- Allow reads from:",
                "  * /home/me/.config",
                "- Deny:",
                "  * /home/me/.ssh (read+write)",
                "  * /home/*/x (read, glob)",
            ]
        );
    }

    #[test]
    fn test_launch_unknown_command() {
        let plan = SandboxPlan {
            command: "definitely-not-a-command-xyz".to_string(),
            ..Default::default()
        };
        let err = launch(&LandlockCompiler::new(), &plan).unwrap_err();
        assert!(matches!(err, SandboxError::CommandNotFound(_)));
    }
}
