//! macOS sandbox implementation using Seatbelt/sandbox-exec.

pub mod glob;
pub mod profile;

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

pub use glob::glob_to_seatbelt_regex;
pub use profile::{escape_seatbelt_string, generate_profile, STRICT_READ_ROOTS};

use crate::error::SandboxError;
use crate::policy::SandboxPlan;
use crate::sandbox::exec::{find_executable, launch_env, LaunchRequest};
use crate::sandbox::{describe_paths, PolicyCompiler};
use crate::utils::Platform;

const SANDBOX_EXEC: &str = "sandbox-exec";

/// Compiles plans to SBPL and launches them under `sandbox-exec -p`.
#[derive(Debug, Clone, Default)]
pub struct SeatbeltCompiler {
    home_dir: Option<PathBuf>,
}

impl SeatbeltCompiler {
    /// Compiler using the current user's home directory.
    pub fn new() -> Self {
        Self {
            home_dir: dirs::home_dir(),
        }
    }

    /// Compiler with an explicit home directory.
    pub fn with_home(home_dir: impl Into<PathBuf>) -> Self {
        Self {
            home_dir: Some(home_dir.into()),
        }
    }
}

impl PolicyCompiler for SeatbeltCompiler {
    type Policy = String;

    fn platform(&self) -> Platform {
        Platform::MacOS
    }

    fn compile(&self, plan: &SandboxPlan) -> String {
        generate_profile(plan, self.home_dir.as_deref())
    }

    fn describe(&self, plan: &SandboxPlan, profile: &String) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Sandbox Profile (dry-run):");
        let _ = writeln!(out, "========================================");
        let _ = writeln!(out, "Version: macOS Sandbox v1");
        let _ = writeln!(out, "Base profile: system.sb");
        let _ = writeln!(out);
        let _ = writeln!(out, "Rules:");

        if plan.allow_all {
            let _ = writeln!(out, "- Allow all operations (--allow-all flag)");
        } else {
            let _ = writeln!(out, "- Allow all operations by default");
            let _ = writeln!(out, "- Deny all file writes");
            let _ = writeln!(out, "- Allow writes to:");
            let _ = writeln!(out, "  * System temporary directories");
            if plan.allow_keychain {
                let _ = writeln!(out, "  * Keychain directories (--allow-keychain)");
            }
            describe_paths(&mut out, plan);
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "Raw profile:");
        let _ = writeln!(out, "----------------------------------------");
        out.push_str(profile);
        let _ = writeln!(out, "----------------------------------------");
        out
    }

    fn enforce(
        &self,
        plan: &SandboxPlan,
        profile: String,
        program: &Path,
    ) -> Result<LaunchRequest, SandboxError> {
        let sandbox_exec = find_executable(SANDBOX_EXEC).map_err(|_| {
            SandboxError::MissingDependency(format!("{} not found in PATH", SANDBOX_EXEC))
        })?;

        Ok(LaunchRequest {
            program: sandbox_exec,
            argv: seatbelt_argv(&profile, program, &plan.args),
            env: launch_env(),
        })
    }
}

/// Argument vector for `sandbox-exec`, with the profile passed inline.
pub fn seatbelt_argv(profile: &str, program: &Path, args: &[String]) -> Vec<String> {
    let mut argv = vec![
        SANDBOX_EXEC.to_string(),
        "-p".to_string(),
        profile.to_string(),
        program.display().to_string(),
    ];
    argv.extend(args.iter().cloned());
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> SandboxPlan {
        SandboxPlan {
            allowed_paths: vec!["/work".to_string()],
            command: "make".to_string(),
            args: vec!["-j4".to_string(), "all".to_string()],
            working_dir: PathBuf::from("/work"),
            ..Default::default()
        }
    }

    #[test]
    fn test_seatbelt_argv() {
        let argv = seatbelt_argv("(version 1)", Path::new("/usr/bin/make"), &plan().args);
        assert_eq!(
            argv,
            vec!["sandbox-exec", "-p", "(version 1)", "/usr/bin/make", "-j4", "all"]
        );
    }

    #[test]
    fn test_compile_uses_home() {
        let compiler = SeatbeltCompiler::with_home("/Users/me");
        let mut plan = plan();
        plan.allow_keychain = true;
        let profile = compiler.compile(&plan);
        assert!(profile.contains("/Users/me/Library/Keychains"));
    }

    #[test]
    fn test_describe() {
        let compiler = SeatbeltCompiler::with_home("/Users/me");
        let plan = plan();
        let profile = compiler.compile(&plan);
        let text = compiler.describe(&plan, &profile);

        assert!(text.starts_with("Sandbox Profile (dry-run):\n"));
        assert!(text.contains("- Deny all file writes"));
        assert!(text.contains("  * /work (user specified)"));
        assert!(text.contains("Raw profile:\n----------------------------------------\n(version 1)"));
    }

    #[test]
    fn test_describe_allow_all() {
        let compiler = SeatbeltCompiler::with_home("/Users/me");
        let mut plan = plan();
        plan.allow_all = true;
        let profile = compiler.compile(&plan);
        let text = compiler.describe(&plan, &profile);
        assert!(text.contains("- Allow all operations (--allow-all flag)"));
        assert!(!text.contains("Deny all file writes"));
    }
}
