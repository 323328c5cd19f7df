//! Git common-directory discovery.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::SandboxError;

/// Ask git for the common directory of the repository containing `cwd`.
///
/// For worktrees this is the main repository's `.git`, which git writes to
/// even when operating in the worktree. Relative output is resolved against `cwd`.
pub fn git_common_dir(cwd: &Path) -> Result<PathBuf, SandboxError> {
    let output = Command::new("git")
        .args(["rev-parse", "--git-common-dir"])
        .current_dir(cwd)
        .output()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SandboxError::MissingDependency("git not found in PATH".to_string())
            } else {
                SandboxError::Io(e)
            }
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SandboxError::ExecutionFailed(format!(
            "failed to get git common directory: {}",
            stderr.trim()
        )));
    }

    let dir = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if dir.is_empty() {
        return Err(SandboxError::ExecutionFailed(
            "git returned an empty common directory".to_string(),
        ));
    }

    Ok(crate::utils::absolutize(dir, cwd))
}
