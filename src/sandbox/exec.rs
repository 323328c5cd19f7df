//! Command lookup and process replacement.

use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

use crate::error::SandboxError;

/// Set to `1` in the environment of every sandboxed command.
pub const IN_CAGE_ENV: &str = "IN_CAGE";

/// Everything needed to replace the current process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    /// Executable handed to `execve`.
    pub program: PathBuf,
    /// Full argument vector, `argv[0]` included.
    pub argv: Vec<String>,
    pub env: Vec<(OsString, OsString)>,
}

/// Locate `command` the way a shell would.
///
/// Names containing `/` are taken as paths; bare names are searched in `PATH`.
pub fn find_executable(command: &str) -> Result<PathBuf, SandboxError> {
    if command.is_empty() {
        return Err(SandboxError::CommandNotFound(String::new()));
    }
    which::which(command).map_err(|e| not_found(command, e))
}

/// [`find_executable`] against an explicit search path.
pub fn find_executable_in(command: &str, path_var: &OsStr) -> Result<PathBuf, SandboxError> {
    if command.is_empty() {
        return Err(SandboxError::CommandNotFound(String::new()));
    }
    let cwd = std::env::current_dir()?;
    which::which_in(command, Some(path_var), cwd).map_err(|e| not_found(command, e))
}

fn not_found(command: &str, err: which::Error) -> SandboxError {
    tracing::debug!("lookup of {:?} failed: {}", command, err);
    SandboxError::CommandNotFound(command.to_string())
}

/// The current environment with the in-sandbox marker set.
pub fn launch_env() -> Vec<(OsString, OsString)> {
    with_marker(std::env::vars_os())
}

fn with_marker(vars: impl Iterator<Item = (OsString, OsString)>) -> Vec<(OsString, OsString)> {
    let mut env: Vec<_> = vars.filter(|(key, _)| key != IN_CAGE_ENV).collect();
    env.push((IN_CAGE_ENV.into(), "1".into()));
    env
}

/// Replace the current process with `request`. Only returns on failure.
#[cfg(unix)]
pub fn replace_process(request: &LaunchRequest) -> Result<std::convert::Infallible, SandboxError> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let to_cstring = |bytes: Vec<u8>| {
        CString::new(bytes).map_err(|e| SandboxError::ExecutionFailed(e.to_string()))
    };

    let program = to_cstring(request.program.as_os_str().as_bytes().to_vec())?;
    let argv = request
        .argv
        .iter()
        .map(|arg| to_cstring(arg.clone().into_bytes()))
        .collect::<Result<Vec<_>, _>>()?;
    let env = request
        .env
        .iter()
        .map(|(key, value)| {
            let mut entry = key.as_bytes().to_vec();
            entry.push(b'=');
            entry.extend_from_slice(value.as_bytes());
            to_cstring(entry)
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!("exec {} {:?}", request.program.display(), request.argv);

    nix::unistd::execve(&program, &argv, &env).map_err(|e| {
        SandboxError::ExecutionFailed(format!("exec {}: {}", request.program.display(), e))
    })
}

#[cfg(not(unix))]
pub fn replace_process(_request: &LaunchRequest) -> Result<std::convert::Infallible, SandboxError> {
    Err(SandboxError::UnsupportedPlatform(
        crate::utils::os_name().to_string(),
    ))
}
