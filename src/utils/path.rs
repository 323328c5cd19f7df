//! Path normalization utilities.

use std::path::{Component, Path, PathBuf};

/// Make `path` absolute against `base` and clean it lexically.
///
/// `.` components are dropped and `..` pops the previous component. Symlinks
/// are never consulted, so this is safe to apply to glob patterns.
pub fn absolutize(path: impl AsRef<Path>, base: &Path) -> PathBuf {
    let path = path.as_ref();
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };
    clean(&joined)
}

/// Lexically clean a path (no filesystem access).
pub fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() && !path.is_absolute() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        if path.is_absolute() {
            out.push("/");
        } else {
            out.push(".");
        }
    }
    out
}

/// String form of [`absolutize`].
pub fn absolutize_str(path: &str, base: &Path) -> String {
    absolutize(path, base).display().to_string()
}

/// Check if a path contains wildcard characters.
pub fn contains_glob_chars(path: &str) -> bool {
    path.contains('*') || path.contains('?')
}

/// Canonicalize `path`, keeping it unchanged when resolution fails.
pub fn resolve_symlinks_or_keep(path: &str) -> String {
    match std::fs::canonicalize(path) {
        Ok(canonical) => canonical.display().to_string(),
        Err(e) => {
            tracing::debug!("Could not resolve symlinks for {}: {}", path, e);
            path.to_string()
        }
    }
}

/// Whether `path` is `/dev` or lies beneath it.
pub fn is_device_path(path: &Path) -> bool {
    path.starts_with("/dev")
}
