//! Path expansion for resolved presets.

use crate::config::{AllowPath, PresetRules};
use crate::utils::{contains_glob_chars, expand_env, resolve_symlinks_or_keep};

/// Expand every path of `rules` using the process environment.
pub fn normalize(rules: &PresetRules) -> PresetRules {
    normalize_with(rules, expand_env)
}

/// Expand every path of `rules` with `expand`, then resolve symlinks where requested.
///
/// Flags are carried over untouched. Glob patterns are never resolved.
pub fn normalize_with<F>(rules: &PresetRules, expand: F) -> PresetRules
where
    F: Fn(&str) -> String,
{
    let expand_all = |paths: &[AllowPath]| -> Vec<AllowPath> {
        paths.iter().map(|p| expand_path(p, &expand)).collect()
    };

    PresetRules {
        skip_defaults: rules.skip_defaults,
        strict: rules.strict,
        allow_keychain: rules.allow_keychain,
        allow_git: rules.allow_git,
        allow: expand_all(&rules.allow),
        read: expand_all(&rules.read),
        deny: expand_all(&rules.deny),
        deny_read: expand_all(&rules.deny_read),
        deny_write: expand_all(&rules.deny_write),
    }
}

fn expand_path<F>(path: &AllowPath, expand: &F) -> AllowPath
where
    F: Fn(&str) -> String,
{
    let expanded = expand(&path.path);
    let expanded = if path.resolve_symlinks && !contains_glob_chars(&expanded) {
        resolve_symlinks_or_keep(&expanded)
    } else {
        expanded
    };
    AllowPath::new(expanded)
}
