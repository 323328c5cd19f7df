//! Utility modules.

pub mod debug;
pub mod env;
pub mod git;
pub mod path;
pub mod platform;

pub use debug::{init_debug_logging, CAGE_DEBUG_ENV};
pub use env::{expand_env, expand_env_with};
pub use git::git_common_dir;
pub use path::{
    absolutize, absolutize_str, clean, contains_glob_chars, is_device_path,
    resolve_symlinks_or_keep,
};
pub use platform::{os_name, Platform};
