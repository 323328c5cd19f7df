//! Configuration module.

pub mod builtin;
pub mod loader;
pub mod schema;

pub use builtin::{builtin_names, builtin_preset, BUILTIN_PREFIX};
pub use loader::{default_config_paths, load_config, load_config_file, parse_config};
pub use schema::{AllowPath, AutoPresetRule, Config, Defaults, Preset, PresetRules};
