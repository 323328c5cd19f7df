//! cage - run a command with filesystem access restricted by layered presets.
//!
//! Presets and command-line flags are merged into one [`SandboxPlan`], which a
//! platform compiler turns into native enforcement:
//! - macOS: Seatbelt profile run through `sandbox-exec`
//! - Linux: Landlock rules applied to the process before exec

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod policy;
pub mod sandbox;
pub mod utils;

pub use config::{AllowPath, Config, Preset, PresetRules};
pub use error::{ConfigError, Result, SandboxError};
pub use policy::{build_plan, AccessMode, DenyRule, PlanRequest, SandboxPlan};
pub use sandbox::{LandlockCompiler, LaunchRequest, PolicyCompiler, SeatbeltCompiler};

/// Re-export commonly used items.
pub mod prelude {
    pub use crate::config::{load_config, Config};
    pub use crate::error::{Result, SandboxError};
    pub use crate::policy::{build_plan, PlanRequest, SandboxPlan};
    pub use crate::sandbox::PolicyCompiler;
}
