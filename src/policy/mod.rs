//! Policy pipeline: preset resolution, path normalization, auto-preset
//! matching and aggregation into a [`SandboxPlan`].

pub mod auto;
pub mod normalize;
pub mod plan;
pub mod resolve;
pub mod rules;

pub use auto::{command_basename, match_auto_presets};
pub use normalize::{normalize, normalize_with};
pub use plan::{build_plan, select_presets, PlanRequest, SandboxPlan};
pub use resolve::{resolve_preset, resolve_with, ResolvedPreset};
pub use rules::{AccessMode, DenyRule};
