//! Preset inheritance resolution.

use serde::Serialize;

use crate::config::{Config, PresetRules};
use crate::error::ConfigError;

/// A preset with its `extends` chain flattened into its rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedPreset {
    /// Name the preset was requested under.
    pub name: String,
    /// Every ancestor, in the order its rules were merged.
    pub ancestors: Vec<String>,
    /// Merged rules: ancestors first, then the preset's own.
    pub rules: PresetRules,
}

/// Resolve `name` through its inheritance chain.
pub fn resolve_preset(config: &Config, name: &str) -> Result<ResolvedPreset, ConfigError> {
    let mut visiting = Vec::new();
    resolve_with(config, name, &mut visiting)
}

/// Resolve `name`, failing if it already appears on the current resolution path.
///
/// `visiting` holds the path from the root request down to the caller and is
/// restored before returning successfully, so diamonds are not mistaken for cycles.
pub fn resolve_with(
    config: &Config,
    name: &str,
    visiting: &mut Vec<String>,
) -> Result<ResolvedPreset, ConfigError> {
    if visiting.iter().any(|seen| seen == name) {
        tracing::debug!("Preset cycle: {} -> {}", visiting.join(" -> "), name);
        return Err(ConfigError::CircularPreset(name.to_string()));
    }

    let preset = config
        .get_preset(name)
        .ok_or_else(|| ConfigError::PresetNotFound(name.to_string()))?;

    if preset.extends.is_empty() {
        return Ok(ResolvedPreset {
            name: name.to_string(),
            ancestors: Vec::new(),
            rules: preset.rules.clone(),
        });
    }

    visiting.push(name.to_string());

    let mut rules = PresetRules::default();
    let mut ancestors = Vec::new();
    for parent in &preset.extends {
        let resolved = resolve_with(config, parent, visiting)?;
        rules.merge(&resolved.rules);
        ancestors.extend(resolved.ancestors);
        ancestors.push(resolved.name);
    }
    rules.merge(&preset.rules);

    visiting.pop();

    Ok(ResolvedPreset {
        name: name.to_string(),
        ancestors,
        rules,
    })
}
