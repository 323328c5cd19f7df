//! Auto-preset matching by invoked command name.

use std::path::Path;

use regex::Regex;

use crate::config::AutoPresetRule;
use crate::error::ConfigError;

/// Return the presets triggered by `command`, in rule order.
///
/// Only the basename of `command` is matched. Every rule's pattern is compiled
/// up front so a broken rule fails the invocation even when an earlier rule matched.
pub fn match_auto_presets(
    command: &str,
    rules: &[AutoPresetRule],
) -> Result<Vec<String>, ConfigError> {
    let compiled = rules
        .iter()
        .map(|rule| compile_pattern(rule).map(|re| (rule, re)))
        .collect::<Result<Vec<_>, _>>()?;

    let base = command_basename(command);

    let mut presets = Vec::new();
    for (rule, pattern) in compiled {
        let exact = rule.command.as_deref() == Some(base);
        let by_pattern = pattern.map(|re| re.is_match(base)).unwrap_or(false);
        if exact || by_pattern {
            tracing::debug!("Auto-preset rule matched {}: {:?}", base, rule.presets);
            presets.extend(rule.presets.iter().cloned());
        }
    }

    Ok(presets)
}

fn compile_pattern(rule: &AutoPresetRule) -> Result<Option<Regex>, ConfigError> {
    match rule.command_pattern.as_deref() {
        None | Some("") => Ok(None),
        Some(pattern) => Regex::new(pattern).map(Some).map_err(|e| {
            ConfigError::InvalidAutoPresetPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            }
        }),
    }
}

/// The final path segment of a command.
pub fn command_basename(command: &str) -> &str {
    Path::new(command)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(command)
}
