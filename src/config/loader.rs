//! Configuration loader for `cage/presets.yaml`.

use std::path::{Path, PathBuf};

use crate::config::schema::Config;
use crate::error::{ConfigError, SandboxError};

/// Directory under the user config dir holding the presets file.
const CONFIG_DIR_NAME: &str = "cage";

/// Candidate file names, in lookup order.
const CONFIG_FILE_NAMES: &[&str] = &["presets.yaml", "presets.yml"];

/// The user config directory: `$XDG_CONFIG_HOME`, else `~/.config`.
pub fn user_config_dir() -> Option<PathBuf> {
    match std::env::var_os("XDG_CONFIG_HOME") {
        Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => dirs::home_dir().map(|home| home.join(".config")),
    }
}

/// Default presets file locations, in lookup order.
pub fn default_config_paths() -> Vec<PathBuf> {
    user_config_dir()
        .map(|dir| {
            CONFIG_FILE_NAMES
                .iter()
                .map(|name| dir.join(CONFIG_DIR_NAME).join(name))
                .collect()
        })
        .unwrap_or_default()
}

/// Load configuration from an explicit path, or from the default locations.
///
/// A missing file yields an empty configuration.
pub fn load_config(explicit: Option<&Path>) -> Result<Config, SandboxError> {
    let candidates = match explicit {
        Some(path) => vec![path.to_path_buf()],
        None => default_config_paths(),
    };

    for path in &candidates {
        match load_config_file(path) {
            Ok(config) => {
                tracing::debug!("Loaded config from {}", path.display());
                return Ok(config);
            }
            Err(SandboxError::Config(ConfigError::FileNotFound(_))) => continue,
            Err(e) => return Err(e),
        }
    }

    if let Some(path) = explicit {
        tracing::warn!(
            "config file {} not found; continuing without user presets",
            path.display()
        );
    }

    Ok(Config::default())
}

/// Load configuration from a single file.
pub fn load_config_file(path: &Path) -> Result<Config, SandboxError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConfigError::FileNotFound(path.display().to_string()).into());
        }
        Err(e) => {
            return Err(ConfigError::ParseError(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
            .into());
        }
    };

    parse_config(&content).map_err(|e| match e {
        SandboxError::Config(ConfigError::ParseError(msg)) => {
            ConfigError::ParseError(format!("{}: {}", path.display(), msg)).into()
        }
        other => other,
    })
}

/// Parse configuration from a YAML string.
pub fn parse_config(yaml: &str) -> Result<Config, SandboxError> {
    if yaml.trim().is_empty() {
        return Ok(Config::default());
    }

    let config: Config = serde_yaml::from_str(yaml).map_err(|e| {
        ConfigError::ParseError(format!("Failed to parse config YAML: {}", e))
    })?;

    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let config = parse_config("").unwrap();
        assert!(config.presets.is_empty());
        assert!(config.auto_presets.is_empty());
        assert!(config.defaults.presets.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
defaults:
  presets:
    - builtin:secrets-deny

presets:
  base:
    strict: true
    allow-git: true
    read:
      - /opt/tools
  claude-code:
    extends: [base]
    skip-defaults: true
    allow:
      - "/tmp"
      - path: "$HOME/.claude"
        eval-symlinks: true
    deny-write:
      - "./.env"
    deny-read:
      - "$HOME/*.pem"

auto-presets:
  - command: claude
    presets:
      - claude-code
  - command-pattern: ^(npm|npx)$
    presets:
      - builtin:npm
"#;

        let config = parse_config(yaml).unwrap();
        assert_eq!(config.defaults.presets, vec!["builtin:secrets-deny"]);
        assert_eq!(config.presets.len(), 2);

        let base = &config.presets["base"];
        assert!(base.rules.strict);
        assert!(base.rules.allow_git);
        assert_eq!(base.rules.read.len(), 1);

        let claude = &config.presets["claude-code"];
        assert_eq!(claude.extends, vec!["base"]);
        assert!(claude.rules.skip_defaults);
        assert_eq!(claude.rules.allow.len(), 2);
        assert!(claude.rules.allow[1].resolve_symlinks);
        assert_eq!(claude.rules.deny_write[0].path, "./.env");
        assert_eq!(claude.rules.deny_read[0].path, "$HOME/*.pem");

        assert_eq!(config.auto_presets.len(), 2);
        assert_eq!(config.auto_presets[0].command.as_deref(), Some("claude"));
        assert_eq!(
            config.auto_presets[1].command_pattern.as_deref(),
            Some("^(npm|npx)$")
        );
        assert_eq!(config.auto_presets[1].presets, vec!["builtin:npm"]);
    }

    #[test]
    fn test_invalid_yaml() {
        let yaml = "presets:\n  test:\n    allow: [\n      invalid yaml";
        let result = parse_config(yaml);
        assert!(matches!(
            result,
            Err(SandboxError::Config(ConfigError::ParseError(_)))
        ));
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("presets.yaml");
        std::fs::write(&path, "presets:\n  test:\n    allow:\n      - /tmp\n      - /var\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.get_preset("test").unwrap().rules.allow.len(), 2);
    }

    #[test]
    fn test_missing_config_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(Some(&dir.path().join("nope.yaml"))).unwrap();
        assert!(config.presets.is_empty());
    }

    #[test]
    fn test_malformed_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "presets: [unterminated").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("bad.yaml"));
    }
}
