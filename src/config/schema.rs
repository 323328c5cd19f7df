//! Configuration schema types for the presets YAML file.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::builtin::{builtin_names, builtin_preset, BUILTIN_PREFIX};
use crate::error::ConfigError;

/// A filesystem location granted by a preset.
///
/// Written in YAML either as a plain string or as `{path, eval-symlinks}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "AllowPathRepr", into = "AllowPathRepr")]
pub struct AllowPath {
    /// The path as authored; may contain `$VAR` / `${VAR}` references.
    pub path: String,
    /// Canonicalize the expanded path (best effort).
    pub resolve_symlinks: bool,
}

impl AllowPath {
    /// A plain path without symlink resolution.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            resolve_symlinks: false,
        }
    }

    /// A path whose symlinks are resolved during normalization.
    pub fn resolved(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            resolve_symlinks: true,
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum AllowPathRepr {
    Plain(String),
    Detailed {
        path: String,
        #[serde(default, rename = "eval-symlinks", alias = "resolve-symlinks")]
        resolve_symlinks: bool,
    },
}

impl From<AllowPathRepr> for AllowPath {
    fn from(repr: AllowPathRepr) -> Self {
        match repr {
            AllowPathRepr::Plain(path) => AllowPath::new(path),
            AllowPathRepr::Detailed {
                path,
                resolve_symlinks,
            } => AllowPath {
                path,
                resolve_symlinks,
            },
        }
    }
}

impl From<AllowPath> for AllowPathRepr {
    fn from(path: AllowPath) -> Self {
        if path.resolve_symlinks {
            AllowPathRepr::Detailed {
                path: path.path,
                resolve_symlinks: true,
            }
        } else {
            AllowPathRepr::Plain(path.path)
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// The access rules and flags carried by a preset, without inheritance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PresetRules {
    /// Do not apply the config-level default presets when this preset is selected.
    #[serde(default, skip_serializing_if = "is_false")]
    pub skip_defaults: bool,

    /// Read access is allow-list only.
    #[serde(default, skip_serializing_if = "is_false")]
    pub strict: bool,

    /// Paths granted write (and read) access.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allow: Vec<AllowPath>,

    /// Allow writes to the macOS keychain.
    #[serde(default, skip_serializing_if = "is_false")]
    pub allow_keychain: bool,

    /// Allow writes to the git common directory.
    #[serde(default, skip_serializing_if = "is_false")]
    pub allow_git: bool,

    /// Paths granted read access in strict mode.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub read: Vec<AllowPath>,

    /// Paths/patterns denied for both reading and writing.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deny: Vec<AllowPath>,

    /// Paths/patterns denied for reading.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deny_read: Vec<AllowPath>,

    /// Paths/patterns denied for writing.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deny_write: Vec<AllowPath>,
}

impl PresetRules {
    /// Fold `other` into `self`: lists are appended, flags are OR'd.
    pub fn merge(&mut self, other: &PresetRules) {
        self.allow.extend(other.allow.iter().cloned());
        self.read.extend(other.read.iter().cloned());
        self.deny.extend(other.deny.iter().cloned());
        self.deny_read.extend(other.deny_read.iter().cloned());
        self.deny_write.extend(other.deny_write.iter().cloned());

        self.skip_defaults |= other.skip_defaults;
        self.strict |= other.strict;
        self.allow_keychain |= other.allow_keychain;
        self.allow_git |= other.allow_git;
    }
}

/// A named preset as authored. Non-empty `extends` makes it a partial fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Preset {
    /// Ancestor presets, merged in order before this preset's own rules.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extends: Vec<String>,

    #[serde(flatten)]
    pub rules: PresetRules,
}

/// Config-level defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Defaults {
    /// Presets applied to every invocation unless skipped.
    #[serde(default)]
    pub presets: Vec<String>,
}

/// Maps an invoked command name to presets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AutoPresetRule {
    /// Exact basename to match.
    #[serde(default)]
    pub command: Option<String>,

    /// Regex matched against the basename, anchored only as written.
    #[serde(default)]
    pub command_pattern: Option<String>,

    /// Presets to apply when the rule matches.
    #[serde(default)]
    pub presets: Vec<String>,
}

/// The loaded configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,

    /// User-defined presets by name.
    #[serde(default)]
    pub presets: BTreeMap<String, Preset>,

    #[serde(default)]
    pub auto_presets: Vec<AutoPresetRule>,
}

impl Config {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for name in self.presets.keys() {
            if name.starts_with(BUILTIN_PREFIX) {
                return Err(ConfigError::ValidationError(format!(
                    "user preset '{}' uses the reserved '{}' prefix",
                    name, BUILTIN_PREFIX
                )));
            }
        }
        Ok(())
    }

    /// Look up a preset by name in the builtin table (`builtin:` prefix) or the user table.
    pub fn get_preset(&self, name: &str) -> Option<&Preset> {
        match name.strip_prefix(BUILTIN_PREFIX) {
            Some(builtin) => builtin_preset(builtin),
            None => self.presets.get(name),
        }
    }

    /// All preset names, builtin and user, in one sorted list.
    pub fn list_presets(&self) -> Vec<String> {
        let mut names: Vec<String> = builtin_names()
            .map(|name| format!("{}{}", BUILTIN_PREFIX, name))
            .chain(self.presets.keys().cloned())
            .collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_path_formats() {
        let yaml = r#"
- "/tmp/plain"
- path: "/tmp/detailed"
- path: "/tmp/resolved"
  eval-symlinks: true
- path: "/tmp/alias"
  resolve-symlinks: true
"#;
        let paths: Vec<AllowPath> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            paths,
            vec![
                AllowPath::new("/tmp/plain"),
                AllowPath::new("/tmp/detailed"),
                AllowPath::resolved("/tmp/resolved"),
                AllowPath::resolved("/tmp/alias"),
            ]
        );
    }

    #[test]
    fn test_allow_path_rejects_unsupported_type() {
        let result: Result<AllowPath, _> = serde_yaml::from_str("[a, b]");
        assert!(result.is_err());
    }

    #[test]
    fn test_allow_path_serializes_compactly() {
        let yaml = serde_yaml::to_string(&vec![
            AllowPath::new("/plain"),
            AllowPath::resolved("/linked"),
        ])
        .unwrap();
        assert!(yaml.contains("- /plain"));
        assert!(yaml.contains("path: /linked"));
        assert!(yaml.contains("eval-symlinks: true"));
    }

    #[test]
    fn test_merge_concatenates_and_ors() {
        let mut dst = PresetRules {
            allow: vec![AllowPath::new("/base")],
            strict: true,
            ..Default::default()
        };
        let src = PresetRules {
            allow: vec![AllowPath::new("/child")],
            deny_write: vec![AllowPath::new("/child/.env")],
            allow_git: true,
            ..Default::default()
        };
        dst.merge(&src);

        assert_eq!(
            dst.allow,
            vec![AllowPath::new("/base"), AllowPath::new("/child")]
        );
        assert_eq!(dst.deny_write.len(), 1);
        assert!(dst.strict);
        assert!(dst.allow_git);
        assert!(!dst.allow_keychain);
        assert!(!dst.skip_defaults);
    }

    #[test]
    fn test_get_preset_namespaces() {
        let mut config = Config::default();
        config.presets.insert(
            "secure".to_string(),
            Preset {
                rules: PresetRules {
                    allow: vec![AllowPath::new("/mine")],
                    ..Default::default()
                },
                ..Default::default()
            },
        );

        let user = config.get_preset("secure").unwrap();
        assert_eq!(user.rules.allow, vec![AllowPath::new("/mine")]);

        let builtin = config.get_preset("builtin:secure").unwrap();
        assert!(!builtin.extends.is_empty());

        assert!(config.get_preset("builtin:missing").is_none());
        assert!(config.get_preset("missing").is_none());
    }

    #[test]
    fn test_list_presets() {
        let mut config = Config::default();
        config
            .presets
            .insert("zeta".to_string(), Preset::default());
        config
            .presets
            .insert("alpha".to_string(), Preset::default());

        let names = config.list_presets();
        assert!(names.contains(&"builtin:secure".to_string()));
        assert!(names.contains(&"builtin:npm".to_string()));
        let user: Vec<_> = names
            .iter()
            .filter(|n| !n.starts_with(BUILTIN_PREFIX))
            .collect();
        assert_eq!(user, vec!["alpha", "zeta"]);

        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(names.first().map(String::as_str), Some("alpha"));
        assert_eq!(names.last().map(String::as_str), Some("zeta"));
    }

    #[test]
    fn test_validate_rejects_builtin_prefix() {
        let mut config = Config::default();
        config
            .presets
            .insert("builtin:mine".to_string(), Preset::default());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
