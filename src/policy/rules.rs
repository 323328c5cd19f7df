//! Deny rule model.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::utils::contains_glob_chars;

/// Which accesses a deny rule blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessMode {
    Read,
    Write,
    ReadWrite,
}

impl AccessMode {
    /// Whether reads are covered.
    pub fn covers_read(self) -> bool {
        matches!(self, AccessMode::Read | AccessMode::ReadWrite)
    }

    /// Whether writes are covered.
    pub fn covers_write(self) -> bool {
        matches!(self, AccessMode::Write | AccessMode::ReadWrite)
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessMode::Read => write!(f, "read"),
            AccessMode::Write => write!(f, "write"),
            AccessMode::ReadWrite => write!(f, "read+write"),
        }
    }
}

/// A carve-out against broader allows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DenyRule {
    /// Absolute path, or glob pattern when `is_glob`.
    pub pattern: String,
    pub modes: AccessMode,
    /// Set when the pattern contains `*` or `?`.
    pub is_glob: bool,
}

impl DenyRule {
    pub fn new(pattern: impl Into<String>, modes: AccessMode) -> Self {
        let pattern = pattern.into();
        let is_glob = contains_glob_chars(&pattern);
        Self {
            pattern,
            modes,
            is_glob,
        }
    }
}
