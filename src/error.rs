//! Error types for cage.

use thiserror::Error;

/// Main error type.
#[derive(Error, Debug)]
pub enum SandboxError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Platform not supported: {0}")]
    UnsupportedPlatform(String),

    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("Landlock error: {0}")]
    Landlock(String),

    #[error("Sandbox execution failed: {0}")]
    ExecutionFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("preset not found: {0}")]
    PresetNotFound(String),

    #[error("circular preset reference detected: {0}")]
    CircularPreset(String),

    #[error("invalid regex pattern in auto-preset '{pattern}': {reason}")]
    InvalidAutoPresetPattern { pattern: String, reason: String },

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, SandboxError>;
