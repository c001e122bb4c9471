use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("failed to read plan at '{path}'")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unsupported plan format for '{path}' (expected .toml, .yaml or .yml)")]
    UnsupportedFormat { path: PathBuf },

    #[error("invalid plan at '{path}'")]
    Invalid {
        path: PathBuf,
        #[source]
        source: Box<PlanError>,
    },

    #[error("TOML parse error")]
    TomlParse(#[from] toml::de::Error),

    #[error("YAML parse error")]
    YamlParse(#[from] serde_yml::Error),

    #[error("plan '{name}' has no actions")]
    NoActions { name: String },

    #[error("action {index} has an empty name")]
    EmptyName { index: usize },

    #[error("duplicate action name '{name}'")]
    DuplicateName { name: String },

    #[error("action '{name}' has an empty {field}")]
    EmptyField { name: String, field: &'static str },
}

/// Failure of a single plan action.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("empty command")]
    EmptyCommand,

    #[error("unable to run '{command}'")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("'{command}' failed with {status}, output: {stderr}")]
    Failed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("failed to {operation} '{path}'")]
    Filesystem {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, PlanError>;
