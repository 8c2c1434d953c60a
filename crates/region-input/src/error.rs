//! Error types for the region-input crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building or populating input datasets.
#[derive(Error, Debug)]
pub enum RegionInputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("NetCDF error: {0}")]
    NetCdf(#[from] netcdf::Error),

    #[error("Command `{program} {}` failed: {reason}", .args.join(" "))]
    Command {
        program: String,
        args: Vec<String>,
        reason: String,
    },

    #[error("Expected tool output was not produced: {}", .0.display())]
    MissingOutput(PathBuf),

    #[error("Missing required data: {0}")]
    MissingData(String),

    #[error("Shape mismatch for '{variable}': expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        variable: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for region-input operations.
pub type Result<T> = std::result::Result<T, RegionInputError>;
