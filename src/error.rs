//! Error types for plot construction and configuration loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building a plot from its configuration.
///
/// Nothing at runtime (frame ticks, pointer input) can fail; these only
/// surface when a plot is constructed or a configuration file is loaded.
#[derive(Debug, Error)]
pub enum PlotError {
    #[error("invalid color '{value}' for option '{option}'")]
    InvalidColor { option: &'static str, value: String },

    #[error("parameter '{id}' has invalid bounds: min {min}, max {max}, step {step}")]
    InvalidBounds {
        id: String,
        min: f64,
        max: f64,
        step: f64,
    },

    #[error("parameter '{id}' has invalid initial value {value}")]
    InvalidValue { id: String, value: f64 },

    #[error("parameter '{id}' has invalid animation speed {speed}, expected a positive number")]
    InvalidAnimationSpeed { id: String, speed: f64 },

    #[error("parameter '{0}' is declared more than once")]
    DuplicateParameter(String),

    #[error("missing required parameter '{0}'")]
    MissingParameter(&'static str),

    #[error("initial scale must be positive, got {0}")]
    InvalidScale(f64),

    #[error("failed to read config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, PlotError>;
