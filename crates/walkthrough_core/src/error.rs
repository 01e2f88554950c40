//! Walkthrough error types

use thiserror::Error;

/// Errors raised while building a walkthrough
///
/// Runtime commands never fail; they degrade to no-ops. Only construction
/// (configuration, scene geometry) reports errors.
#[derive(Error, Debug)]
pub enum WalkthroughError {
    /// The tour has no waypoints
    #[error("Tour has no waypoints")]
    EmptyTour,

    /// A configuration value is out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Scene geometry could not be built
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    /// Failed to read a configuration file
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse a configuration file
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Failed to serialize a configuration
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Result type for walkthrough construction
pub type Result<T> = std::result::Result<T, WalkthroughError>;
