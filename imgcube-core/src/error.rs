/// Error types for imgcube_core
use thiserror::Error;

/// Errors reported at the imgcube API boundary.
///
/// Programming errors (singular matrices, out-of-range grid coordinates,
/// popping an empty transform stack) panic instead of landing here.
#[derive(Error, Debug)]
pub enum Error {
    /// A turn or move sequence is already running
    #[error("an animation is already in progress")]
    Busy,

    /// Requested rotation is not a positive multiple of 90 degrees
    #[error("rotation of {0} degrees is not a positive multiple of 90")]
    InvalidAngle(u32),

    /// Move notation could not be parsed
    #[error("invalid move notation at {remainder:?}")]
    Notation { remainder: String },

    /// Configuration failed validation
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Configuration file is not valid TOML
    #[error("failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration holds a value TOML cannot represent
    #[error("failed to write configuration: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// I/O failure while reading configuration
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for imgcube_core operations
pub type Result<T> = std::result::Result<T, Error>;
