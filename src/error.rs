use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the simulation core and its host-facing layers.
///
/// The physics itself never fails: numerical edge cases are guarded in place.
/// Errors only surface for invalid host input or an unreadable configuration.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid user or API parameter.
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// Configuration text could not be parsed.
    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),

    /// Propagated I/O errors (reading a config file).
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
