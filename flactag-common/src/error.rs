//! Common error types for flactag

use thiserror::Error;

/// Common result type for flactag operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types shared by the flactag crates
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
