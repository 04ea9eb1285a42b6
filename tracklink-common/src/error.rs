//! Common error types for tracklink

use thiserror::Error;

/// Common result type for tracklink operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by the catalog adapters, resolvers and API layers.
///
/// `NotFound` is not fatal to a compound request: a dual-catalog resolution
/// that misses on one side degrades to a partial result instead of aborting.
#[derive(Error, Debug)]
pub enum Error {
    /// Entity absent upstream, or a search yielded zero results
    #[error("Not found")]
    NotFound,

    /// Bad or expired catalog credential
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Unparseable URL, envelope or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Network-level failure talking to a catalog (wraps reqwest::Error)
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Catalog answered with a body we could not decode
    #[error("Parse error: {0}")]
    Parse(String),

    /// Store operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for misses that compound requests degrade over rather than abort on.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound)
    }
}
