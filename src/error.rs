use thiserror::Error;

/// Errors surfaced by snapshot loading and configuration.
/// Ranking and evaluation never fail; they resolve to empty results instead.
#[derive(Debug, Error)]
pub enum Error {
    /// CBOR snapshot could not be encoded or decoded.
    #[error("snapshot error: {0}")]
    Snapshot(#[from] serde_cbor::Error),

    /// Underlying file access failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration value out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
