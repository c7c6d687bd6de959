//! Unified error types for the kra library.
//!
//! Every decoding step reports one of a small set of outcomes so callers can
//! tell malformed input apart from input that is merely missing what they
//! asked for.
use thiserror::Error;

/// Main error type for kra operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Empty buffers, mismatched sizes or other inputs rejected before parsing
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Malformed XML or a tile container grammar violation
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Well-formed input that lacks the requested node, layer, key frame or tile
    #[error("Not found: {0}")]
    NotFound(String),

    /// Tile payload could not be decompressed to the expected size
    #[error("Decompress error: {0}")]
    DecompressError(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    ZipError(String),
}

impl Error {
    /// Whether this error means the requested element does not exist.
    ///
    /// Callers walking layers or tiles by index use this to stop iterating
    /// without treating the end of the sequence as a failure.
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

/// Result type for kra operations.
pub type Result<T> = std::result::Result<T, Error>;
