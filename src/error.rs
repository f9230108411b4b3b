//! Crate-wide error type.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Grid sizes and export scales must be positive and within their limits.
    #[error("invalid size {0}: must be positive and no larger than the supported maximum")]
    InvalidSize(usize),

    #[error("cell ({x}, {y}) is outside the {size}x{size} grid")]
    OutOfBounds { x: usize, y: usize, size: usize },

    #[error("expected {expected} cells for the grid, got {actual}")]
    CellCountMismatch { expected: usize, actual: usize },

    /// Malformed share token or share URL.
    #[error("could not decode shared art: {0}")]
    Decode(String),

    #[error("a work with id {0} already exists in the catalog")]
    DuplicateId(u64),

    #[error("no saved work with id {0}")]
    NotFound(u64),

    #[error("no saved work at position {0}")]
    NoSuchPosition(usize),

    #[error("a work needs a non-empty name")]
    EmptyName,

    #[error("pattern '{pattern}' has no stencil for a {size}x{size} grid")]
    NoStencil { pattern: &'static str, size: usize },

    #[error("unknown pattern '{0}'")]
    UnknownPattern(String),

    #[error("script line {line}: {message}")]
    Script { line: usize, message: String },

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}
