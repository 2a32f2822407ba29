//! Error types for plane decode, linearization, caching and fetching.

use thiserror::Error;

pub type PlaneResult<T> = Result<T, PlaneError>;

/// All failure modes of the plane subsystem.
///
/// `CoordinateOutOfRange` and `FetchFailed` are caller-recoverable (bad
/// input, transient transport); the rest indicate programming errors or
/// metadata/transport inconsistencies and should not be retried.
#[derive(Debug, Error)]
pub enum PlaneError {
    /// Unknown pixel encoding name.
    #[error("unsupported pixel encoding `{0}`")]
    UnsupportedEncoding(String),

    /// Pixel coordinate or byte offset outside the buffer. Indicates a
    /// caller bug, not bad user input.
    #[error("out of bounds: {0}")]
    OutOfBounds(String),

    /// A z/channel/time coordinate outside the declared extents.
    #[error("{dimension}={value} out of range, must be below {bound}")]
    CoordinateOutOfRange {
        dimension: &'static str,
        value: usize,
        bound: usize,
    },

    /// Fetched byte count disagrees with the declared plane size.
    #[error("plane buffer is {actual} bytes, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },

    /// Client matrix shape disagrees with the descriptor on encode.
    #[error("matrix dimensions {actual:?} do not match descriptor {expected:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// Transport-level failure from the plane fetcher.
    #[error("plane fetch failed: {0}")]
    FetchFailed(Box<dyn std::error::Error + Send + Sync>),

    /// Cache constructed or resized with a zero budget or plane size.
    #[error("invalid cache capacity: byte budget {byte_budget}, plane size {plane_bytes}")]
    InvalidCapacity {
        byte_budget: usize,
        plane_bytes: usize,
    },
}
