//! Rendition Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A rendition error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for rendition operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// Neither is worth retrying with the same input.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The bytes are not an image the decoder understands.
    #[display("invalid or corrupted image")]
    Decode,
    /// A rendition could not be encoded as JPEG.
    #[display("could not encode rendition")]
    Encode,
}
