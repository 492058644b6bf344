//! Catalog Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use crate::models::MediaId;
use derive_more::{Display, Error};

/// A catalog error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The catalog could not be reached at all.
    #[display("could not connect to catalog database")]
    Connect,
    #[display("database error")]
    Database,
    /// An update targeted a record that no longer exists.
    #[display("media record not found: {_0}")]
    RecordNotFound(#[error(not(source))] MediaId),
    /// A row held a value the catalog model cannot represent.
    #[display("invalid catalog data: {_0}")]
    InvalidData(#[error(not(source))] &'static str),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connect)
    }
}
