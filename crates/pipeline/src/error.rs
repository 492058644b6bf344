//! Pipeline Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! Per-candidate kinds carry a one-line description of the underlying
//! failure, which is what ends up in the run summary next to the filename.

use derive_more::{Display, Error};
use photopress_rendition::error::Error as RenditionError;
use photopress_storage::error::Error as StorageError;

/// A pipeline error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies where a run (or one candidate within it) failed.
///
/// ### Per-candidate (the run moves on to the next candidate)
/// - [`ErrorKind::StorageRead`]
/// - [`ErrorKind::Decode`]
/// - [`ErrorKind::StorageWrite`]
/// - [`ErrorKind::CatalogUpdate`]
///
/// ### Fatal (the run stops)
/// - [`ErrorKind::Catalog`]
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The original is missing, inaccessible, or its location is malformed.
    #[display("could not read original: {_0}")]
    StorageRead(#[error(not(source))] String),
    /// The original is not a decodable image, or a rendition failed to encode.
    #[display("could not decode image: {_0}")]
    Decode(#[error(not(source))] String),
    /// A rendition upload failed. Renditions uploaded before it are left in place.
    #[display("could not upload rendition: {_0}")]
    StorageWrite(#[error(not(source))] String),
    /// All renditions were uploaded but the catalog record was not updated.
    #[display("could not update catalog: {_0}")]
    CatalogUpdate(#[error(not(source))] String),
    /// Candidates could not be read from the catalog.
    #[display("catalog unavailable")]
    Catalog,
}

impl ErrorKind {
    /// Returns `true` if the whole run must stop.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Catalog)
    }

    #[track_caller]
    pub(crate) fn storage_read(err: StorageError) -> Error {
        let detail = (*err).to_string();
        err.raise(Self::StorageRead(detail))
    }

    #[track_caller]
    pub(crate) fn decode(err: RenditionError) -> Error {
        let detail = (*err).to_string();
        err.raise(Self::Decode(detail))
    }

    #[track_caller]
    pub(crate) fn storage_write(err: StorageError) -> Error {
        let detail = (*err).to_string();
        err.raise(Self::StorageWrite(detail))
    }

    #[track_caller]
    pub(crate) fn catalog_update(err: photopress_catalog::error::Error) -> Error {
        let detail = (*err).to_string();
        err.raise(Self::CatalogUpdate(detail))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use photopress_storage::error::ErrorKind as StorageErrorKind;

    #[test]
    fn test_only_catalog_is_fatal() {
        assert!(ErrorKind::Catalog.is_fatal());
        assert!(!ErrorKind::StorageRead(String::new()).is_fatal());
        assert!(!ErrorKind::Decode(String::new()).is_fatal());
        assert!(!ErrorKind::StorageWrite(String::new()).is_fatal());
        assert!(!ErrorKind::CatalogUpdate(String::new()).is_fatal());
    }

    #[test]
    fn test_detail_is_carried_over() {
        let inner = exn::Exn::from(StorageErrorKind::NotFound("uploads/a.jpg".to_string()));
        let expected = format!("could not read original: {}", *inner);
        let err = ErrorKind::storage_read(inner);
        assert_eq!((*err).to_string(), expected);
        assert!(matches!(&*err, ErrorKind::StorageRead(_)));
    }
}
