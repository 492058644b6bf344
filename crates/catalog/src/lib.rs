//! Media catalog access.
//!
//! The catalog is owned by the application backend; this crate only reads
//! photo records and records rendition locations on them. A record is
//! *pending* while its thumbnail location is `NULL` and *processed* once
//! [`Repository::record_renditions`] has run for it, which also removes it
//! from every later candidate listing.

mod db;
pub mod error;
mod models;
mod repo;

pub use crate::db::Database;
pub use crate::models::{
    CompressedSample, Coverage, LARGE_PHOTO_BYTES, MediaId, MediaRecord, RenditionLocations, SMALL_PHOTO_BYTES, Scope,
    UncompressedPhoto,
};
pub use crate::repo::{Audit, Repository};
