//! Mapping between catalogued locations and storage keys.
//!
//! The catalog stores public URLs (`https://bucket.s3.amazonaws.com/uploads/IMG_0001.jpg`)
//! while backends speak in keys (`uploads/IMG_0001.jpg`). Every location the
//! pipeline reads or writes goes through a [`LocationMap`] so the two stay in
//! lockstep with what the rest of the deployment already writes.

use crate::error::{ErrorKind, Result};
use crate::validate_key;
use exn::OptionExt;

/// Extension appended to every rendition key. Renditions are always JPEG,
/// regardless of the original's format.
const RENDITION_EXTENSION: &str = "jpg";

/// Converts between catalogued locations and storage keys under one base URL.
///
/// A key is the location with the base URL stripped, byte for byte.
///
/// # Examples
///
/// ```
/// use photopress_storage::LocationMap;
///
/// let map = LocationMap::new("https://media.example.com").unwrap();
/// let key = map.to_key("https://media.example.com/uploads/IMG_0001.jpg").unwrap();
/// assert_eq!(key, "uploads/IMG_0001.jpg");
/// assert_eq!(map.to_location(key).unwrap(), "https://media.example.com/uploads/IMG_0001.jpg");
/// // Locations outside the base URL are rejected, never passed through.
/// assert!(map.to_key("https://elsewhere.example.com/uploads/IMG_0001.jpg").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationMap {
    /// Always ends with exactly one `/`.
    base: String,
}

impl LocationMap {
    /// Parse a base URL once. A trailing slash is added when missing.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        let trimmed = base_url.trim().trim_end_matches('/');
        let has_scheme_and_host =
            matches!(trimmed.split_once("://"), Some((scheme, host)) if !scheme.is_empty() && !host.is_empty());
        if !has_scheme_and_host {
            exn::bail!(ErrorKind::InvalidLocation(base_url.clone()));
        }
        Ok(Self { base: format!("{trimmed}/") })
    }

    /// The virtual-hosted-style AWS URL for a bucket, which is what the
    /// upload flow writes into the catalog by default.
    pub fn for_s3_bucket(bucket: &str) -> Result<Self> {
        Self::new(format!("https://{bucket}.s3.amazonaws.com/"))
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Strip the base URL from a catalogued location to get its storage key.
    ///
    /// Returns [`InvalidLocation`](ErrorKind::InvalidLocation) when the
    /// location does not start with the base URL, and
    /// [`InvalidKey`](ErrorKind::InvalidKey) when the remainder cannot name
    /// an object.
    pub fn to_key<'a>(&self, location: &'a str) -> Result<&'a str> {
        let key = location
            .strip_prefix(&self.base)
            .ok_or_raise(|| ErrorKind::InvalidLocation(location.to_string()))?;
        validate_key(key)
    }

    /// Build the catalogued location for a storage key.
    pub fn to_location(&self, key: &str) -> Result<String> {
        Ok(format!("{}{}", self.base, validate_key(key)?))
    }
}

/// Derive a rendition's key from the original's key: the file extension is
/// stripped from the last segment and `{suffix}.jpg` appended. Everything
/// before the last segment is kept verbatim.
///
/// ```
/// use photopress_storage::rendition_key;
///
/// assert_eq!(rendition_key("uploads/IMG_0001.HEIC", "-thumb").unwrap(), "uploads/IMG_0001-thumb.jpg");
/// ```
pub fn rendition_key(original: &str, suffix: &str) -> Result<String> {
    let original = validate_key(original)?;
    let (dir, name) = match original.rsplit_once('/') {
        Some((dir, name)) => (Some(dir), name),
        None => (None, original),
    };
    if name.is_empty() {
        exn::bail!(ErrorKind::InvalidKey(original.to_string()));
    }
    // Only a non-empty trailing extension counts: "photo." keeps its dot.
    let stem = match name.rfind('.') {
        Some(i) if i > 0 && i + 1 < name.len() => &name[..i],
        _ => name,
    };
    let file = format!("{stem}{suffix}.{RENDITION_EXTENSION}");
    Ok(match dir {
        Some(dir) => format!("{dir}/{file}"),
        None => file,
    })
}
