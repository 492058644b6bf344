//! Storage key validation.
//!
//! Object stores treat keys as opaque strings: `uploads//IMG.jpg` and
//! `uploads/IMG.jpg` are different objects. Keys are therefore checked but
//! never normalised.

use crate::error::{ErrorKind, Result};

/// Checks that `key` can name an object, returning it unchanged.
///
/// Rejects empty keys, keys containing NUL, and keys with a `..` segment
/// (which some S3-compatible services resolve, and some do not).
///
/// ```
/// use photopress_storage::validate_key;
///
/// assert_eq!(validate_key("uploads//IMG_0001.jpg").unwrap(), "uploads//IMG_0001.jpg");
/// assert!(validate_key("uploads/../IMG_0001.jpg").is_err());
/// assert!(validate_key("").is_err());
/// ```
pub fn validate(key: &str) -> Result<&str> {
    if key.is_empty() || key.contains('\0') || key.split('/').any(|segment| segment == "..") {
        exn::bail!(ErrorKind::InvalidKey(key.to_string()));
    }
    Ok(key)
}
