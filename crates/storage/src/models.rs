//! Storage models.

/// One year, in seconds. Rendition keys are derived from the original's key
/// and never reused for different content, so they may be cached forever.
const IMMUTABLE_MAX_AGE: u32 = 31_536_000;

/// Object metadata sent alongside an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMeta {
    pub content_type: String,
    pub cache_control: Option<String>,
}

impl ObjectMeta {
    pub fn new(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            cache_control: None,
        }
    }

    /// Metadata for a JPEG rendition: `image/jpeg`, cached for a year.
    pub fn immutable_jpeg() -> Self {
        Self::new("image/jpeg").with_cache_control(format!("max-age={IMMUTABLE_MAX_AGE}"))
    }

    pub fn with_cache_control(mut self, cache_control: impl Into<String>) -> Self {
        self.cache_control = Some(cache_control.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_immutable_jpeg() {
        let meta = ObjectMeta::immutable_jpeg();
        assert_eq!(meta.content_type, "image/jpeg");
        assert_eq!(meta.cache_control.as_deref(), Some("max-age=31536000"));
    }
}
