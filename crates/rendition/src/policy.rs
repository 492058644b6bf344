use crate::ImageInfo;
use derive_more::Display;

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;

/// One of the three derived images produced for every compressed photo.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenditionKind {
    #[display("thumbnail")]
    Thumbnail,
    #[display("preview")]
    Preview,
    #[display("optimized")]
    Optimized,
}

impl RenditionKind {
    /// Appended to the original's base name to form the rendition key.
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Thumbnail => "-thumb",
            Self::Preview => "-preview",
            Self::Optimized => "-opt",
        }
    }
}

/// How an image is fitted into a rendition's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fit {
    /// Scale to cover the box, then center-crop to exactly its size.
    Cover,
    /// Scale down to fit inside the box, preserving aspect ratio. Never
    /// enlarges.
    Inside,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenditionSpec {
    pub width: u32,
    pub height: u32,
    pub fit: Fit,
    /// JPEG quality, 1 to 100.
    pub quality: u8,
}

/// Whether a photo is worth compressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    /// Already small in both bytes and pixels; leave it alone.
    Skip,
    Compress,
}

/// Thresholds and rendition parameters.
///
/// The [`Default`] is the production policy; tests shrink the boxes to keep
/// fixtures small.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    /// Originals at or above this many bytes are always compressed.
    pub min_bytes: u64,
    /// Originals with either side at or above this many pixels are always
    /// compressed.
    pub min_dimension: u32,
    pub thumbnail: RenditionSpec,
    pub preview: RenditionSpec,
    pub optimized: RenditionSpec,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            min_bytes: 2 * MIB,
            min_dimension: 2000,
            thumbnail: RenditionSpec { width: 300, height: 300, fit: Fit::Cover, quality: 70 },
            preview: RenditionSpec { width: 1920, height: 1920, fit: Fit::Inside, quality: 85 },
            optimized: RenditionSpec { width: 4000, height: 4000, fit: Fit::Inside, quality: 90 },
        }
    }
}

impl Policy {
    /// Skip only when the original is small on every axis: under the byte
    /// threshold and under the pixel threshold on both sides.
    pub fn plan(&self, size: u64, info: &ImageInfo) -> Plan {
        let small = size < self.min_bytes && info.width < self.min_dimension && info.height < self.min_dimension;
        if small { Plan::Skip } else { Plan::Compress }
    }

    /// Rough size of a rendition, for dry runs where nothing is encoded.
    pub fn estimate(&self, info: &ImageInfo, kind: RenditionKind) -> u64 {
        let pixels = info.pixels() as f64;
        match kind {
            RenditionKind::Thumbnail => 50 * KIB,
            RenditionKind::Preview => ((pixels * 0.15) as u64).min(500 * KIB),
            RenditionKind::Optimized => ((pixels * 0.25) as u64).min(3 * MIB),
        }
    }
}
