mod coverage;
mod media;

pub use self::coverage::{CompressedSample, Coverage, LARGE_PHOTO_BYTES, SMALL_PHOTO_BYTES, UncompressedPhoto};
pub(crate) use self::coverage::{CoverageRow, SampleRow, UncompressedRow};
pub use self::media::{MediaId, MediaRecord, RenditionLocations, Scope};
pub(crate) use self::media::MediaRow;
