use crate::error::{Error, ErrorKind};
use crate::models::MediaId;
use exn::ResultExt;

/// Photos above this size are "large" for auditing purposes.
pub const LARGE_PHOTO_BYTES: u64 = 2 * 1024 * 1024;
/// Photos below this size are "small" for auditing purposes.
pub const SMALL_PHOTO_BYTES: u64 = 500 * 1024;

/// Aggregate compression coverage over a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coverage {
    pub total: u64,
    pub compressed: u64,
    /// `None` when there are no photos with a known size.
    pub average_size: Option<u64>,
    pub large: u64,
    pub small: u64,
}
impl Coverage {
    /// Share of photos that have been compressed, in percent.
    pub fn compressed_percent(&self) -> f64 {
        match self.total {
            0 => 0.0,
            total => self.compressed as f64 * 100.0 / total as f64,
        }
    }
}

/// A large photo that still has no renditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UncompressedPhoto {
    pub id: MediaId,
    pub filename: String,
    pub location: Option<String>,
    pub file_size: u64,
}

/// A compressed photo and which of its renditions are recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedSample {
    pub id: MediaId,
    pub filename: String,
    pub file_size: Option<u64>,
    pub has_thumbnail: bool,
    pub has_preview: bool,
    pub was_compressed: bool,
}

fn unsigned(value: i64, what: &'static str) -> Result<u64, Error> {
    u64::try_from(value).or_raise(|| ErrorKind::InvalidData(what))
}

#[derive(sqlx::FromRow)]
pub(crate) struct CoverageRow {
    total: i64,
    compressed: i64,
    average_size: Option<i64>,
    large: i64,
    small: i64,
}
impl TryFrom<CoverageRow> for Coverage {
    type Error = Error;
    fn try_from(row: CoverageRow) -> Result<Self, Self::Error> {
        Ok(Self {
            total: unsigned(row.total, "total")?,
            compressed: unsigned(row.compressed, "compressed count")?,
            average_size: row.average_size.map(|s| unsigned(s, "average size")).transpose()?,
            large: unsigned(row.large, "large count")?,
            small: unsigned(row.small, "small count")?,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct UncompressedRow {
    id: i64,
    filename: String,
    location: Option<String>,
    file_size: i64,
}
impl TryFrom<UncompressedRow> for UncompressedPhoto {
    type Error = Error;
    fn try_from(row: UncompressedRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: MediaId(row.id),
            filename: row.filename,
            location: row.location,
            file_size: unsigned(row.file_size, "file size")?,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct SampleRow {
    id: i64,
    filename: String,
    file_size: Option<i64>,
    has_thumbnail: i64,
    has_preview: i64,
    was_compressed: i64,
}
impl TryFrom<SampleRow> for CompressedSample {
    type Error = Error;
    fn try_from(row: SampleRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: MediaId(row.id),
            filename: row.filename,
            file_size: row.file_size.map(|s| unsigned(s, "file size")).transpose()?,
            has_thumbnail: row.has_thumbnail != 0,
            has_preview: row.has_preview != 0,
            was_compressed: row.was_compressed != 0,
        })
    }
}
