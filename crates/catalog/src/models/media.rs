use crate::error::{Error, ErrorKind};
use derive_more::Display;
use exn::ResultExt;

/// Primary key of a row in the `media` table.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MediaId(pub i64);

/// Which part of the catalog a run looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// One project, identified by its externally-visible identifier (the
    /// project UUID), never by its internal primary key.
    Project(String),
    /// Every project.
    All,
}
impl Scope {
    /// The bind value for the `$1` scope parameter shared by every scoped
    /// query: `NULL` means "all projects".
    pub(crate) fn project(&self) -> Option<&str> {
        match self {
            Self::Project(id) => Some(id),
            Self::All => None,
        }
    }
}

/// A catalogued photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRecord {
    pub id: MediaId,
    pub project_id: i64,
    pub filename: String,
    /// Public URL of the original in object storage.
    pub location: String,
    pub file_size: Option<u64>,
    pub thumbnail_location: Option<String>,
    pub preview_location: Option<String>,
    pub original_width: Option<u32>,
    pub original_height: Option<u32>,
    pub was_compressed: bool,
}
impl MediaRecord {
    /// A record is pending until a thumbnail has been recorded for it.
    pub fn is_pending(&self) -> bool {
        self.thumbnail_location.is_none()
    }
}

/// Everything the catalog learns about a record once its renditions exist.
///
/// Applied as a single `UPDATE` so the three locations are never observable
/// half-written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenditionLocations {
    pub thumbnail: String,
    pub preview: String,
    /// Replaces the record's original location going forward.
    pub optimized: String,
    pub width: u32,
    pub height: u32,
}

#[derive(sqlx::FromRow)]
pub(crate) struct MediaRow {
    id: i64,
    project_id: i64,
    filename: String,
    location: String,
    file_size: Option<i64>,
    thumbnail_location: Option<String>,
    preview_location: Option<String>,
    original_width: Option<i64>,
    original_height: Option<i64>,
    was_compressed: i64,
}
impl MediaRow {
    pub(crate) fn id(&self) -> MediaId {
        MediaId(self.id)
    }
}
impl TryFrom<MediaRow> for MediaRecord {
    type Error = Error;
    fn try_from(row: MediaRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: MediaId(row.id),
            project_id: row.project_id,
            filename: row.filename,
            location: row.location,
            file_size: row
                .file_size
                .map(u64::try_from)
                .transpose()
                .or_raise(|| ErrorKind::InvalidData("file size"))?,
            thumbnail_location: row.thumbnail_location,
            preview_location: row.preview_location,
            original_width: row
                .original_width
                .map(u32::try_from)
                .transpose()
                .or_raise(|| ErrorKind::InvalidData("original width"))?,
            original_height: row
                .original_height
                .map(u32::try_from)
                .transpose()
                .or_raise(|| ErrorKind::InvalidData("original height"))?,
            was_compressed: row.was_compressed != 0,
        })
    }
}
