//! Repository over the `media` table.
//!
//! Reads are scoped either to one project (joined through the project's
//! external identifier) or to the whole catalog. The only write is
//! [`Repository::record_renditions`], which is the single statement that
//! flips a record from pending to processed.

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::models::{
    CompressedSample, Coverage, CoverageRow, LARGE_PHOTO_BYTES, MediaId, MediaRecord, MediaRow, RenditionLocations,
    SMALL_PHOTO_BYTES, SampleRow, Scope, UncompressedPhoto, UncompressedRow,
};
use exn::ResultExt;
use sqlx::AnyPool;
use tracing::{instrument, warn};

/// How many still-uncompressed large photos an audit lists.
const AUDIT_UNCOMPRESSED_LIMIT: i64 = 10;
/// How many compressed photos an audit samples.
const AUDIT_SAMPLE_LIMIT: i64 = 5;

/// Everything the verification audit reports about a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Audit {
    pub coverage: Coverage,
    /// Largest first, at most ten.
    pub uncompressed_large: Vec<UncompressedPhoto>,
    /// Most recently updated first, at most five.
    pub samples: Vec<CompressedSample>,
}

/// Repository for reading candidates from, and recording renditions in, the
/// media catalog.
///
/// A repository created with `dry_run` set never writes: updates report
/// success without touching the database.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: AnyPool,
    dry_run: bool,
}
impl From<&Database> for Repository {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone(), dry_run: false }
    }
}
impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: AnyPool, dry_run: bool) -> Self {
        Self { pool, dry_run }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    // =========================================================================
    // Candidates
    // =========================================================================

    /// List photos that still need renditions, largest first.
    ///
    /// A photo is a candidate when it has an original location but no
    /// thumbnail location. An empty list is a normal outcome. Rows whose
    /// values cannot be represented are logged and left out.
    #[instrument(skip(self))]
    pub async fn list_candidates(&self, scope: &Scope) -> Result<Vec<MediaRecord>> {
        let rows: Vec<MediaRow> = sqlx::query_as(include_str!("../queries/list_candidates.sql"))
            .bind(scope.project())
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let candidates = rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id();
                MediaRecord::try_from(row)
                    .inspect_err(|err| warn!(%id, error = ?err, "skipping malformed catalog row"))
                    .ok()
            })
            .collect();
        Ok(candidates)
    }

    // =========================================================================
    // Update
    // =========================================================================

    /// Point a record at its renditions in one statement.
    ///
    /// The optimized rendition replaces the original location; the
    /// pre-compression object stays in storage but is no longer referenced.
    ///
    /// Returns [`ErrorKind::RecordNotFound`] when no row was updated.
    #[instrument(skip(self, locations))]
    pub async fn record_renditions(&self, id: MediaId, locations: &RenditionLocations) -> Result<()> {
        if self.dry_run {
            return Ok(());
        }
        let result = sqlx::query(include_str!("../queries/record_renditions.sql"))
            .bind(&locations.thumbnail)
            .bind(&locations.preview)
            .bind(&locations.optimized)
            .bind(i64::from(locations.width))
            .bind(i64::from(locations.height))
            .bind(id.0)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        if result.rows_affected() == 0 {
            exn::bail!(ErrorKind::RecordNotFound(id));
        }
        Ok(())
    }

    // =========================================================================
    // Audit
    // =========================================================================

    /// Aggregate compression coverage for a scope.
    #[instrument(skip(self))]
    pub async fn coverage(&self, scope: &Scope) -> Result<Coverage> {
        let row: CoverageRow = sqlx::query_as(include_str!("../queries/coverage_totals.sql"))
            .bind(scope.project())
            .bind(Self::bytes_param(LARGE_PHOTO_BYTES)?)
            .bind(Self::bytes_param(SMALL_PHOTO_BYTES)?)
            .fetch_one(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.try_into()
    }

    /// The largest photos that are still pending.
    #[instrument(skip(self))]
    pub async fn list_uncompressed_large(&self, scope: &Scope) -> Result<Vec<UncompressedPhoto>> {
        let rows: Vec<UncompressedRow> = sqlx::query_as(include_str!("../queries/list_uncompressed_large.sql"))
            .bind(scope.project())
            .bind(Self::bytes_param(LARGE_PHOTO_BYTES)?)
            .bind(AUDIT_UNCOMPRESSED_LIMIT)
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(UncompressedPhoto::try_from).collect()
    }

    /// A handful of compressed photos with their rendition-presence flags.
    #[instrument(skip(self))]
    pub async fn list_compressed_samples(&self, scope: &Scope) -> Result<Vec<CompressedSample>> {
        let rows: Vec<SampleRow> = sqlx::query_as(include_str!("../queries/list_compressed_samples.sql"))
            .bind(scope.project())
            .bind(AUDIT_SAMPLE_LIMIT)
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(CompressedSample::try_from).collect()
    }

    /// Run all audit queries for a scope.
    pub async fn audit(&self, scope: &Scope) -> Result<Audit> {
        Ok(Audit {
            coverage: self.coverage(scope).await?,
            uncompressed_large: self.list_uncompressed_large(scope).await?,
            samples: self.list_compressed_samples(scope).await?,
        })
    }

    fn bytes_param(bytes: u64) -> Result<i64> {
        i64::try_from(bytes).or_raise(|| ErrorKind::InvalidData("byte threshold"))
    }
}
