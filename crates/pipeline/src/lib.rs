//! The batch run: list pending photos from the catalog, then for each one
//! fetch the original, render its renditions, upload them and record them.
//!
//! The primary entry point is [`run`], which streams [`RunEvent`]s as it
//! works through the candidates one at a time. [`verify`] is its read-only
//! companion, auditing how much of the catalog has been compressed.

mod candidate;
mod context;
pub mod error;
mod run;
mod stats;

pub use crate::candidate::{Original, Outcome, Sizes, fetch_original, process_original};
pub use crate::context::Context;
pub use crate::run::{Position, RunEvent, run};
pub use crate::stats::{Failure, RunStatistics, saved_bytes, saved_percent};

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use photopress_catalog::{Audit, Repository, Scope};
use tracing::instrument;

/// Audit compression coverage for `scope`. Never writes.
#[instrument(skip(catalog))]
pub async fn verify(catalog: &Repository, scope: &Scope) -> Result<Audit> {
    catalog.audit(scope).await.or_raise(|| ErrorKind::Catalog)
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::Context;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use photopress_catalog::{Database, Repository};
    use photopress_rendition::{Fit, Policy, RenditionSpec};
    use photopress_storage::LocationMap;
    use photopress_storage::backend::MockBackend;
    use std::io::Cursor;
    use std::sync::Arc;

    pub(crate) const BASE: &str = "https://media.example.com/";

    /// A gradient PNG, so encoders have something to chew on.
    pub(crate) fn encoded(width: u32, height: u32) -> Vec<u8> {
        let image = RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128]));
        let mut buffer = Vec::new();
        DynamicImage::ImageRgb8(image).write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png).unwrap();
        buffer
    }

    /// Production shapes scaled down tenfold, so anything 200px or wider is
    /// worth compressing.
    pub(crate) fn policy() -> Policy {
        Policy {
            min_bytes: 2 * 1024 * 1024,
            min_dimension: 200,
            thumbnail: RenditionSpec { width: 30, height: 30, fit: Fit::Cover, quality: 70 },
            preview: RenditionSpec { width: 192, height: 192, fit: Fit::Inside, quality: 85 },
            optimized: RenditionSpec { width: 400, height: 400, fit: Fit::Inside, quality: 90 },
        }
    }

    /// The catalog columns a run writes.
    #[derive(Debug)]
    pub(crate) struct Row {
        pub(crate) location: Option<String>,
        pub(crate) thumbnail: Option<String>,
        pub(crate) preview: Option<String>,
        pub(crate) width: Option<i64>,
        pub(crate) height: Option<i64>,
        pub(crate) was_compressed: bool,
    }

    /// An in-memory catalog plus the objects a mock bucket will start with.
    ///
    /// Originals live under `uploads/`. Catalogued sizes are nominal (ten
    /// bytes a pixel); only the processing order they impose matters.
    pub(crate) struct Fixture {
        pub(crate) db: Database,
        files: Vec<(String, Vec<u8>)>,
        failing_reads: Vec<String>,
        failing_writes: Vec<String>,
    }

    impl Fixture {
        pub(crate) async fn new() -> Self {
            let db = Database::connect_in_memory().await.unwrap();
            for statement in [
                "INSERT INTO projects (id, uuid, name) VALUES (1, 'project-a', 'Smith residence')",
                "INSERT INTO projects (id, uuid, name) VALUES (2, 'project-b', 'Jones residence')",
            ] {
                sqlx::query(statement).execute(db.pool()).await.unwrap();
            }
            Self { db, files: vec![], failing_reads: vec![], failing_writes: vec![] }
        }

        /// A catalogued photo in the first project, with its original in storage.
        pub(crate) async fn photo(&mut self, id: i64, name: &str, width: u32, height: u32) {
            self.photo_in(1, id, name, width, height).await;
        }

        pub(crate) async fn photo_in(&mut self, project: i64, id: i64, name: &str, width: u32, height: u32) {
            self.record(project, id, name, i64::from(width * height) * 10).await;
            self.object(name, encoded(width, height));
        }

        /// A catalog row only; storage is left alone.
        pub(crate) async fn record(&mut self, project: i64, id: i64, name: &str, size: i64) {
            sqlx::query(
                "INSERT INTO media (id, project_id, media_type, file_name, s3_url, file_size)
                 VALUES ($1, $2, 'photo', $3, $4, $5)",
            )
            .bind(id)
            .bind(project)
            .bind(name)
            .bind(format!("{BASE}uploads/{name}"))
            .bind(size)
            .execute(self.db.pool())
            .await
            .unwrap();
        }

        /// An object only; the catalog is left alone.
        pub(crate) fn object(&mut self, name: &str, data: Vec<u8>) {
            self.files.push((format!("uploads/{name}"), data));
        }

        pub(crate) fn failing_read(&mut self, key: &str) {
            self.failing_reads.push(key.to_string());
        }

        pub(crate) fn failing_write(&mut self, key: &str) {
            self.failing_writes.push(key.to_string());
        }

        /// A context over this fixture, and the bucket it writes to.
        pub(crate) fn start(&self, dry_run: bool) -> (Context, Arc<MockBackend>) {
            let mut backend = MockBackend::with_files(self.files.clone());
            for key in &self.failing_reads {
                backend = backend.with_failing_read(key);
            }
            for key in &self.failing_writes {
                backend = backend.with_failing_write(key);
            }
            let backend = Arc::new(backend);
            let catalog = Repository::new(self.db.pool().clone(), dry_run);
            let locations = LocationMap::new(BASE).unwrap();
            let ctx = Context::new(backend.clone(), catalog, locations).with_policy(policy());
            (ctx, backend)
        }

        pub(crate) async fn row(&self, id: i64) -> Row {
            let (location, thumbnail, preview, width, height, was_compressed): (
                Option<String>,
                Option<String>,
                Option<String>,
                Option<i64>,
                Option<i64>,
                i64,
            ) = sqlx::query_as(
                "SELECT s3_url, thumbnail_url, preview_url, original_width, original_height,
                        CAST(CASE WHEN was_compressed THEN 1 ELSE 0 END AS BIGINT)
                 FROM media WHERE id = $1",
            )
            .bind(id)
            .fetch_one(self.db.pool())
            .await
            .unwrap();
            Row { location, thumbnail, preview, width, height, was_compressed: was_compressed != 0 }
        }
    }

    #[tokio::test]
    async fn test_verify_after_run() {
        use futures::StreamExt;
        use photopress_catalog::Scope;

        let mut fixture = Fixture::new().await;
        fixture.photo(1, "large.png", 300, 200).await;
        fixture.photo(2, "small.png", 100, 80).await;
        let (ctx, _) = fixture.start(false);
        let events: Vec<_> = crate::run(&ctx, &Scope::All).collect().await;
        assert!(events.iter().all(|event| event.is_ok()));

        let audit = crate::verify(&Repository::from(&fixture.db), &Scope::All).await.unwrap();
        assert_eq!((audit.coverage.total, audit.coverage.compressed), (2, 1));
        assert_eq!(audit.samples.len(), 1);
        assert!(audit.samples[0].has_thumbnail && audit.samples[0].has_preview && audit.samples[0].was_compressed);
        fixture.db.close().await;
    }

    #[tokio::test]
    async fn test_verify_unreachable_catalog() {
        let fixture = Fixture::new().await;
        fixture.db.close().await;
        let err = crate::verify(&Repository::from(&fixture.db), &photopress_catalog::Scope::All).await.unwrap_err();
        assert!(err.is_fatal());
    }
}
