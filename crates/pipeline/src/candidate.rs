use crate::Context;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use photopress_catalog::{MediaId, MediaRecord, RenditionLocations};
use photopress_rendition::{ImageInfo, Plan, Policy, Rendition, RenditionKind, RenditionSet, probe};
use photopress_storage::{ObjectMeta, rendition_key};
use tracing::{debug, instrument};

/// Byte sizes of the three renditions, measured or estimated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sizes {
    pub thumbnail: u64,
    pub preview: u64,
    pub optimized: u64,
}

impl Sizes {
    fn measured(set: &RenditionSet) -> Self {
        Self { thumbnail: set.thumbnail.size(), preview: set.preview.size(), optimized: set.optimized.size() }
    }

    fn estimated(policy: &Policy, info: &ImageInfo) -> Self {
        Self {
            thumbnail: policy.estimate(info, RenditionKind::Thumbnail),
            preview: policy.estimate(info, RenditionKind::Preview),
            optimized: policy.estimate(info, RenditionKind::Optimized),
        }
    }

    pub fn total(&self) -> u64 {
        self.thumbnail + self.preview + self.optimized
    }
}

/// The outcome of (successfully) processing a single candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Renditions uploaded and the catalog record updated.
    Published { original_size: u64, info: ImageInfo, sizes: Sizes, locations: RenditionLocations },
    /// Small enough in bytes and pixels to leave alone; nothing was written.
    Skipped { original_size: u64, info: ImageInfo },
    /// Dry run: the candidate would be compressed. Sizes are estimates.
    Planned { original_size: u64, info: ImageInfo, estimate: Sizes },
}

/// An original fetched from storage and probed, ready to be compressed.
#[derive(Debug, Clone)]
pub struct Original {
    key: String,
    data: Vec<u8>,
    pub size: u64,
    pub info: ImageInfo,
}

/// Fetch a catalog record's original and read its dimensions.
///
/// Fails with [`StorageRead`](ErrorKind::StorageRead) when the location
/// cannot be mapped or read, and [`Decode`](ErrorKind::Decode) when the
/// bytes are not a recognisable image.
#[instrument(skip_all, fields(id = %record.id, filename = %record.filename))]
pub async fn fetch_original(ctx: &Context, record: &MediaRecord) -> Result<Original> {
    let key = ctx.locations.to_key(&record.location).map_err(ErrorKind::storage_read)?;
    let data = ctx.backend.read(key).await.map_err(ErrorKind::storage_read)?;
    let info = probe(&data).map_err(ErrorKind::decode)?;
    let size = data.len() as u64;
    debug!(key, size, width = info.width, height = info.height, "fetched original");
    Ok(Original { key: key.to_string(), data, size, info })
}

/// Compress and publish a fetched original.
///
/// Leaves early when the skip rule fires or when running dry. Every error
/// returned here is scoped to this candidate: the catalog record is only
/// touched once all three renditions are in storage, so a failure at any
/// step leaves it pending.
#[instrument(skip_all, fields(id = %record.id, key = %original.key))]
pub async fn process_original(ctx: &Context, record: &MediaRecord, original: Original) -> Result<Outcome> {
    let Original { key, data, size: original_size, info } = original;
    if ctx.policy.plan(original_size, &info) == Plan::Skip {
        return Ok(Outcome::Skipped { original_size, info });
    }
    if ctx.is_dry_run() {
        let estimate = Sizes::estimated(&ctx.policy, &info);
        return Ok(Outcome::Planned { original_size, info, estimate });
    }
    let policy = ctx.policy.clone();
    let set = tokio::task::spawn_blocking(move || policy.render(&data))
        .await
        .or_raise(|| ErrorKind::Decode("rendering was interrupted".to_string()))?
        .map_err(ErrorKind::decode)?;

    let locations = publish(ctx, &key, record.id, &set).await?;
    Ok(Outcome::Published { original_size, info, sizes: Sizes::measured(&set), locations })
}

/// Upload every rendition, then record all of their locations in one update.
///
/// Nothing is written to the catalog unless every upload succeeded.
async fn publish(ctx: &Context, original: &str, id: MediaId, set: &RenditionSet) -> Result<RenditionLocations> {
    let meta = ObjectMeta::immutable_jpeg();
    let locations = RenditionLocations {
        thumbnail: upload(ctx, original, &set.thumbnail, &meta).await?,
        preview: upload(ctx, original, &set.preview, &meta).await?,
        optimized: upload(ctx, original, &set.optimized, &meta).await?,
        width: set.width,
        height: set.height,
    };
    ctx.catalog.record_renditions(id, &locations).await.map_err(ErrorKind::catalog_update)?;
    Ok(locations)
}

async fn upload(ctx: &Context, original: &str, rendition: &Rendition, meta: &ObjectMeta) -> Result<String> {
    let key = rendition_key(original, rendition.kind.suffix()).map_err(ErrorKind::storage_write)?;
    ctx.backend.write(&key, &rendition.data, meta).await.map_err(ErrorKind::storage_write)?;
    ctx.locations.to_location(&key).map_err(ErrorKind::storage_write)
}
