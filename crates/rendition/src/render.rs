use crate::error::{ErrorKind, Result};
use crate::{Fit, Policy, RenditionKind, RenditionSpec};
use exn::ResultExt;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageReader};
use std::borrow::Cow;
use std::io::Cursor;
use tracing::{debug, instrument};

const FILTER: FilterType = FilterType::Lanczos3;

/// An encoded JPEG rendition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendition {
    pub kind: RenditionKind,
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl Rendition {
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// All three renditions of one original.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenditionSet {
    pub thumbnail: Rendition,
    pub preview: Rendition,
    pub optimized: Rendition,
    /// Width of the original as displayed, after EXIF orientation.
    pub width: u32,
    pub height: u32,
}

impl Policy {
    /// Decode the original once and encode every rendition from it.
    ///
    /// CPU bound: async callers should run this on a blocking thread.
    #[instrument(skip_all, fields(size = bytes.len()))]
    pub fn render(&self, bytes: &[u8]) -> Result<RenditionSet> {
        let image = decode(bytes)?;
        debug!(width = image.width(), height = image.height(), "decoded original");
        Ok(RenditionSet {
            thumbnail: encode(&image, RenditionKind::Thumbnail, &self.thumbnail)?,
            preview: encode(&image, RenditionKind::Preview, &self.preview)?,
            optimized: encode(&image, RenditionKind::Optimized, &self.optimized)?,
            width: image.width(),
            height: image.height(),
        })
    }
}

fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format().or_raise(|| ErrorKind::Decode)?;
    let mut decoder = reader.into_decoder().or_raise(|| ErrorKind::Decode)?;
    // A broken EXIF block is not worth failing the photo over.
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    let mut image = DynamicImage::from_decoder(decoder).or_raise(|| ErrorKind::Decode)?;
    image.apply_orientation(orientation);
    Ok(image)
}

fn fit<'a>(image: &'a DynamicImage, spec: &RenditionSpec) -> Cow<'a, DynamicImage> {
    match spec.fit {
        Fit::Cover => Cow::Owned(image.resize_to_fill(spec.width, spec.height, FILTER)),
        Fit::Inside if image.width() <= spec.width && image.height() <= spec.height => Cow::Borrowed(image),
        Fit::Inside => Cow::Owned(image.resize(spec.width, spec.height, FILTER)),
    }
}

fn encode(image: &DynamicImage, kind: RenditionKind, spec: &RenditionSpec) -> Result<Rendition> {
    let resized = fit(image, spec);
    // JPEG has no alpha channel.
    let rgb = resized.to_rgb8();
    let mut data = Vec::new();
    JpegEncoder::new_with_quality(&mut data, spec.quality)
        .encode_image(&rgb)
        .or_raise(|| ErrorKind::Encode)?;
    debug!(%kind, width = rgb.width(), height = rgb.height(), size = data.len(), "encoded rendition");
    Ok(Rendition { kind, data, width: rgb.width(), height: rgb.height() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::encoded;
    use crate::{Plan, probe};
    use image::ImageFormat;

    /// Production shapes, scaled down tenfold.
    fn policy() -> Policy {
        Policy {
            min_bytes: 2 * 1024 * 1024,
            min_dimension: 200,
            thumbnail: RenditionSpec { width: 30, height: 30, fit: Fit::Cover, quality: 70 },
            preview: RenditionSpec { width: 192, height: 192, fit: Fit::Inside, quality: 85 },
            optimized: RenditionSpec { width: 400, height: 400, fit: Fit::Inside, quality: 90 },
        }
    }

    fn dimensions(rendition: &Rendition) -> (u32, u32) {
        let decoded = image::load_from_memory_with_format(&rendition.data, ImageFormat::Jpeg).unwrap();
        (decoded.width(), decoded.height())
    }

    #[test]
    fn test_large_landscape() {
        let set = policy().render(&encoded(600, 400, ImageFormat::Png)).unwrap();
        assert_eq!((set.width, set.height), (600, 400));

        assert_eq!(dimensions(&set.thumbnail), (30, 30));
        let (width, height) = dimensions(&set.preview);
        assert_eq!(width, 192);
        assert_eq!(height, 128);
        let (width, height) = dimensions(&set.optimized);
        assert_eq!(width, 400);
        assert!((266..=267).contains(&height));
    }

    #[test]
    fn test_portrait_is_bounded_by_height() {
        let set = policy().render(&encoded(100, 300, ImageFormat::Png)).unwrap();
        assert_eq!(dimensions(&set.preview), (64, 192));
        assert_eq!(dimensions(&set.optimized), (100, 300));
    }

    #[test]
    fn test_never_enlarges() {
        let set = policy().render(&encoded(120, 80, ImageFormat::Png)).unwrap();
        assert_eq!(dimensions(&set.preview), (120, 80));
        assert_eq!(dimensions(&set.optimized), (120, 80));
        // Thumbnails always fill their box, even from a smaller original.
        assert_eq!(dimensions(&set.thumbnail), (30, 30));
    }

    #[test]
    fn test_renditions_carry_their_kind() {
        let set = policy().render(&encoded(120, 80, ImageFormat::Png)).unwrap();
        let renditions = [&set.thumbnail, &set.preview, &set.optimized];
        let kinds = renditions.map(|r| r.kind);
        assert_eq!(kinds, [RenditionKind::Thumbnail, RenditionKind::Preview, RenditionKind::Optimized]);
        assert!(renditions.iter().all(|r| r.size() == r.data.len() as u64 && r.data.starts_with(&[0xFF, 0xD8])));
    }

    #[test]
    fn test_default_thumbnail_is_square() {
        let set = Policy::default().render(&encoded(400, 40, ImageFormat::Png)).unwrap();
        assert_eq!(dimensions(&set.thumbnail), (300, 300));
        assert_eq!((set.thumbnail.width, set.thumbnail.height), (300, 300));
    }

    #[test]
    fn test_production_sized_original() {
        let policy = Policy::default();
        // Uncompressed BMP keeps building a 24 megapixel fixture cheap.
        let bytes = encoded(6000, 4000, ImageFormat::Bmp);
        let info = probe(&bytes).unwrap();
        assert_eq!((info.width, info.height), (6000, 4000));
        assert_eq!(policy.plan(5_000_000, &info), Plan::Compress);

        let set = policy.render(&bytes).unwrap();
        assert_eq!((set.width, set.height), (6000, 4000));
        assert_eq!(dimensions(&set.thumbnail), (300, 300));
        let (width, height) = dimensions(&set.preview);
        assert_eq!(width, 1920);
        assert!(height <= 1920 && (1279..=1281).contains(&height), "{height}");
        let (width, height) = dimensions(&set.optimized);
        assert_eq!(width, 4000);
        assert!(height <= 4000 && (2666..=2667).contains(&height), "{height}");
        assert_eq!((set.optimized.width, set.optimized.height), (width, height));
    }

    #[test]
    fn test_corrupt_original() {
        let mut bytes = encoded(300, 100, ImageFormat::Png);
        bytes.truncate(bytes.len() / 2);
        let err = policy().render(&bytes).unwrap_err();
        assert_eq!(*err, ErrorKind::Decode);
    }

    #[test]
    fn test_transparency_is_flattened() {
        let mut buffer = Vec::new();
        DynamicImage::ImageRgba8(image::RgbaImage::new(50, 50))
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        let set = policy().render(&buffer).unwrap();
        assert_eq!(dimensions(&set.optimized), (50, 50));
    }
}
