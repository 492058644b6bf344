use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use image::{ImageFormat, ImageReader};
use std::io::Cursor;

/// Header-level facts about an encoded image, read without decoding pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    /// Stored width, before any EXIF orientation is applied.
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
}

impl ImageInfo {
    pub fn pixels(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Read format and dimensions from the image header.
pub fn probe(bytes: &[u8]) -> Result<ImageInfo> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format().or_raise(|| ErrorKind::Decode)?;
    let format = reader.format().ok_or_raise(|| ErrorKind::Decode)?;
    let (width, height) = reader.into_dimensions().or_raise(|| ErrorKind::Decode)?;
    Ok(ImageInfo { width, height, format })
}
