//! Renditions of site photos: a square thumbnail, a screen-sized preview and
//! a full-size optimized copy, all JPEG.
//!
//! - [`probe`] reads format and dimensions from the header alone.
//! - [`Policy::plan`] decides whether an original is worth compressing.
//! - [`Policy::render`] decodes once (honouring EXIF orientation) and encodes
//!   all three renditions.
//! - [`Policy::estimate`] guesses rendition sizes for dry runs.
//!
//! Everything here is synchronous and CPU bound.

pub mod error;
mod policy;
mod probe;
mod render;

pub use crate::policy::{Fit, Plan, Policy, RenditionKind, RenditionSpec};
pub use crate::probe::{ImageInfo, probe};
pub use crate::render::{Rendition, RenditionSet};
pub use image::ImageFormat;
