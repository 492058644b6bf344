use crate::Outcome;
use crate::error::Result;

/// A candidate that failed, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub filename: String,
    pub error: String,
}

/// Totals for one run, folded from per-candidate results in processing order.
///
/// Only published (or, when running dry, planned) candidates contribute to
/// the byte totals, so the savings compare like with like.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStatistics {
    pub total: u64,
    pub processed: u64,
    pub skipped: u64,
    pub failed: u64,
    pub original_bytes: u64,
    pub compressed_bytes: u64,
    /// Dry runs only: estimated size of the renditions that would be written.
    pub estimated_bytes: u64,
    pub failures: Vec<Failure>,
}

impl RunStatistics {
    pub fn new(total: u64) -> Self {
        Self { total, ..Self::default() }
    }

    pub fn record(&mut self, filename: &str, result: &Result<Outcome>) {
        match result {
            Ok(Outcome::Published { original_size, sizes, .. }) => {
                self.processed += 1;
                self.original_bytes += original_size;
                self.compressed_bytes += sizes.total();
            },
            Ok(Outcome::Planned { original_size, estimate, .. }) => {
                self.processed += 1;
                self.original_bytes += original_size;
                self.estimated_bytes += estimate.total();
            },
            Ok(Outcome::Skipped { .. }) => self.skipped += 1,
            Err(err) => {
                self.failed += 1;
                self.failures.push(Failure { filename: filename.to_string(), error: (**err).to_string() });
            },
        }
    }

    /// Negative when the renditions outweigh the originals.
    pub fn saved_bytes(&self) -> i64 {
        saved_bytes(self.original_bytes, self.compressed_bytes)
    }

    pub fn saved_percent(&self) -> i64 {
        saved_percent(self.original_bytes, self.compressed_bytes)
    }
}

pub fn saved_bytes(original: u64, compressed: u64) -> i64 {
    original as i64 - compressed as i64
}

/// Share of `original` saved by shrinking it to `compressed`, rounded to
/// the nearest percent. Zero when there was nothing to begin with.
pub fn saved_percent(original: u64, compressed: u64) -> i64 {
    if original == 0 {
        return 0;
    }
    ((1.0 - compressed as f64 / original as f64) * 100.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Sizes;
    use crate::error::ErrorKind;
    use image::ImageFormat;
    use photopress_rendition::ImageInfo;
    use rstest::rstest;

    const INFO: ImageInfo = ImageInfo { width: 6000, height: 4000, format: ImageFormat::Jpeg };

    #[test]
    fn test_record_each_outcome() {
        let mut stats = RunStatistics::new(4);
        let sizes = Sizes { thumbnail: 50_000, preview: 400_000, optimized: 1_550_000 };
        let published = Outcome::Published {
            original_size: 5_000_000,
            info: INFO,
            sizes,
            locations: photopress_catalog::RenditionLocations {
                thumbnail: String::new(),
                preview: String::new(),
                optimized: String::new(),
                width: 6000,
                height: 4000,
            },
        };
        stats.record("a.jpg", &Ok(published));
        stats.record("b.jpg", &Ok(Outcome::Skipped { original_size: 400_000, info: INFO }));
        stats.record("c.jpg", &Err(exn::Exn::from(ErrorKind::Decode("truncated".to_string()))));

        assert_eq!((stats.total, stats.processed, stats.skipped, stats.failed), (4, 1, 1, 1));
        assert_eq!(stats.original_bytes, 5_000_000);
        assert_eq!(stats.compressed_bytes, 2_000_000);
        assert_eq!(stats.saved_bytes(), 3_000_000);
        assert_eq!(stats.saved_percent(), 60);
        assert_eq!(
            stats.failures,
            vec![Failure { filename: "c.jpg".to_string(), error: "could not decode image: truncated".to_string() }]
        );
    }

    #[test]
    fn test_planned_only_estimates() {
        let mut stats = RunStatistics::new(1);
        let estimate = Sizes { thumbnail: 1, preview: 2, optimized: 3 };
        stats.record("a.jpg", &Ok(Outcome::Planned { original_size: 100, info: INFO, estimate }));
        assert_eq!((stats.processed, stats.original_bytes), (1, 100));
        assert_eq!((stats.compressed_bytes, stats.estimated_bytes), (0, 6));
    }

    #[rstest]
    #[case::nothing(0, 0, 0)]
    #[case::half(1000, 500, 50)]
    #[case::rounds_up(1000, 334, 67)]
    #[case::rounds_down(1000, 336, 66)]
    #[case::grew(1000, 1500, -50)]
    fn test_saved_percent(#[case] original: u64, #[case] compressed: u64, #[case] expected: i64) {
        assert_eq!(saved_percent(original, compressed), expected);
    }
}
