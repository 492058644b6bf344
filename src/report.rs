//! Operator-facing output: live narration of a run, the closing summary and
//! the verification audit. Everything here goes to stdout; logs go to stderr.

use photopress_catalog::{Audit, LARGE_PHOTO_BYTES, SMALL_PHOTO_BYTES, Scope};
use photopress_pipeline::{Outcome, RunEvent, RunStatistics, saved_bytes, saved_percent};
use std::io::{self, Write};

const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Human-readable size in base 1024, with at most two decimals.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut exponent = 0;
    while exponent + 1 < UNITS.len() && bytes >= 1 << (10 * (exponent + 1)) {
        exponent += 1;
    }
    let value = format!("{:.2}", bytes as f64 / (1u64 << (10 * exponent)) as f64);
    let value = value.trim_end_matches('0').trim_end_matches('.');
    format!("{value} {}", UNITS[exponent])
}

fn format_saved(bytes: i64) -> String {
    match bytes {
        ..0 => format!("-{}", format_bytes(bytes.unsigned_abs())),
        _ => format_bytes(bytes.unsigned_abs()),
    }
}

/// Writes run narration as events arrive.
pub struct Narrator<W> {
    out: W,
    dry_run: bool,
}

impl<W: Write> Narrator<W> {
    pub fn new(out: W, dry_run: bool) -> Self {
        Self { out, dry_run }
    }

    pub fn banner(&mut self) -> io::Result<()> {
        writeln!(self.out, "Photo compression")?;
        writeln!(self.out, "=================")?;
        if self.dry_run {
            writeln!(self.out, "DRY RUN: no uploads, no catalog changes")?;
        }
        writeln!(self.out)
    }

    pub fn event(&mut self, event: &RunEvent) -> io::Result<()> {
        match event {
            RunEvent::Started => Ok(()),
            RunEvent::DiscoveryComplete(0) => writeln!(self.out, "No photos need compression."),
            RunEvent::DiscoveryComplete(total) => writeln!(self.out, "Found {total} photos to process"),
            RunEvent::Processing { position, record } => {
                writeln!(self.out, "\n[{}/{}] Processing: {}", position.index, position.total, record.filename)
            },
            RunEvent::Fetched { size, info, .. } => {
                writeln!(self.out, "  Size: {}", format_bytes(*size))?;
                writeln!(self.out, "  Dimensions: {}x{}", info.width, info.height)
            },
            RunEvent::Processed { result: Ok(outcome), .. } => self.outcome(outcome),
            RunEvent::Processed { result: Err(err), .. } => writeln!(self.out, "  Failed: {}", **err),
            RunEvent::Complete(stats) if stats.total == 0 => Ok(()),
            RunEvent::Complete(stats) => self.summary(stats),
        }
    }

    fn outcome(&mut self, outcome: &Outcome) -> io::Result<()> {
        match outcome {
            Outcome::Skipped { .. } => writeln!(self.out, "  Skipped (already small enough)"),
            Outcome::Planned { estimate, .. } => {
                writeln!(self.out, "  Would compress to:")?;
                writeln!(self.out, "    Thumbnail: ~{}", format_bytes(estimate.thumbnail))?;
                writeln!(self.out, "    Preview: ~{}", format_bytes(estimate.preview))?;
                writeln!(self.out, "    Optimized: ~{}", format_bytes(estimate.optimized))
            },
            Outcome::Published { original_size, sizes, .. } => {
                writeln!(self.out, "  Thumbnail: {}", format_bytes(sizes.thumbnail))?;
                writeln!(self.out, "  Preview: {}", format_bytes(sizes.preview))?;
                writeln!(self.out, "  Optimized: {}", format_bytes(sizes.optimized))?;
                let saved = saved_bytes(*original_size, sizes.total());
                let percent = saved_percent(*original_size, sizes.total());
                writeln!(self.out, "  Saved: {} ({percent}%)", format_saved(saved))?;
                writeln!(self.out, "  Complete")
            },
        }
    }

    pub fn summary(&mut self, stats: &RunStatistics) -> io::Result<()> {
        writeln!(self.out, "\nSummary")?;
        writeln!(self.out, "=======")?;
        writeln!(self.out, "Total photos:    {}", stats.total)?;
        writeln!(self.out, "Processed:       {}", stats.processed)?;
        writeln!(self.out, "Skipped:         {}", stats.skipped)?;
        writeln!(self.out, "Failed:          {}", stats.failed)?;
        writeln!(self.out)?;
        writeln!(self.out, "Original size:   {}", format_bytes(stats.original_bytes))?;
        if self.dry_run {
            writeln!(self.out, "Estimated size:  {}", format_bytes(stats.estimated_bytes))?;
            let percent = saved_percent(stats.original_bytes, stats.estimated_bytes);
            let saved = saved_bytes(stats.original_bytes, stats.estimated_bytes);
            writeln!(self.out, "Estimated saving: {} ({percent}%)", format_saved(saved))?;
        } else {
            writeln!(self.out, "Compressed size: {}", format_bytes(stats.compressed_bytes))?;
            writeln!(self.out, "Space saved:     {} ({}%)", format_saved(stats.saved_bytes()), stats.saved_percent())?;
        }
        if !stats.failures.is_empty() {
            writeln!(self.out, "\nErrors:")?;
            for failure in &stats.failures {
                writeln!(self.out, "  - {}: {}", failure.filename, failure.error)?;
            }
        }
        writeln!(self.out, "\nDone")
    }
}

/// Print the verification audit, headed by the project when scoped to one.
pub fn audit(out: &mut impl Write, scope: &Scope, audit: &Audit) -> io::Result<()> {
    let coverage = &audit.coverage;
    if let Scope::Project(project) = scope {
        writeln!(out, "Project: {project}\n")?;
    }
    writeln!(out, "Compression coverage")?;
    writeln!(out, "====================")?;
    writeln!(out, "Total photos:      {}", coverage.total)?;
    writeln!(out, "Compressed:        {} ({:.1}%)", coverage.compressed, coverage.compressed_percent())?;
    match coverage.average_size {
        Some(size) => writeln!(out, "Average size:      {}", format_bytes(size))?,
        None => writeln!(out, "Average size:      n/a")?,
    }
    writeln!(out, "Large (> {}):      {}", format_bytes(LARGE_PHOTO_BYTES), coverage.large)?;
    writeln!(out, "Small (< {}):  {}", format_bytes(SMALL_PHOTO_BYTES), coverage.small)?;

    if !audit.uncompressed_large.is_empty() {
        writeln!(out, "\nLarge photos still uncompressed:")?;
        for photo in &audit.uncompressed_large {
            writeln!(out, "  - {} ({}) {}", photo.filename, format_bytes(photo.file_size), photo.id)?;
        }
    }
    if !audit.samples.is_empty() {
        writeln!(out, "\nRecently compressed:")?;
        for sample in &audit.samples {
            let size = sample.file_size.map(format_bytes).unwrap_or_else(|| "unknown size".to_string());
            writeln!(
                out,
                "  - {} ({size}) thumbnail: {}, preview: {}, compressed: {}",
                sample.filename,
                yes_no(sample.has_thumbnail),
                yes_no(sample.has_preview),
                yes_no(sample.was_compressed),
            )?;
        }
    }
    Ok(())
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
