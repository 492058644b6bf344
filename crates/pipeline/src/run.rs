use crate::error::{ErrorKind, Result};
use crate::{Context, Outcome, RunStatistics, fetch_original, process_original};
use async_stream::stream;
use exn::ResultExt;
use futures::Stream;
use photopress_catalog::{MediaRecord, Scope};
use photopress_rendition::ImageInfo;
use tracing::warn;

/// Where a candidate sits in the run: 1-based, out of `total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub index: u64,
    pub total: u64,
}

/// Progress events emitted by [`run`].
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started), exactly once.
/// 2. [`DiscoveryComplete`](Self::DiscoveryComplete), exactly once, with the
///    candidate count.
/// 3. Per candidate, largest original first: [`Processing`](Self::Processing),
///    then [`Fetched`](Self::Fetched) once the original has been read and
///    probed (skipped when that fails), then [`Processed`](Self::Processed).
/// 4. [`Complete`](Self::Complete), exactly once, with the final totals.
///
/// A fatal error terminates the stream early, in which case
/// [`Complete`](Self::Complete) is never emitted.
#[derive(Debug)]
pub enum RunEvent {
    Started,
    DiscoveryComplete(u64),
    /// About to fetch the candidate's original.
    Processing { position: Position, record: MediaRecord },
    /// The original's size in bytes and its header dimensions.
    Fetched { position: Position, size: u64, info: ImageInfo },
    /// The candidate is done with, one way or another. An `Err` here only
    /// concerns this candidate.
    Processed { position: Position, record: MediaRecord, result: Result<Outcome> },
    Complete(RunStatistics),
}

/// Streams [`RunEvent`]s while compressing every pending photo in `scope`.
///
/// Candidates are processed strictly one after the other: each one is
/// published, skipped or failed before the next is fetched. Per-candidate
/// failures are folded into the statistics and never end the stream. Only
/// failing to list candidates is fatal, and surfaces as an `Err` item.
pub fn run<'a>(ctx: &'a Context, scope: &'a Scope) -> impl Stream<Item = Result<RunEvent>> + 'a {
    // `rustfmt` does not format macros that use braces. Wrap in parentheses!
    stream!({
        yield Ok(RunEvent::Started);

        let candidates = match ctx.catalog.list_candidates(scope).await.or_raise(|| ErrorKind::Catalog) {
            Ok(c) => c,
            Err(e) => {
                yield Err(e);
                return;
            },
        };
        let total = candidates.len() as u64;
        let mut stats = RunStatistics::new(total);
        yield Ok(RunEvent::DiscoveryComplete(total));

        for (position, record) in (1..).map(move |index| Position { index, total }).zip(candidates) {
            yield Ok(RunEvent::Processing { position, record: record.clone() });
            let result = match fetch_original(ctx, &record).await {
                Ok(original) => {
                    yield Ok(RunEvent::Fetched { position, size: original.size, info: original.info });
                    process_original(ctx, &record, original).await
                },
                Err(e) => Err(e),
            };
            if let Err(e) = &result {
                warn!(id = %record.id, filename = %record.filename, error = %**e, "candidate failed");
            }
            stats.record(&record.filename, &result);
            yield Ok(RunEvent::Processed { position, record, result });
        }

        yield Ok(RunEvent::Complete(stats));
    })
}
