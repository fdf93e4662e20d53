/*!
 * Candidate feeder: the left-most unit of the pipeline
 */

use tracing::debug;

use super::channel::CandidateSender;
use super::events::PipelineEventPublisher;
use crate::stats::PipelineStats;

/// Write every integer in `[low, high]` in ascending order into `out`, then
/// close the write end. An empty range (high < low) closes the hop without
/// sending anything.
///
/// A vanished read end ends the range early; that is the pipeline shutting
/// down under the feeder, not a feeder failure, so this function is
/// infallible.
pub fn feed_candidates(
    low: u64,
    high: u64,
    mut out: CandidateSender,
    stats: &PipelineStats,
    events: &PipelineEventPublisher,
) {
    let mut sent = 0u64;
    for value in low..=high {
        if let Err(err) = out.send(value) {
            debug!(
                value = err.into_value(),
                "read end closed before the range was exhausted"
            );
            break;
        }
        stats.record_fed();
        sent += 1;
    }

    // Explicit close so a stage blocked on the first hop sees end-of-stream
    // immediately.
    out.close();
    events.candidates_fed(sent);
    debug!(low, high, sent, "feeder drained");
}
