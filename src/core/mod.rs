/*!
 * Core sieve pipeline
 *
 * - `channel`: blocking candidate conduits between units
 * - `events`: structured event stream out of the pipeline
 * - `feeder`: produces the ascending candidate range
 * - `stage`: one filtering unit per discovered prime
 * - `pipeline`: driver owning the run lifecycle
 */

pub mod channel;
pub mod events;
pub mod feeder;
pub mod pipeline;
pub mod stage;

use std::time::Duration;

use crate::stats::StatsSnapshot;

pub use pipeline::{run_sieve, run_sieve_impl, FIRST_CANDIDATE};

/// Outcome of a completed sieve run
#[derive(Debug, Clone)]
pub struct SieveReport {
    /// Every prime reported, in ascending discovery order
    pub primes: Vec<u64>,
    /// Wall-clock duration of the whole run
    pub duration: Duration,
    /// Final statistics; `live_units` is 0 after a clean drain
    pub stats: StatsSnapshot,
}

/// Sieve `[2, max_candidate]` with default settings and return the primes.
///
/// ```
/// let primes = primeline::sieve_primes(10).unwrap();
/// assert_eq!(primes, vec![2, 3, 5, 7]);
/// ```
pub fn sieve_primes(max_candidate: u64) -> crate::error::Result<Vec<u64>> {
    let config = crate::config::SieveConfig {
        max_candidate,
        ..crate::config::SieveConfig::default()
    };
    Ok(run_sieve(&config)?.primes)
}
