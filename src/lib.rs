/*!
 * Primeline - self-extending concurrent prime sieve
 *
 * A thread-per-stage rendition of the classic pipeline sieve. The feeder
 * streams the candidate range into a chain of filtering stages connected by
 * blocking channels; each stage owns the first value it receives as its
 * prime and drops the multiples. The chain grows itself one stage per
 * discovered prime, and tears itself down by cascading end-of-stream from
 * the feeder outward. Closing channels is the only shutdown signal and
 * joining stage 0 awaits the entire chain.
 */

pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod stats;

// Re-export commonly used types
pub use crate::config::{LogLevel, SieveConfig};
pub use crate::core::events::{PipelineEvent, PipelineEventPublisher, PipelineEventSubscriber};
pub use crate::core::{run_sieve, run_sieve_impl, sieve_primes, SieveReport, FIRST_CANDIDATE};
pub use crate::error::{PrimelineError, Result};
pub use crate::stats::{PipelineStats, StatsSnapshot};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
