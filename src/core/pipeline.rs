/*!
 * Pipeline driver: owns the lifecycle of a whole sieve run
 *
 * The driver spawns the feeder and the first stage, then consumes the
 * internal event stream until it closes. Every unit holds an event
 * publisher clone while it runs, so the stream closing proves that every
 * unit has terminated, whatever path it took. Joining stage 0 afterwards
 * collects the chain's verdict without any risk of blocking.
 */

use std::thread::{self, JoinHandle};
use std::time::Instant;

use tracing::{debug, error, info};

use super::channel::{candidate_channel, CandidateSender};
use super::events::{PipelineEvent, PipelineEventPublisher};
use super::feeder::feed_candidates;
use super::stage::{join_stage, spawn_stage, StageContext};
use super::SieveReport;
use crate::config::SieveConfig;
use crate::error::{PrimelineError, Result};
use crate::stats::PipelineStats;

/// Smallest candidate the feeder emits. 0 and 1 are never fed, so stages
/// need no special-casing for them.
pub const FIRST_CANDIDATE: u64 = 2;

/// Run the sieve over `[2, config.max_candidate]` and return the collected
/// report once every pipeline unit has terminated.
pub fn run_sieve(config: &SieveConfig) -> Result<SieveReport> {
    run_sieve_impl(config, None)
}

/// Run the sieve, forwarding each pipeline event to an optional external
/// publisher as it arrives. Prime reports reach the subscriber the moment a
/// stage designates its prime, before and regardless of any later failure.
///
/// External publishers should be unbounded or actively drained; forwarding
/// blocks the driver (never the stages) when a bounded buffer fills up.
pub fn run_sieve_impl(
    config: &SieveConfig,
    publisher: Option<&PipelineEventPublisher>,
) -> Result<SieveReport> {
    let start_time = Instant::now();
    let stats = PipelineStats::new();
    let (events, collector) = PipelineEventPublisher::unbounded();
    let (first_tx, first_rx) = candidate_channel(config.channel_capacity);

    info!(
        max_candidate = config.max_candidate,
        capacity = config.channel_capacity,
        max_stages = config.max_stages,
        "starting sieve pipeline"
    );

    let feeder = spawn_feeder(config.max_candidate, first_tx, &stats, &events)?;

    let mut startup_error = None;
    let chain = match spawn_stage(StageContext::first(config, &events, &stats), first_rx) {
        Ok(handle) => Some(handle),
        Err(err) => {
            // The read end of the first hop is gone, so the feeder's next
            // send fails and it unwinds on its own.
            error!(error = %err, "failed to start the first stage");
            startup_error = Some(err);
            None
        }
    };

    // The driver holds no publisher clone past this point: the event stream
    // ends exactly when the last unit terminates.
    drop(events);

    let mut primes = Vec::new();
    for event in collector.receiver().iter() {
        if let Some(external) = publisher {
            external.publish(event.clone());
        }
        match event {
            PipelineEvent::PrimeFound { value, .. } => primes.push(value),
            PipelineEvent::StageFailed { stage, ref error, .. } => {
                error!(stage, error = %error, "stage failed");
            }
            _ => {}
        }
    }

    let chain_result = match chain {
        Some(handle) => join_stage(handle),
        None => Ok(()),
    };
    let feeder_result = join_feeder(feeder);

    let snapshot = stats.snapshot();
    debug!(
        primes = primes.len(),
        units = snapshot.units_spawned,
        forwarded = snapshot.values_forwarded,
        discarded = snapshot.values_discarded,
        "pipeline drained"
    );
    stats.emit();

    if let Some(err) = startup_error {
        return Err(err);
    }
    chain_result?;
    feeder_result?;

    info!(
        primes = primes.len(),
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "sieve complete"
    );
    Ok(SieveReport {
        primes,
        duration: start_time.elapsed(),
        stats: snapshot,
    })
}

fn spawn_feeder(
    max_candidate: u64,
    out: CandidateSender,
    stats: &PipelineStats,
    events: &PipelineEventPublisher,
) -> Result<JoinHandle<()>> {
    let stats = stats.clone();
    let events = events.clone();
    thread::Builder::new()
        .name("feeder".to_string())
        .spawn(move || {
            let _unit = stats.unit_guard();
            feed_candidates(FIRST_CANDIDATE, max_candidate, out, &stats, &events);
        })
        .map_err(|source| PrimelineError::SpawnFailed {
            unit: "feeder".to_string(),
            source,
        })
}

fn join_feeder(handle: JoinHandle<()>) -> Result<()> {
    match handle.join() {
        Ok(()) => Ok(()),
        Err(_) => Err(PrimelineError::WorkerPanicked {
            unit: "feeder".to_string(),
        }),
    }
}
