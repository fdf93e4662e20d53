/*!
 * Sieve stage: one filtering unit bound to one prime
 *
 * The first value a stage receives is its designated prime; every later
 * value is kept only if the prime does not divide it. The first survivor
 * triggers creation of the successor stage, so the chain grows exactly as
 * fast as primes are discovered and never speculatively.
 */

use std::thread::{self, JoinHandle};

use tracing::{debug, trace};

use super::channel::{candidate_channel, CandidateReceiver, CandidateSender};
use super::events::PipelineEventPublisher;
use crate::config::SieveConfig;
use crate::error::{PrimelineError, Result};
use crate::stats::PipelineStats;

/// State shared down the chain: identity, growth limits, and the
/// observation handles every unit carries.
#[derive(Clone)]
pub(crate) struct StageContext {
    pub index: usize,
    pub channel_capacity: usize,
    /// 0 = unlimited
    pub max_stages: usize,
    pub events: PipelineEventPublisher,
    pub stats: PipelineStats,
}

impl StageContext {
    pub fn first(
        config: &SieveConfig,
        events: &PipelineEventPublisher,
        stats: &PipelineStats,
    ) -> Self {
        Self {
            index: 0,
            channel_capacity: config.channel_capacity,
            max_stages: config.max_stages,
            events: events.clone(),
            stats: stats.clone(),
        }
    }

    fn successor(&self) -> Self {
        let mut next = self.clone();
        next.index += 1;
        next
    }
}

/// Spawn a stage thread bound to the read end of a hop. Refuses the spawn
/// when the stage ceiling is reached; otherwise maps an OS refusal to
/// `SpawnFailed`.
pub(crate) fn spawn_stage(
    ctx: StageContext,
    input: CandidateReceiver,
) -> Result<JoinHandle<Result<()>>> {
    let index = ctx.index;
    if ctx.max_stages != 0 && index >= ctx.max_stages {
        return Err(PrimelineError::StageLimit {
            stage: index,
            limit: ctx.max_stages,
        });
    }

    let events = ctx.events.clone();
    let handle = thread::Builder::new()
        .name(format!("stage-{index}"))
        .spawn(move || run_stage(ctx, input))
        .map_err(|source| PrimelineError::SpawnFailed {
            unit: format!("stage-{index}"),
            source,
        })?;
    events.stage_spawned(index);
    Ok(handle)
}

/// Body of one stage thread.
///
/// Shutdown discipline: close the write end first so the successor sees
/// end-of-stream, then join the successor before returning. Every stage
/// therefore outlives its whole downstream chain, and the driver joining
/// stage 0 joins everything.
pub(crate) fn run_stage(ctx: StageContext, mut input: CandidateReceiver) -> Result<()> {
    let _unit = ctx.stats.unit_guard();

    // The first value to survive every upstream filter is prime.
    let prime = match input.recv() {
        Some(value) => value,
        None => {
            // End-of-stream before any value arrived: the chain ends here.
            input.close();
            return Ok(());
        }
    };
    ctx.stats.record_prime();
    ctx.events.prime_found(ctx.index, prime);
    debug!(stage = ctx.index, prime, "designated prime");

    let mut output: Option<CandidateSender> = None;
    let mut successor: Option<JoinHandle<Result<()>>> = None;
    let mut growth_error: Option<PrimelineError> = None;
    let mut send_failed = false;
    let mut forwarded = 0u64;
    let mut discarded = 0u64;

    while let Some(value) = input.recv() {
        if value % prime == 0 {
            ctx.stats.record_discard();
            discarded += 1;
            trace!(stage = ctx.index, value, prime, "discarded multiple");
            continue;
        }

        // First survivor: grow the chain, exactly once. Spawn before
        // forwarding; under rendezvous capacity a forward with no receiver
        // on the other end would block forever.
        if output.is_none() {
            match grow_chain(&ctx) {
                Ok((sender, handle)) => {
                    output = Some(sender);
                    successor = Some(handle);
                }
                Err(err) => {
                    ctx.stats.record_spawn_failure();
                    ctx.events.stage_failed(ctx.index, err.to_string());
                    growth_error = Some(err);
                    break;
                }
            }
        }

        if let Some(ref sender) = output {
            if let Err(err) = sender.send(value) {
                // Downstream is unwinding; its join result carries the reason.
                debug!(
                    stage = ctx.index,
                    value = err.into_value(),
                    "downstream closed during forward"
                );
                ctx.stats.record_send_failure();
                send_failed = true;
                break;
            }
            ctx.stats.record_forward();
            forwarded += 1;
        }
    }

    if let Some(mut sender) = output.take() {
        sender.close();
    }
    // Closing the input makes any still-blocked upstream send fail fast,
    // which cascades the shutdown toward the feeder on abort paths.
    input.close();

    let downstream = match successor.take() {
        Some(handle) => join_stage(handle),
        None => Ok(()),
    };

    ctx.events.stage_drained(ctx.index, forwarded, discarded);
    debug!(
        stage = ctx.index,
        prime, forwarded, discarded, "stage drained"
    );

    if let Some(err) = growth_error {
        return Err(err);
    }
    downstream?;
    if send_failed {
        // The forward failed but the successor reported a clean exit: its
        // read end vanished outside of any shutdown we can account for.
        return Err(PrimelineError::ChannelClosed { stage: ctx.index });
    }
    Ok(())
}

fn grow_chain(ctx: &StageContext) -> Result<(CandidateSender, JoinHandle<Result<()>>)> {
    let (sender, receiver) = candidate_channel(ctx.channel_capacity);
    let handle = spawn_stage(ctx.successor(), receiver)?;
    Ok((sender, handle))
}

/// Join a stage thread, mapping a panic to `WorkerPanicked`.
pub(crate) fn join_stage(handle: JoinHandle<Result<()>>) -> Result<()> {
    let unit = handle.thread().name().unwrap_or("stage").to_string();
    match handle.join() {
        Ok(result) => result,
        Err(_) => Err(PrimelineError::WorkerPanicked { unit }),
    }
}
