/*!
 * Instrumentation for pipeline statistics
 *
 * Tracks the lifecycle of every pipeline unit (feeder and stages) plus the
 * flow of candidates through the chain. One `PipelineStats` handle is cloned
 * into each unit; all counters are atomic, so recording never blocks the
 * data path.
 */

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Thread-safe statistics tracker shared by every pipeline unit
#[derive(Debug, Clone)]
pub struct PipelineStats {
    inner: Arc<StatsInner>,
}

#[derive(Debug)]
struct StatsInner {
    // Unit lifecycle
    units_spawned: AtomicU64,
    units_completed: AtomicU64,
    live_units: AtomicU64,

    // Candidate flow
    candidates_fed: AtomicU64,
    primes_found: AtomicU64,
    values_discarded: AtomicU64,
    values_forwarded: AtomicU64,

    // Failures
    spawn_failures: AtomicU64,
    send_failures: AtomicU64,

    start_time: Instant,
}

impl PipelineStats {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(StatsInner {
                units_spawned: AtomicU64::new(0),
                units_completed: AtomicU64::new(0),
                live_units: AtomicU64::new(0),
                candidates_fed: AtomicU64::new(0),
                primes_found: AtomicU64::new(0),
                values_discarded: AtomicU64::new(0),
                values_forwarded: AtomicU64::new(0),
                spawn_failures: AtomicU64::new(0),
                send_failures: AtomicU64::new(0),
                start_time: Instant::now(),
            }),
        }
    }

    /// Register a running unit with the live gauge. The returned guard marks
    /// the unit completed when dropped, which keeps the gauge exact on every
    /// exit path, including panics.
    pub fn unit_guard(&self) -> UnitGuard {
        self.inner.units_spawned.fetch_add(1, Ordering::Relaxed);
        self.inner.live_units.fetch_add(1, Ordering::Relaxed);
        UnitGuard {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Record a candidate delivered by the feeder into the first hop
    pub fn record_fed(&self) {
        self.inner.candidates_fed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a stage designating its prime
    pub fn record_prime(&self) {
        self.inner.primes_found.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a candidate eliminated as a multiple of a stage's prime
    pub fn record_discard(&self) {
        self.inner.values_discarded.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a survivor forwarded one hop downstream
    pub fn record_forward(&self) {
        self.inner.values_forwarded.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a refused or failed unit spawn
    pub fn record_spawn_failure(&self) {
        self.inner.spawn_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a forward that found the read end of its hop gone
    pub fn record_send_failure(&self) {
        self.inner.send_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of units currently running; 0 once the pipeline has drained
    pub fn live_units(&self) -> u64 {
        self.inner.live_units.load(Ordering::Relaxed)
    }

    /// Get a snapshot of current statistics
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            units_spawned: self.inner.units_spawned.load(Ordering::Relaxed),
            units_completed: self.inner.units_completed.load(Ordering::Relaxed),
            live_units: self.inner.live_units.load(Ordering::Relaxed),
            candidates_fed: self.inner.candidates_fed.load(Ordering::Relaxed),
            primes_found: self.inner.primes_found.load(Ordering::Relaxed),
            values_discarded: self.inner.values_discarded.load(Ordering::Relaxed),
            values_forwarded: self.inner.values_forwarded.load(Ordering::Relaxed),
            spawn_failures: self.inner.spawn_failures.load(Ordering::Relaxed),
            send_failures: self.inner.send_failures.load(Ordering::Relaxed),
            elapsed_secs: self.inner.start_time.elapsed().as_secs(),
        }
    }

    /// Emit a statistics summary for diagnostics.
    ///
    /// Controlled by the PRIMELINE_STATS environment variable:
    /// - unset: emit only when something went wrong (failures or leaked units)
    /// - "verbose": always emit
    /// - "off", "0", "false": never emit
    pub fn emit(&self) {
        let setting = std::env::var("PRIMELINE_STATS")
            .unwrap_or_default()
            .to_lowercase();
        if setting == "off" || setting == "0" || setting == "false" {
            return;
        }

        let snapshot = self.snapshot();
        let noteworthy = snapshot.spawn_failures > 0
            || snapshot.send_failures > 0
            || snapshot.live_units > 0;

        if setting == "verbose" || noteworthy {
            tracing::info!(target: "primeline::stats", "{}", snapshot.format_summary());
            if noteworthy {
                eprintln!("{}", snapshot.format_summary());
            }
        }
    }
}

impl Default for PipelineStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard held by a running unit; drop marks the unit completed
pub struct UnitGuard {
    inner: Arc<StatsInner>,
}

impl Drop for UnitGuard {
    fn drop(&mut self) {
        self.inner.units_completed.fetch_add(1, Ordering::Relaxed);
        self.inner.live_units.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Immutable snapshot of pipeline statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub units_spawned: u64,
    pub units_completed: u64,
    pub live_units: u64,
    pub candidates_fed: u64,
    pub primes_found: u64,
    pub values_discarded: u64,
    pub values_forwarded: u64,
    pub spawn_failures: u64,
    pub send_failures: u64,
    pub elapsed_secs: u64,
}

impl StatsSnapshot {
    /// Fraction of fed candidates eliminated as composite (0.0 to 1.0)
    pub fn discard_rate(&self) -> f64 {
        if self.candidates_fed == 0 {
            return 0.0;
        }
        self.values_discarded as f64 / self.candidates_fed as f64
    }

    /// Format a human-readable one-line summary
    pub fn format_summary(&self) -> String {
        format!(
            "pipeline stats: {} units ({} live), {} fed, {} primes, {} discarded, {} forwarded, {} spawn failures, {} send failures, {}s elapsed",
            self.units_spawned,
            self.live_units,
            self.candidates_fed,
            self.primes_found,
            self.values_discarded,
            self.values_forwarded,
            self.spawn_failures,
            self.send_failures,
            self.elapsed_secs,
        )
    }
}
