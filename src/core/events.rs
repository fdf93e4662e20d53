/*!
 * Pipeline event stream
 *
 * Publisher/subscriber pair carrying structured events out of the pipeline:
 * prime reports as each stage designates its prime, topology growth, drain
 * summaries, and failures. Every unit holds a publisher clone for exactly
 * as long as it runs, so the stream closing doubles as the signal that all
 * units have terminated.
 */

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use std::time::{SystemTime, UNIX_EPOCH};

/// Pipeline event types
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    /// A new stage thread started
    StageSpawned { stage: usize, timestamp: u64 },

    /// A stage designated its prime; the externally observable output
    PrimeFound {
        stage: usize,
        value: u64,
        timestamp: u64,
    },

    /// The feeder finished, after delivering `count` candidates
    CandidatesFed { count: u64, timestamp: u64 },

    /// A stage finished its shutdown path, with its filtering totals
    StageDrained {
        stage: usize,
        forwarded: u64,
        discarded: u64,
        timestamp: u64,
    },

    /// A stage failed; the error is carried as display text
    StageFailed {
        stage: usize,
        error: String,
        timestamp: u64,
    },
}

impl PipelineEvent {
    pub fn stage_spawned(stage: usize) -> Self {
        PipelineEvent::StageSpawned {
            stage,
            timestamp: current_timestamp(),
        }
    }

    pub fn prime_found(stage: usize, value: u64) -> Self {
        PipelineEvent::PrimeFound {
            stage,
            value,
            timestamp: current_timestamp(),
        }
    }

    pub fn candidates_fed(count: u64) -> Self {
        PipelineEvent::CandidatesFed {
            count,
            timestamp: current_timestamp(),
        }
    }

    pub fn stage_drained(stage: usize, forwarded: u64, discarded: u64) -> Self {
        PipelineEvent::StageDrained {
            stage,
            forwarded,
            discarded,
            timestamp: current_timestamp(),
        }
    }

    pub fn stage_failed(stage: usize, error: String) -> Self {
        PipelineEvent::StageFailed {
            stage,
            error,
            timestamp: current_timestamp(),
        }
    }
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Event publisher held by pipeline units
#[derive(Clone)]
pub struct PipelineEventPublisher {
    sender: Option<Sender<PipelineEvent>>,
}

impl PipelineEventPublisher {
    /// Create a publisher/subscriber pair with a bounded buffer. Publishing
    /// blocks once the buffer is full, so bounded subscribers must be
    /// drained while the pipeline runs.
    pub fn new(buffer_size: usize) -> (Self, PipelineEventSubscriber) {
        let (sender, receiver) = bounded(buffer_size);
        (
            Self {
                sender: Some(sender),
            },
            PipelineEventSubscriber { receiver },
        )
    }

    /// Create a publisher/subscriber pair with an unbounded buffer; events
    /// never block the data path.
    pub fn unbounded() -> (Self, PipelineEventSubscriber) {
        let (sender, receiver) = unbounded();
        (
            Self {
                sender: Some(sender),
            },
            PipelineEventSubscriber { receiver },
        )
    }

    /// Create a publisher that discards all events
    pub fn noop() -> Self {
        Self { sender: None }
    }

    /// Publish an event; a vanished subscriber is ignored
    pub fn publish(&self, event: PipelineEvent) {
        if let Some(ref sender) = self.sender {
            let _ = sender.send(event);
        }
    }

    pub fn stage_spawned(&self, stage: usize) {
        self.publish(PipelineEvent::stage_spawned(stage));
    }

    pub fn prime_found(&self, stage: usize, value: u64) {
        self.publish(PipelineEvent::prime_found(stage, value));
    }

    pub fn candidates_fed(&self, count: u64) {
        self.publish(PipelineEvent::candidates_fed(count));
    }

    pub fn stage_drained(&self, stage: usize, forwarded: u64, discarded: u64) {
        self.publish(PipelineEvent::stage_drained(stage, forwarded, discarded));
    }

    pub fn stage_failed(&self, stage: usize, error: String) {
        self.publish(PipelineEvent::stage_failed(stage, error));
    }
}

/// Event subscriber; receives events published by pipeline units
pub struct PipelineEventSubscriber {
    receiver: Receiver<PipelineEvent>,
}

impl PipelineEventSubscriber {
    /// Get the underlying receiver for select-style consumption
    pub fn receiver(&self) -> &Receiver<PipelineEvent> {
        &self.receiver
    }

    /// Receive the next event without blocking
    pub fn try_recv(&self) -> Option<PipelineEvent> {
        self.receiver.try_recv().ok()
    }

    /// Receive the next event, blocking until one arrives; `None` once every
    /// publisher clone has been dropped and the buffer is empty
    pub fn recv(&self) -> Option<PipelineEvent> {
        self.receiver.recv().ok()
    }
}
