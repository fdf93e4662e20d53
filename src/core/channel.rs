/*!
 * Blocking candidate conduits between pipeline units
 *
 * Each hop in the chain is a unidirectional crossbeam channel wrapped so
 * that both ends can be closed explicitly and independently. Closing the
 * write end is the only end-of-stream signal in the pipeline; closing the
 * read end makes later sends fail fast instead of blocking forever.
 */

use crossbeam_channel::{bounded, Receiver, Sender};
use thiserror::Error;

/// A send observed that the read end of the hop is gone. Carries the value
/// that could not be delivered.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("candidate channel disconnected: read end closed")]
pub struct Disconnected(pub u64);

impl Disconnected {
    /// The candidate that could not be delivered
    pub fn into_value(self) -> u64 {
        self.0
    }
}

/// Create a candidate conduit. Capacity 0 yields a rendezvous hop where a
/// send completes only when the receiver takes the value; larger capacities
/// buffer up to `capacity` values in flight.
pub fn candidate_channel(capacity: usize) -> (CandidateSender, CandidateReceiver) {
    let (tx, rx) = bounded(capacity);
    (
        CandidateSender { inner: Some(tx) },
        CandidateReceiver { inner: Some(rx) },
    )
}

/// Write end of a candidate conduit.
///
/// Deliberately not `Clone`: every hop has exactly one writer, so closing
/// this end is a complete end-of-stream signal for the hop.
#[derive(Debug)]
pub struct CandidateSender {
    inner: Option<Sender<u64>>,
}

impl CandidateSender {
    /// Deliver one candidate downstream. Blocks until the receiver accepts
    /// the value or buffer space frees up; returns the value if the read end
    /// is closed.
    pub fn send(&self, value: u64) -> Result<(), Disconnected> {
        match &self.inner {
            Some(tx) => tx.send(value).map_err(|err| Disconnected(err.into_inner())),
            None => Err(Disconnected(value)),
        }
    }

    /// Close the write end. Idempotent. A receiver blocked on the hop wakes
    /// with end-of-stream once any buffered values are drained.
    pub fn close(&mut self) {
        self.inner = None;
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }
}

/// Read end of a candidate conduit.
#[derive(Debug)]
pub struct CandidateReceiver {
    inner: Option<Receiver<u64>>,
}

impl CandidateReceiver {
    /// Receive the next candidate. Blocks until a value arrives; returns
    /// `None` once the write end is closed and the buffer is empty.
    pub fn recv(&self) -> Option<u64> {
        self.inner.as_ref()?.recv().ok()
    }

    /// Close the read end. Idempotent. Later sends on the hop fail fast with
    /// `Disconnected` instead of blocking.
    pub fn close(&mut self) {
        self.inner = None;
    }
}
