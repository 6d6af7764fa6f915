//! Single-consumer inbox for asynchronous results.
//!
//! Long-latency work (Oracle queries, audio device acquisition) must never
//! block a tick. It runs elsewhere and posts completions into this inbox,
//! which the engine drains at the start of the next tick. Results are
//! applied in completion order, not request order; supersession is handled
//! downstream by token checks.

use crate::oracle::OracleRecord;
use std::sync::mpsc;

/// A completed asynchronous operation.
#[derive(Clone, Debug, PartialEq)]
pub enum AsyncResult {
    /// An Oracle response (or client-side failure surfaced as a record).
    Oracle(OracleRecord),
    /// An audio source became available.
    AudioAttached { buffer_len: usize },
    /// The audio source went away.
    AudioLost,
}

/// Cloneable producer half, handed to async workers.
#[derive(Clone, Debug)]
pub struct InboxSender {
    tx: mpsc::Sender<AsyncResult>,
}

impl InboxSender {
    /// Post a completion. Silently dropped if the engine has shut down.
    pub fn post(&self, result: AsyncResult) {
        let _ = self.tx.send(result);
    }
}

/// The engine-owned consumer half.
#[derive(Debug)]
pub struct Inbox {
    tx: mpsc::Sender<AsyncResult>,
    rx: mpsc::Receiver<AsyncResult>,
}

impl Inbox {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    /// A new producer handle.
    pub fn sender(&self) -> InboxSender {
        InboxSender {
            tx: self.tx.clone(),
        }
    }

    /// Take everything that has completed since the last drain, in
    /// completion order.
    pub fn drain(&mut self) -> Vec<AsyncResult> {
        self.rx.try_iter().collect()
    }
}

impl Default for Inbox {
    fn default() -> Self {
        Self::new()
    }
}
