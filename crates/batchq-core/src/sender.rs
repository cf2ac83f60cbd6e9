//! BatchSender — buffers entries for one queue and flushes them in batches.
//!
//! Entries are grouped in the order received. A flush takes at most
//! `flush_amount` entries from the head of the buffer and submits them as
//! one batch call. Per-entry results are triaged:
//!
//!   not listed        → acknowledged, dropped from the buffer
//!   server fault      → appended to the tail, retried by a later flush
//!   sender fault      → fatal, the flush fails with `RemoteRejection`
//!   no classification → fatal, the flush fails with `Unclassified`
//!
//! Retryable entries are re-queued before a fatal error is raised, so a
//! caller that catches the error and keeps going loses nothing retryable.
//!
//! A transport failure of the batch call propagates unchanged and the
//! entries of that attempt are not re-queued: the queue may or may not have
//! accepted them, and re-sending could duplicate.
//!
//! Closing drains the buffer with repeated flushes. `close` returns the
//! first error and abandons whatever is left. Dropping an unclosed sender
//! drains too, on every exit path including unwinding; errors there can
//! only be logged.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use serde_json::{Map, Value};

use crate::config::{clamp_flush_amount, SenderConfig};
use crate::entry::Entry;
use crate::error::SendError;
use crate::wire::{BatchClient, FailedEntry, FaultClass, SendBatchRequest, MAX_BATCH_ENTRIES};

/// Operation name carried by remote rejections.
const OPERATION: &str = "SendMessage";

/// Lifetime counters for one sender.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SenderStats {
    /// Batch calls that returned a structured response.
    pub batches_sent: u64,
    pub acknowledged: u64,
    /// Entries re-queued after a server fault. Counted once per attempt.
    pub retried: u64,
    pub rejected: u64,
    /// Buffered entries replaced by a newer entry with the same id.
    pub overwritten: u64,
}

pub struct BatchSender<C: BatchClient> {
    queue_url: String,
    client: C,
    buffer: VecDeque<Entry>,
    overwrite_by_id: bool,
    flush_amount: usize,
    stats: SenderStats,
    closed: bool,
}

impl<C: BatchClient> BatchSender<C> {
    /// Sender with dedup off and the protocol-maximum flush size.
    pub fn new(queue_url: impl Into<String>, client: C) -> Self {
        Self::with_options(queue_url, client, false, MAX_BATCH_ENTRIES)
    }

    /// `flush_amount` is clamped to [1, MAX_BATCH_ENTRIES].
    pub fn with_options(
        queue_url: impl Into<String>,
        client: C,
        overwrite_by_id: bool,
        flush_amount: usize,
    ) -> Self {
        let flush_amount = clamp_flush_amount(flush_amount);
        Self {
            queue_url: queue_url.into(),
            client,
            buffer: VecDeque::with_capacity(flush_amount),
            overwrite_by_id,
            flush_amount,
            stats: SenderStats::default(),
            closed: false,
        }
    }

    pub fn from_config(config: &SenderConfig, client: C) -> Self {
        Self::with_options(
            config.queue_url.clone(),
            client,
            config.overwrite_by_id,
            config.flush_amount,
        )
    }

    /// Buffer one entry, flushing once if the buffer reached `flush_amount`.
    ///
    /// An entry without an id is refused before anything is buffered.
    pub fn send(&mut self, entry: Entry) -> Result<(), SendError> {
        entry.validate()?;
        if self.overwrite_by_id {
            self.remove_duplicates(&entry);
        }
        self.buffer.push_back(entry);
        self.flush_if_needed()
    }

    /// Dynamic form of [`send`](Self::send): `Id` plus opaque fields.
    pub fn send_fields(&mut self, fields: Map<String, Value>) -> Result<(), SendError> {
        self.send(Entry::from_map(fields)?)
    }

    /// Drain the buffer and consume the sender.
    pub fn close(mut self) -> Result<(), SendError> {
        self.closed = true;
        let result = self.drain();
        tracing::debug!(
            queue = %self.queue_url,
            batches = self.stats.batches_sent,
            acknowledged = self.stats.acknowledged,
            retried = self.stats.retried,
            rejected = self.stats.rejected,
            abandoned = self.buffer.len(),
            "batch sender closed"
        );
        result
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Buffered entries, head first.
    pub fn buffered(&self) -> impl Iterator<Item = &Entry> {
        self.buffer.iter()
    }

    pub fn queue_url(&self) -> &str {
        &self.queue_url
    }

    pub fn flush_amount(&self) -> usize {
        self.flush_amount
    }

    pub fn overwrite_by_id(&self) -> bool {
        self.overwrite_by_id
    }

    pub fn stats(&self) -> SenderStats {
        self.stats
    }

    // ── Internals ─────────────────────────────────────────────────────────────

    fn remove_duplicates(&mut self, new_entry: &Entry) {
        let before = self.buffer.len();
        self.buffer.retain(|queued| {
            let duplicate = queued.same_id(new_entry);
            if duplicate {
                tracing::debug!(
                    id = %queued.id,
                    "overwrite_by_id enabled, skipping buffered entry"
                );
            }
            !duplicate
        });
        self.stats.overwritten += (before - self.buffer.len()) as u64;
    }

    fn flush_if_needed(&mut self) -> Result<(), SendError> {
        if self.buffer.len() >= self.flush_amount {
            self.flush()?;
        }
        Ok(())
    }

    fn drain(&mut self) -> Result<(), SendError> {
        while !self.buffer.is_empty() {
            self.flush()?;
        }
        Ok(())
    }

    /// Submit the head of the buffer as one batch call and triage the result.
    fn flush(&mut self) -> Result<(), SendError> {
        let take = self.flush_amount.min(self.buffer.len());
        if take == 0 {
            return Ok(());
        }
        let batch: Vec<Entry> = self.buffer.drain(..take).collect();

        tracing::debug!(queue = %self.queue_url, entries = batch.len(), "flushing batch");

        let request = SendBatchRequest {
            queue_url: &self.queue_url,
            entries: &batch,
        };
        let response = self
            .client
            .send_message_batch(&request)
            .map_err(SendError::Transport)?;
        self.stats.batches_sent += 1;

        self.triage(batch, &response.failed)
    }

    fn triage(&mut self, batch: Vec<Entry>, failed: &[FailedEntry]) -> Result<(), SendError> {
        let submitted: HashSet<&str> = batch.iter().map(|e| e.id.as_str()).collect();
        for failure in failed {
            if !submitted.contains(failure.id.as_str()) {
                tracing::warn!(id = %failure.id, "failure reported for an entry not in this batch");
            }
        }

        let failures: HashMap<&str, &FailedEntry> =
            failed.iter().map(|f| (f.id.as_str(), f)).collect();

        let mut fatal: Option<SendError> = None;
        let mut requeued = 0usize;

        for entry in batch {
            let Some(failure) = failures.get(entry.id.as_str()) else {
                self.stats.acknowledged += 1;
                continue;
            };
            match failure.fault() {
                Some(FaultClass::Server) => {
                    self.buffer.push_back(entry);
                    requeued += 1;
                }
                Some(FaultClass::Sender) => {
                    self.stats.rejected += 1;
                    fatal.get_or_insert_with(|| SendError::RemoteRejection {
                        operation: OPERATION,
                        id: entry.id.clone(),
                        code: failure.code.clone().unwrap_or_default(),
                        message: failure.message.clone().unwrap_or_default(),
                    });
                }
                None => {
                    self.stats.rejected += 1;
                    fatal.get_or_insert_with(|| SendError::Unclassified {
                        id: entry.id.clone(),
                    });
                }
            }
        }

        if requeued > 0 {
            self.stats.retried += requeued as u64;
            tracing::info!(
                queue = %self.queue_url,
                requeued,
                buffered = self.buffer.len(),
                "re-queued retryable entries"
            );
        }

        match fatal {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl<C: BatchClient> Drop for BatchSender<C> {
    fn drop(&mut self) {
        if self.closed || self.buffer.is_empty() {
            return;
        }
        if let Err(e) = self.drain() {
            tracing::error!(
                queue = %self.queue_url,
                error = %e,
                abandoned = self.buffer.len(),
                "failed to drain batch sender on drop"
            );
        }
    }
}

impl<C: BatchClient> fmt::Debug for BatchSender<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchSender")
            .field("queue_url", &self.queue_url)
            .field("buffered", &self.buffer.len())
            .field("overwrite_by_id", &self.overwrite_by_id)
            .field("flush_amount", &self.flush_amount)
            .field("stats", &self.stats)
            .finish()
    }
}

/// Run `body` against `sender`, then drain it whatever the outcome.
///
/// When both fail, the drain error is returned and the body error logged:
/// entries left unsent by the drain take precedence over the caller's own failure.
pub fn with_batch_sender<C, T, E, F>(mut sender: BatchSender<C>, body: F) -> Result<T, E>
where
    C: BatchClient,
    E: From<SendError> + fmt::Display,
    F: FnOnce(&mut BatchSender<C>) -> Result<T, E>,
{
    let outcome = body(&mut sender);
    let drained = sender.close();
    match (outcome, drained) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => Err(e.into()),
        (Err(e), Ok(())) => Err(e),
        (Err(body_err), Err(drain_err)) => {
            tracing::warn!(error = %body_err, "batch scope failed before its drain also failed");
            Err(drain_err.into())
        }
    }
}
