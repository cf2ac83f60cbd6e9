//! Queue handle — a queue address bound to a client.

use crate::sender::BatchSender;
use crate::wire::{BatchClient, MAX_BATCH_ENTRIES};

#[derive(Debug, Clone)]
pub struct Queue<C> {
    url: String,
    client: C,
}

impl<C: BatchClient + Clone> Queue<C> {
    pub fn new(url: impl Into<String>, client: C) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Batch sender for this queue with default settings.
    ///
    /// ```
    /// use std::sync::Arc;
    /// use batchq_core::{Entry, MemoryQueue, Queue};
    ///
    /// let client = Arc::new(MemoryQueue::new());
    /// let queue = Queue::new("https://queue.example/1/jobs", client.clone());
    ///
    /// let mut batch = queue.batch_sender();
    /// for i in 0..25 {
    ///     batch.send(Entry::message(i.to_string(), "payload")).unwrap();
    /// }
    /// batch.close().unwrap();
    ///
    /// assert_eq!(client.call_count(), 3);
    /// ```
    pub fn batch_sender(&self) -> BatchSender<C> {
        self.batch_sender_with(false, MAX_BATCH_ENTRIES)
    }

    pub fn batch_sender_with(&self, overwrite_by_id: bool, flush_amount: usize) -> BatchSender<C> {
        BatchSender::with_options(
            self.url.clone(),
            self.client.clone(),
            overwrite_by_id,
            flush_amount,
        )
    }
}
