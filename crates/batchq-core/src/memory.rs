//! In-memory scripted queue client.
//!
//! Records every batch call and answers from a FIFO script. With an empty
//! script every entry is acknowledged.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use crate::entry::Entry;
use crate::wire::{
    BatchClient, FailedEntry, SendBatchRequest, SendBatchResponse, SuccessfulEntry,
    TransportError,
};

/// One scripted answer.
#[derive(Debug, Clone)]
pub enum Scripted {
    Respond(SendBatchResponse),
    TransportFailure(String),
}

/// A recorded batch call.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub queue_url: String,
    pub entries: Vec<Entry>,
}

#[derive(Default)]
struct Inner {
    script: VecDeque<Scripted>,
    calls: Vec<RecordedCall>,
}

#[derive(Default)]
pub struct MemoryQueue {
    inner: Mutex<Inner>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, response: SendBatchResponse) {
        self.lock().script.push_back(Scripted::Respond(response));
    }

    pub fn push_failure(&self, reason: impl Into<String>) {
        self.lock()
            .script
            .push_back(Scripted::TransportFailure(reason.into()));
    }

    /// Script a response marking `ids` as server-caused failures.
    pub fn fail_ids_retryable<'a>(&self, ids: impl IntoIterator<Item = &'a str>) {
        self.push_response(SendBatchResponse::all_retryable(ids));
    }

    /// Script a response marking `id` as a caller-caused failure.
    pub fn fail_id_fatal(&self, id: &str, code: &str, message: &str) {
        self.push_response(SendBatchResponse {
            successful: Vec::new(),
            failed: vec![FailedEntry::fatal(id, code, message)],
        });
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    /// Ids of every call, in call order.
    pub fn batch_ids(&self) -> Vec<Vec<String>> {
        self.lock()
            .calls
            .iter()
            .map(|c| c.entries.iter().map(|e| e.id.clone()).collect())
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panicking test thread must not hide the calls it already made.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl BatchClient for MemoryQueue {
    fn send_message_batch(
        &self,
        request: &SendBatchRequest<'_>,
    ) -> Result<SendBatchResponse, TransportError> {
        let mut inner = self.lock();
        inner.calls.push(RecordedCall {
            queue_url: request.queue_url.to_string(),
            entries: request.entries.to_vec(),
        });

        match inner.script.pop_front() {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::TransportFailure(reason)) => Err(reason.into()),
            None => Ok(SendBatchResponse {
                successful: request
                    .entries
                    .iter()
                    .map(|e| SuccessfulEntry {
                        id: e.id.clone(),
                        ..Default::default()
                    })
                    .collect(),
                failed: Vec::new(),
            }),
        }
    }
}
