//! Remote batch-send interface — request/response shapes and the client seam.
//!
//! The queue's batch API takes a queue address plus up to
//! [`MAX_BATCH_ENTRIES`] entries and answers with the entries it could not
//! accept. Anything not listed under `Failed` was accepted.
//!
//! Transport concerns (auth, connection reuse, transport-level retries)
//! live behind [`BatchClient`]; nothing here knows about them.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::entry::Entry;

/// Protocol bound on entries per batch call. Also the default flush size.
pub const MAX_BATCH_ENTRIES: usize = 10;

/// Error returned by a client when the call itself did not produce a response.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

// ── Request ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SendBatchRequest<'a> {
    pub queue_url: &'a str,
    /// Entries in buffer order.
    pub entries: &'a [Entry],
}

// ── Response ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SendBatchResponse {
    pub successful: Vec<SuccessfulEntry>,
    pub failed: Vec<FailedEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SuccessfulEntry {
    pub id: String,
    pub message_id: Option<String>,
    #[serde(rename = "MD5OfMessageBody")]
    pub md5_of_message_body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FailedEntry {
    pub id: String,
    /// `true` when the request itself is at fault. Absent = unclassifiable.
    #[serde(default)]
    pub sender_fault: Option<bool>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Who caused a per-entry failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultClass {
    /// Caller-caused. Fatal, never retried.
    Sender,
    /// Server-caused. Transient, re-queued.
    Server,
}

impl FailedEntry {
    pub fn retryable(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sender_fault: Some(false),
            code: None,
            message: None,
        }
    }

    pub fn fatal(
        id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            sender_fault: Some(true),
            code: Some(code.into()),
            message: Some(message.into()),
        }
    }

    /// `None` when the record carries no `SenderFault`.
    pub fn fault(&self) -> Option<FaultClass> {
        self.sender_fault.map(|sender| {
            if sender {
                FaultClass::Sender
            } else {
                FaultClass::Server
            }
        })
    }
}

impl SendBatchResponse {
    /// Response that reports every entry as failed with a server fault.
    pub fn all_retryable<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            successful: Vec::new(),
            failed: ids.into_iter().map(FailedEntry::retryable).collect(),
        }
    }
}

// ── Client seam ───────────────────────────────────────────────────────────────

/// The one remote operation the sender needs.
///
/// Implementations own transport concerns. A sender calls this
/// synchronously and from one thread at a time; any sharing of the
/// underlying connection is the implementation's business.
pub trait BatchClient {
    fn send_message_batch(
        &self,
        request: &SendBatchRequest<'_>,
    ) -> Result<SendBatchResponse, TransportError>;
}

impl<T: BatchClient + ?Sized> BatchClient for &T {
    fn send_message_batch(
        &self,
        request: &SendBatchRequest<'_>,
    ) -> Result<SendBatchResponse, TransportError> {
        (**self).send_message_batch(request)
    }
}

impl<T: BatchClient + ?Sized> BatchClient for Arc<T> {
    fn send_message_batch(
        &self,
        request: &SendBatchRequest<'_>,
    ) -> Result<SendBatchResponse, TransportError> {
        (**self).send_message_batch(request)
    }
}
