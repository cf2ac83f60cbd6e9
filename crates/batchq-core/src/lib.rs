//! batchq-core — client-side batching for a remote message queue.
//!
//! Callers hand entries to a [`BatchSender`] one at a time; the sender
//! groups them into bounded batch calls against a [`BatchClient`] and
//! re-queues entries the queue reports as transiently failed.

pub mod config;
pub mod entry;
pub mod error;
pub mod memory;
pub mod queue;
pub mod sender;
pub mod wire;

pub use config::SenderConfig;
pub use entry::Entry;
pub use error::SendError;
pub use memory::MemoryQueue;
pub use queue::Queue;
pub use sender::{with_batch_sender, BatchSender, SenderStats};
pub use wire::{BatchClient, SendBatchRequest, SendBatchResponse, TransportError, MAX_BATCH_ENTRIES};
