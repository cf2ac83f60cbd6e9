use anyhow::Result;
use batchq_core::{BatchSender, Entry};

use crate::*;

/// N × flush_amount entries with no failures → exactly N contiguous batches.
#[test]
fn test_exact_multiples_produce_contiguous_batches() -> Result<()> {
    init_tracing();
    let queue = SimQueue::new();
    let mut sender = BatchSender::with_options("jobs", &queue, false, 4);

    for id in ids(0..12) {
        sender.send(Entry::message(id, "body"))?;
    }

    let batches = queue.batches();
    assert_eq!(batches.len(), 3);
    assert_eq!(batches[0], ids(0..4));
    assert_eq!(batches[1], ids(4..8));
    assert_eq!(batches[2], ids(8..12));
    assert!(sender.is_empty());

    sender.close()?;
    assert_eq!(queue.batches().len(), 3, "close on empty buffer must not call");
    Ok(())
}

/// Fewer than flush_amount entries wait for close.
#[test]
fn test_partial_batch_waits_for_close() -> Result<()> {
    init_tracing();
    let queue = SimQueue::new();
    let mut sender = BatchSender::new("jobs", &queue);

    for id in ids(0..9) {
        sender.send(Entry::message(id, "body"))?;
    }
    assert!(queue.batches().is_empty());

    sender.close()?;
    assert_eq!(queue.batches(), vec![ids(0..9)]);
    assert_eq!(queue.accepted_ids(), ids(0..9));
    Ok(())
}

/// Large volume: every batch bounded, order preserved, nothing lost.
#[test]
fn test_bulk_send_preserves_order() -> Result<()> {
    init_tracing();
    let queue = SimQueue::new();
    let mut sender = BatchSender::new("jobs", &queue);

    for id in ids(0..1000) {
        sender.send(Entry::message(id.clone(), format!("payload {id}")))?;
    }
    sender.close()?;

    let batches = queue.batches();
    assert_eq!(batches.len(), 100);
    assert!(batches.iter().all(|b| b.len() <= batchq_core::MAX_BATCH_ENTRIES));
    assert_eq!(queue.accepted_ids(), ids(0..1000));
    assert_eq!(queue.accepted_body("999").as_deref(), Some("payload 999"));
    Ok(())
}

/// Overwrite-by-id keeps only the newest payload per id until flush.
#[test]
fn test_overwrite_by_id_sends_latest_payload() -> Result<()> {
    init_tracing();
    let queue = SimQueue::new();
    let mut sender = BatchSender::with_options("jobs", &queue, true, 3);

    sender.send(Entry::message("1", "v1"))?;
    sender.send(Entry::message("2", "v1"))?;
    sender.send(Entry::message("1", "v2"))?;
    assert_eq!(sender.len(), 2);
    assert_eq!(sender.stats().overwritten, 1);

    sender.send(Entry::message("3", "v1"))?;
    assert_eq!(queue.batches(), vec![vec!["2", "1", "3"]]);
    assert_eq!(queue.accepted_body("1").as_deref(), Some("v2"));
    Ok(())
}
