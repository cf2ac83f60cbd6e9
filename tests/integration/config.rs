use anyhow::Result;
use batchq_core::{BatchSender, Entry, SenderConfig};

use crate::*;

fn temp_config(name: &str, text: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!(
        "batchq-it-{name}-{}.toml",
        std::process::id()
    ));
    std::fs::write(&path, text).unwrap();
    path
}

/// A config file drives the sender's threshold and dedup policy.
#[test]
fn test_sender_from_config_file() -> Result<()> {
    init_tracing();
    let path = temp_config(
        "file",
        "[sender]\nqueue_url = \"cfg-jobs\"\nflush_amount = 2\noverwrite_by_id = true\n",
    );
    let config = SenderConfig::load_file(&path)?;
    let _ = std::fs::remove_file(&path);

    let queue = SimQueue::new();
    let mut sender = BatchSender::from_config(&config, &queue);
    sender.send(Entry::message("1", "old"))?;
    sender.send(Entry::message("1", "new"))?;
    assert!(queue.batches().is_empty());

    sender.send(Entry::message("2", "x"))?;
    assert_eq!(queue.batches(), vec![vec!["1", "2"]]);
    assert_eq!(queue.accepted_body("1").as_deref(), Some("new"));
    Ok(())
}

/// Out-of-range flush sizes in the file are clamped by the sender.
#[test]
fn test_oversized_flush_amount_is_clamped() -> Result<()> {
    init_tracing();
    let path = temp_config("clamp", "[sender]\nqueue_url = \"file-jobs\"\nflush_amount = 64\n");
    let config = SenderConfig::load_file(&path)?;
    let _ = std::fs::remove_file(&path);

    assert_eq!(config.queue_url, "file-jobs");
    assert_eq!(config.flush_amount, 64);
    assert_eq!(config.effective_flush_amount(), 10);

    let queue = SimQueue::new();
    let mut sender = BatchSender::from_config(&config, &queue);
    assert_eq!(sender.flush_amount(), 10);

    for id in ids(0..10) {
        sender.send(Entry::message(id, "x"))?;
    }
    assert_eq!(queue.batches(), vec![ids(0..10)]);
    Ok(())
}
