// LogLens - tests/e2e_tail.rs
//
// End-to-end tests for the live tail: real files on disk, the real
// background thread, and the real bounded channel. Timing-sensitive
// assertions use generous timeouts so they hold on slow CI machines.

use loglens::app::tail::{TailConfig, TailManager};
use loglens::core::model::LogSource;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::TempDir;

const WAIT: Duration = Duration::from_secs(5);

fn fast_config(channel_capacity: usize) -> TailConfig {
    TailConfig {
        poll_interval: Duration::from_millis(20),
        channel_capacity,
        ..TailConfig::default()
    }
}

fn append(path: &Path, text: &str) {
    let mut f = OpenOptions::new().append(true).open(path).unwrap();
    f.write_all(text.as_bytes()).unwrap();
}

/// Give the background thread time to run its seeding tick.
fn let_ticks_pass() {
    std::thread::sleep(Duration::from_millis(150));
}

/// Pre-existing content is never reported; appended content is, rendered
/// with an upper-cased source name.
#[test]
fn e2e_tail_reports_only_appended_lines() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nginx.log");
    fs::write(&path, "old line 1\nold line 2\n").unwrap();

    let mut manager = TailManager::new();
    manager
        .start_tail(vec![LogSource::new("nginx", &path)], fast_config(8))
        .unwrap();
    let_ticks_pass();

    append(&path, "GET /health 500\n");
    let batch = manager.recv_timeout(WAIT).expect("alert batch");
    assert_eq!(batch.records.len(), 1);
    assert_eq!(batch.records[0].line, "GET /health 500");

    let message = batch.message();
    assert!(message.ends_with("🚨 NGINX: GET /health 500"), "{message}");
    assert!(!message.contains("old line"));

    manager.stop_tail();
}

/// A file that shrinks is treated as rotated: its new content is read from
/// byte 0 rather than ignored.
#[test]
fn e2e_tail_survives_rotation() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.log");
    fs::write(&path, "x".repeat(499) + "\n").unwrap();

    let mut manager = TailManager::new();
    manager
        .start_tail(vec![LogSource::new("app", &path)], fast_config(8))
        .unwrap();
    let_ticks_pass();

    fs::write(&path, "after rotation\n").unwrap();
    let batch = manager.recv_timeout(WAIT).expect("alert after rotation");
    assert_eq!(batch.records[0].line, "after rotation");

    manager.stop_tail();
}

/// With a full channel and a consumer that is not reading, the producer
/// keeps ticking: it drops batches instead of blocking, and delivery resumes
/// once the consumer reads again.
#[test]
fn e2e_tail_never_blocks_on_slow_consumer() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.log");
    fs::write(&path, "").unwrap();

    let mut manager = TailManager::new();
    manager
        .start_tail(vec![LogSource::new("app", &path)], fast_config(1))
        .unwrap();
    let_ticks_pass();

    // First batch fills the single slot; the next one cannot be queued.
    append(&path, "first\n");
    let_ticks_pass();
    append(&path, "second\n");
    let_ticks_pass();
    assert!(manager.is_active(), "producer must still be running");

    let first = manager.recv_timeout(WAIT).expect("first batch");
    assert_eq!(first.records[0].line, "first");
    assert!(
        manager.recv_timeout(Duration::from_millis(100)).is_none(),
        "second batch was dropped while the channel was full"
    );

    append(&path, "third\n");
    let third = manager.recv_timeout(WAIT).expect("loop still alive");
    assert_eq!(third.records[0].line, "third");

    let start = Instant::now();
    manager.stop_tail();
    assert!(start.elapsed() < Duration::from_secs(2));
}

/// Stopping with undrained messages in the channel does not hang.
#[test]
fn e2e_tail_stop_without_draining() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.log");
    fs::write(&path, "").unwrap();

    let mut manager = TailManager::new();
    manager
        .start_tail(vec![LogSource::new("app", &path)], fast_config(4))
        .unwrap();
    let_ticks_pass();
    for i in 0..3 {
        append(&path, &format!("pending {i}\n"));
        let_ticks_pass();
    }

    let start = Instant::now();
    drop(manager);
    assert!(start.elapsed() < Duration::from_secs(2));
}

/// Several sources changing in one tick arrive in a single batch ordered
/// by source name.
#[test]
fn e2e_tail_batches_sources_in_name_order() {
    let dir = TempDir::new().unwrap();
    let b = dir.path().join("b.log");
    let a = dir.path().join("a.log");
    fs::write(&a, "").unwrap();
    fs::write(&b, "").unwrap();

    // Long interval so both appends land before the same tick.
    let config = TailConfig {
        poll_interval: Duration::from_millis(400),
        ..TailConfig::default()
    };
    let mut manager = TailManager::new();
    manager
        .start_tail(
            vec![LogSource::new("beta", &b), LogSource::new("alpha", &a)],
            config,
        )
        .unwrap();
    let_ticks_pass();

    append(&b, "from beta\n");
    append(&a, "from alpha\n");

    let batch = manager.recv_timeout(WAIT).expect("batch");
    let names: Vec<_> = batch.records.iter().map(|r| r.source_name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "beta"]);
    assert_eq!(batch.message().lines().count(), 2);

    manager.stop_tail();
}
