// LogLens - app/tail.rs
//
// Live tail: watches every configured log source for bytes appended since
// the previous tick and streams them to a single consumer as alert batches.
//
// Architecture:
//   - `TailManager` lives on the consumer thread; `run_tail_watcher` runs on
//     a background thread ticking on a fixed interval.
//   - `TailEngine` is the per-thread state: the source list and the offset
//     table. It is moved into the background thread and never shared, so no
//     lock guards it.
//   - An `Arc<AtomicBool>` cancel flag allows the consumer to stop the tail.
//   - Each tick's alerts travel as one `AlertBatch` over a bounded
//     `sync_channel`. Delivery is best-effort: `try_send` on a full channel
//     drops the batch so the tick loop never waits on a slow consumer.
//
// Per-source behaviour:
//   - stat/read errors are non-fatal and silent (debug log only); the source
//     is retried on the next tick and never stalls the others.
//   - The first successful stat seeds the offset to the current size, so
//     content that predates the tail never produces alerts.
//   - A size smaller than the stored offset is a rotation/truncation; the
//     read restarts at byte 0.
//   - At most `max_read_bytes` are consumed per source per tick; the rest is
//     picked up on later ticks.
//   - A trailing line without a newline is emitted as-is and not re-read:
//     a line caught mid-write may show up split across two alerts.
//   - At most `max_lines_per_source` alerts per source per tick; further
//     lines in the consumed region are dropped.
//
// Encoding: new bytes are decoded as lossy UTF-8. A capped read never ends
// inside a multi-byte character; the incomplete tail waits for the next tick.

use crate::core::model::{AlertBatch, AlertRecord, LogSource};
use crate::platform::config::AppConfig;
use crate::platform::fs::read_bytes_at;
use crate::util::constants::{
    DEFAULT_TAIL_CHANNEL_CAPACITY, MAX_ALERTS_PER_SOURCE_PER_TICK, MAX_TAIL_READ_BYTES_PER_TICK,
    TAIL_CANCEL_CHECK_INTERVAL_MS, TAIL_POLL_INTERVAL_MS,
};
use crate::util::error::TailError;
use crate::util::logging::preview;
use chrono::{DateTime, Local};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TrySendError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

// =============================================================================
// Configuration
// =============================================================================

/// Tuning for one tail instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailConfig {
    /// Time between ticks.
    pub poll_interval: Duration,
    /// Maximum bytes consumed per source per tick.
    pub max_read_bytes: usize,
    /// Maximum alerts emitted per source per tick.
    pub max_lines_per_source: usize,
    /// Capacity of the bounded alert channel.
    pub channel_capacity: usize,
}

impl Default for TailConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(TAIL_POLL_INTERVAL_MS),
            max_read_bytes: MAX_TAIL_READ_BYTES_PER_TICK,
            max_lines_per_source: MAX_ALERTS_PER_SOURCE_PER_TICK,
            channel_capacity: DEFAULT_TAIL_CHANNEL_CAPACITY,
        }
    }
}

impl From<&AppConfig> for TailConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            poll_interval: Duration::from_millis(config.tail_poll_interval_ms),
            max_read_bytes: config.tail_max_read_bytes,
            max_lines_per_source: config.tail_max_lines_per_source,
            channel_capacity: config.tail_channel_capacity,
        }
    }
}

// =============================================================================
// TailEngine (state owned by the background thread)
// =============================================================================

/// Last-known byte length per path.
pub type OffsetTable = HashMap<PathBuf, u64>;

/// Offset tracking and new-line extraction for a fixed set of sources.
///
/// Sources are visited in lexicographic name order, so alert order within a
/// tick is deterministic. Two sources pointing at the same path share one
/// offset entry; only the first of them (by name) reports new lines.
#[derive(Debug)]
pub struct TailEngine {
    sources: Vec<LogSource>,
    offsets: OffsetTable,
    max_read_bytes: usize,
    max_lines_per_source: usize,
}

impl TailEngine {
    pub fn new(mut sources: Vec<LogSource>, config: &TailConfig) -> Self {
        sources.sort();
        Self {
            sources,
            offsets: OffsetTable::new(),
            max_read_bytes: config.max_read_bytes.max(1),
            max_lines_per_source: config.max_lines_per_source,
        }
    }

    pub fn sources(&self) -> &[LogSource] {
        &self.sources
    }

    /// Stored offset for `path`, or `None` if it has never been observed.
    pub fn offset(&self, path: &Path) -> Option<u64> {
        self.offsets.get(path).copied()
    }

    /// Run one tick over every source and return the new alert records.
    pub fn tick(&mut self, now: &DateTime<Local>) -> Vec<AlertRecord> {
        let mut records = Vec::new();
        for source in &self.sources {
            poll_source(
                source,
                &mut self.offsets,
                self.max_read_bytes,
                self.max_lines_per_source,
                now,
                &mut records,
            );
        }
        records
    }
}

/// Examine one source and append its new lines to `out`.
fn poll_source(
    source: &LogSource,
    offsets: &mut OffsetTable,
    max_read_bytes: usize,
    max_lines: usize,
    now: &DateTime<Local>,
    out: &mut Vec<AlertRecord>,
) {
    // -------------------------------------------------------------------------
    // 1. Check current file size.
    // -------------------------------------------------------------------------
    let current_size = match std::fs::metadata(&source.path) {
        Ok(m) => m.len(),
        Err(e) => {
            tracing::debug!(
                source = %source.name,
                file = %source.path.display(),
                error = %e,
                "Tail: stat failed, skipping this tick"
            );
            return;
        }
    };

    // -------------------------------------------------------------------------
    // 2. Seed, skip, or detect rotation.
    // -------------------------------------------------------------------------
    let start = match offsets.get(&source.path).copied() {
        None => {
            tracing::debug!(
                source = %source.name,
                file = %source.path.display(),
                offset = current_size,
                "Tail: seeding initial offset"
            );
            offsets.insert(source.path.clone(), current_size);
            return;
        }
        Some(offset) if current_size == offset => return,
        Some(offset) if current_size < offset => {
            tracing::info!(
                source = %source.name,
                file = %source.path.display(),
                old_offset = offset,
                new_size = current_size,
                "Tail: file truncated or rotated, resetting offset to 0"
            );
            0
        }
        Some(offset) => offset,
    };

    if current_size == start {
        // Truncated to empty.
        offsets.insert(source.path.clone(), start);
        return;
    }

    // -------------------------------------------------------------------------
    // 3. Read new bytes (capped per tick).
    // -------------------------------------------------------------------------
    let read_limit = (current_size - start).min(max_read_bytes as u64) as usize;
    let mut new_bytes = match read_bytes_at(&source.path, start, read_limit) {
        Ok(b) => b,
        Err(e) => {
            tracing::debug!(
                source = %source.name,
                file = %source.path.display(),
                error = %e,
                "Tail: read failed, skipping this tick"
            );
            return;
        }
    };

    // A capped read can end inside a multi-byte character; leave those bytes
    // for the next tick.
    if (new_bytes.len() as u64) < current_size - start {
        let held = incomplete_utf8_tail(&new_bytes);
        if held < new_bytes.len() {
            new_bytes.truncate(new_bytes.len() - held);
        }
    }

    // Advance by what was actually consumed, not to `current_size`.
    offsets.insert(source.path.clone(), start + new_bytes.len() as u64);
    if new_bytes.is_empty() {
        return;
    }

    // -------------------------------------------------------------------------
    // 4. Split into lines and build alerts.
    // -------------------------------------------------------------------------
    let decoded = String::from_utf8_lossy(&new_bytes);
    let mut emitted = 0usize;
    let mut dropped = 0usize;
    for line in decoded.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if emitted < max_lines {
            out.push(AlertRecord::new(&source.name, now, trimmed));
            emitted += 1;
        } else {
            dropped += 1;
        }
    }

    tracing::debug!(
        source = %source.name,
        bytes = new_bytes.len(),
        emitted,
        dropped,
        first = preview(decoded.lines().next().unwrap_or("")),
        "Tail: new content"
    );
}

/// Length of an incomplete UTF-8 sequence at the end of `bytes`, or 0.
fn incomplete_utf8_tail(bytes: &[u8]) -> usize {
    let floor = bytes.len().saturating_sub(3);
    for lead in (floor..bytes.len()).rev() {
        if bytes[lead] & 0xC0 != 0x80 {
            return match std::str::from_utf8(&bytes[lead..]) {
                Err(e) if e.error_len().is_none() => bytes.len() - lead,
                _ => 0,
            };
        }
    }
    0
}

// =============================================================================
// Delivery
// =============================================================================

/// Outcome of offering a batch to the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The batch was queued.
    Sent,
    /// The channel was full; the batch was discarded.
    Dropped,
    /// The consumer has gone away.
    Disconnected,
}

/// Offer `batch` to the consumer without blocking.
pub fn deliver(tx: &SyncSender<AlertBatch>, batch: AlertBatch) -> Delivery {
    match tx.try_send(batch) {
        Ok(()) => Delivery::Sent,
        Err(TrySendError::Full(batch)) => {
            tracing::debug!(alerts = batch.len(), "Tail: consumer busy, batch dropped");
            Delivery::Dropped
        }
        Err(TrySendError::Disconnected(_)) => Delivery::Disconnected,
    }
}

// =============================================================================
// TailManager
// =============================================================================

/// Manages a live tail on a background thread.
///
/// The manager lives on the consumer side and exposes start/stop/receive.
/// Dropping the manager stops the tail.
pub struct TailManager {
    /// Channel receiver for alert batches.
    alert_rx: Option<Receiver<AlertBatch>>,
    /// Cancel flag shared with the background thread.
    cancel_flag: Option<Arc<AtomicBool>>,
    handle: Option<JoinHandle<()>>,
}

impl TailManager {
    pub fn new() -> Self {
        Self {
            alert_rx: None,
            cancel_flag: None,
            handle: None,
        }
    }

    /// Start tailing `sources` from their current end (new content only).
    ///
    /// If a tail is already running it is stopped first.
    pub fn start_tail(
        &mut self,
        sources: Vec<LogSource>,
        config: TailConfig,
    ) -> Result<(), TailError> {
        self.stop_tail();

        if sources.is_empty() {
            return Err(TailError::NoSources);
        }

        let (tx, rx) = mpsc::sync_channel(config.channel_capacity.max(1));
        let cancel = Arc::new(AtomicBool::new(false));
        let engine = TailEngine::new(sources, &config);
        let source_count = engine.sources().len();

        let thread_cancel = Arc::clone(&cancel);
        let interval = config.poll_interval;
        let handle = std::thread::Builder::new()
            .name("loglens-tail".to_string())
            .spawn(move || run_tail_watcher(engine, interval, tx, thread_cancel))
            .map_err(|e| TailError::Spawn { source: e })?;

        self.alert_rx = Some(rx);
        self.cancel_flag = Some(cancel);
        self.handle = Some(handle);

        tracing::info!(
            sources = source_count,
            interval_ms = interval.as_millis() as u64,
            "Live tail started"
        );
        Ok(())
    }

    /// Stop the background thread and wait for it to exit.
    ///
    /// Returns within roughly one cancel-check interval plus one tick's I/O.
    /// Undelivered batches are discarded.
    pub fn stop_tail(&mut self) {
        if let Some(flag) = self.cancel_flag.take() {
            flag.store(true, Ordering::SeqCst);
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("Tail thread panicked");
            } else {
                tracing::info!("Live tail stopped");
            }
        }
        self.alert_rx = None;
    }

    /// Returns `true` while the background thread is running.
    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// The receiving end of the alert channel, for a consumer that wants to
    /// block on `recv()` directly.
    pub fn receiver(&self) -> Option<&Receiver<AlertBatch>> {
        self.alert_rx.as_ref()
    }

    /// Wait up to `timeout` for the next batch.
    ///
    /// Returns `None` on timeout, when no tail is running, or once the
    /// background thread has exited.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<AlertBatch> {
        let rx = self.alert_rx.as_ref()?;
        match rx.recv_timeout(timeout) {
            Ok(batch) => Some(batch),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

impl Default for TailManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TailManager {
    fn drop(&mut self) {
        self.stop_tail();
    }
}

// =============================================================================
// Background tail watcher
// =============================================================================

/// Background tick loop: tick, deliver, sleep; until cancelled or the
/// consumer disconnects.
///
/// The first tick runs immediately and only seeds offsets.
fn run_tail_watcher(
    mut engine: TailEngine,
    interval: Duration,
    tx: SyncSender<AlertBatch>,
    cancel: Arc<AtomicBool>,
) {
    let mut ticks: u64 = 0;
    let mut dropped: u64 = 0;

    loop {
        if cancel.load(Ordering::SeqCst) {
            break;
        }

        let records = engine.tick(&Local::now());
        ticks += 1;

        if !records.is_empty() {
            match deliver(&tx, AlertBatch::new(records)) {
                Delivery::Sent => {}
                Delivery::Dropped => dropped += 1,
                Delivery::Disconnected => {
                    tracing::debug!("Tail: consumer disconnected, exiting");
                    break;
                }
            }
        }

        if sleep_unless_cancelled(interval, &cancel) {
            break;
        }
    }

    tracing::debug!(ticks, dropped_batches = dropped, "Tail watcher exiting");
}

/// Sleep for `total`, waking every `TAIL_CANCEL_CHECK_INTERVAL_MS` to check
/// the cancel flag. Returns `true` if cancellation was observed.
fn sleep_unless_cancelled(total: Duration, cancel: &AtomicBool) -> bool {
    let slice = Duration::from_millis(TAIL_CANCEL_CHECK_INTERVAL_MS);
    let deadline = Instant::now() + total;
    loop {
        if cancel.load(Ordering::SeqCst) {
            return true;
        }
        let now = Instant::now();
        if now >= deadline {
            return false;
        }
        std::thread::sleep(slice.min(deadline - now));
    }
}
