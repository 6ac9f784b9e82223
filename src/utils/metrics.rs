//! Transport Metrics
//!
//! Process-wide counters updated by the TCP and UDP channels.
//!
//! Uses atomic counters so channels on different threads can share them.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info};

/// Counters for channel activity
#[derive(Debug)]
pub struct Metrics {
    /// Bytes written to streams
    pub bytes_sent: AtomicU64,
    /// Bytes read from streams
    pub bytes_received: AtomicU64,
    /// Datagrams sent
    pub datagrams_sent: AtomicU64,
    /// Datagrams received
    pub datagrams_received: AtomicU64,
    /// Payload bytes across all datagrams sent
    pub datagram_bytes_sent: AtomicU64,
    /// Payload bytes across all datagrams received
    pub datagram_bytes_received: AtomicU64,
    /// System calls reissued after `Interrupted`
    pub interrupted_retries: AtomicU64,
    /// Sends the OS accepted only in part
    pub short_writes: AtomicU64,
    /// Receives that failed
    pub read_failures: AtomicU64,
    /// Streams closed by the peer (shutdown or reset)
    pub graceful_closes: AtomicU64,
    /// Descriptor closes that reported an error
    pub close_failures: AtomicU64,
    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            bytes_sent: AtomicU64::new(0),
            bytes_received: AtomicU64::new(0),
            datagrams_sent: AtomicU64::new(0),
            datagrams_received: AtomicU64::new(0),
            datagram_bytes_sent: AtomicU64::new(0),
            datagram_bytes_received: AtomicU64::new(0),
            interrupted_retries: AtomicU64::new(0),
            short_writes: AtomicU64::new(0),
            read_failures: AtomicU64::new(0),
            graceful_closes: AtomicU64::new(0),
            close_failures: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn bytes_sent(&self, byte_count: u64) {
        self.bytes_sent.fetch_add(byte_count, Ordering::Relaxed);
    }

    pub fn bytes_received(&self, byte_count: u64) {
        self.bytes_received.fetch_add(byte_count, Ordering::Relaxed);
    }

    pub fn datagram_sent(&self, byte_count: u64) {
        self.datagrams_sent.fetch_add(1, Ordering::Relaxed);
        self.datagram_bytes_sent
            .fetch_add(byte_count, Ordering::Relaxed);
    }

    pub fn datagram_received(&self, byte_count: u64) {
        self.datagrams_received.fetch_add(1, Ordering::Relaxed);
        self.datagram_bytes_received
            .fetch_add(byte_count, Ordering::Relaxed);
    }

    pub fn interrupted_retry(&self) {
        self.interrupted_retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn short_write(&self) {
        self.short_writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn read_failure(&self) {
        self.read_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn graceful_close(&self) {
        self.graceful_closes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn close_failure(&self) {
        self.close_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            datagrams_sent: self.datagrams_sent.load(Ordering::Relaxed),
            datagrams_received: self.datagrams_received.load(Ordering::Relaxed),
            datagram_bytes_sent: self.datagram_bytes_sent.load(Ordering::Relaxed),
            datagram_bytes_received: self.datagram_bytes_received.load(Ordering::Relaxed),
            interrupted_retries: self.interrupted_retries.load(Ordering::Relaxed),
            short_writes: self.short_writes.load(Ordering::Relaxed),
            read_failures: self.read_failures.load(Ordering::Relaxed),
            graceful_closes: self.graceful_closes.load(Ordering::Relaxed),
            close_failures: self.close_failures.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    /// Log current metrics
    pub fn log_metrics(&self) {
        let snapshot = self.snapshot();
        info!(
            bytes_sent = snapshot.bytes_sent,
            bytes_received = snapshot.bytes_received,
            datagrams_sent = snapshot.datagrams_sent,
            datagrams_received = snapshot.datagrams_received,
            datagram_bytes_sent = snapshot.datagram_bytes_sent,
            datagram_bytes_received = snapshot.datagram_bytes_received,
            interrupted_retries = snapshot.interrupted_retries,
            short_writes = snapshot.short_writes,
            read_failures = snapshot.read_failures,
            graceful_closes = snapshot.graceful_closes,
            close_failures = snapshot.close_failures,
            uptime_seconds = snapshot.uptime_seconds,
            "Transport metrics snapshot"
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub datagrams_sent: u64,
    pub datagrams_received: u64,
    pub datagram_bytes_sent: u64,
    pub datagram_bytes_received: u64,
    pub interrupted_retries: u64,
    pub short_writes: u64,
    pub read_failures: u64,
    pub graceful_closes: u64,
    pub close_failures: u64,
    pub uptime_seconds: u64,
}

static METRICS: once_cell::sync::Lazy<Metrics> = once_cell::sync::Lazy::new(Metrics::new);

/// Get the global metrics instance
pub fn global_metrics() -> &'static Metrics {
    &METRICS
}

/// Initialize metrics collection (call once at startup)
pub fn init_metrics() {
    let _ = global_metrics();
    debug!("Metrics collection initialized");
}
