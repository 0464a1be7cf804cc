//! Server statistics collection.
//!
//! Request counters live here; stream counters are owned by the stream
//! registry and merged in when a snapshot is taken.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use signage_server::StreamStats;

/// Server statistics, as returned by `GET /statistics`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStatistics {
    /// Streams currently connected.
    pub open_streams: usize,

    /// Streams opened since start.
    pub streams_opened: u64,

    /// Stream updates sent since start.
    pub updates_emitted: u64,

    /// One-shot media list requests served.
    pub media_requests: u64,

    /// Slider pages rendered.
    pub slider_renders: u64,

    /// Server uptime in seconds.
    pub uptime: u64,

    /// ISO 8601 start time.
    pub started_at: String,
}

/// Collects request statistics.
pub struct StatisticsCollector {
    start_time: Instant,
    started_at: DateTime<Utc>,
    media_requests: AtomicU64,
    slider_renders: AtomicU64,
}

impl StatisticsCollector {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            started_at: Utc::now(),
            media_requests: AtomicU64::new(0),
            slider_renders: AtomicU64::new(0),
        }
    }

    pub fn record_media_request(&self) {
        self.media_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_slider_render(&self) {
        self.slider_renders.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current statistics snapshot.
    pub fn snapshot(&self, streams: &StreamStats) -> ServerStatistics {
        ServerStatistics {
            open_streams: streams.open_streams(),
            streams_opened: streams.opened_total(),
            updates_emitted: streams.emitted_total(),
            media_requests: self.media_requests.load(Ordering::Relaxed),
            slider_renders: self.slider_renders.load(Ordering::Relaxed),
            uptime: self.start_time.elapsed().as_secs(),
            started_at: self.started_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

impl Default for StatisticsCollector {
    fn default() -> Self {
        Self::new()
    }
}
