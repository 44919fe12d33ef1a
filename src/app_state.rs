// =============================================================================
// Central Application State — Gold Dashboard
// =============================================================================
//
// Shared between the refresh loop and the HTTP / WebSocket surface via
// `Arc<AppState>`. The refresh loop is the only writer of the published
// snapshot; readers clone it out under a short read lock.
//
// Thread safety:
//   - Atomic counter for lock-free version tracking.
//   - parking_lot::RwLock for the snapshot, config and error ring.
//   - tokio::sync::Notify to hand manual refresh requests to the loop.
// =============================================================================

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;
use uuid::Uuid;

use crate::engine::MarketReport;
use crate::news::NewsItem;
use crate::runtime_config::RuntimeConfig;

// =============================================================================
// Error Record
// =============================================================================

/// A recorded error event for the dashboard error log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Which part of the cycle failed: "market" or "news".
    pub source: String,
    /// User-facing message.
    pub message: String,
    /// Underlying cause, for operators.
    pub detail: Option<String>,
    /// Cycle that produced the error, if any.
    pub cycle_id: Option<Uuid>,
    /// ISO 8601 timestamp.
    pub at: String,
}

// =============================================================================
// Dashboard Snapshot
// =============================================================================

/// One refresh cycle's published result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub cycle_id: Uuid,
    pub state_version: u64,
    pub generated_at: DateTime<Utc>,
    pub refresh_interval_secs: u64,

    /// Instrument that actually served the data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol_used: Option<String>,
    pub served_by_fallback: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub market: Option<MarketReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_error: Option<String>,

    pub news: Vec<NewsItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub news_error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_widget_url: Option<String>,
}

// =============================================================================
// AppState
// =============================================================================

/// Maximum number of recent errors to retain.
const MAX_RECENT_ERRORS: usize = 50;

pub struct AppState {
    // ── Version tracking ────────────────────────────────────────────────
    /// Bumped on every publish and every recorded error. The WebSocket feed
    /// polls this to decide when to push.
    pub state_version: AtomicU64,

    // ── Configuration ───────────────────────────────────────────────────
    pub runtime_config: RwLock<RuntimeConfig>,

    // ── Published data ──────────────────────────────────────────────────
    latest: RwLock<Option<DashboardSnapshot>>,

    // ── Error Log ───────────────────────────────────────────────────────
    recent_errors: RwLock<Vec<ErrorRecord>>,

    // ── Manual refresh ──────────────────────────────────────────────────
    pub refresh_requested: Notify,

    // ── Timing ──────────────────────────────────────────────────────────
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            state_version: AtomicU64::new(0),
            runtime_config: RwLock::new(config),
            latest: RwLock::new(None),
            recent_errors: RwLock::new(Vec::new()),
            refresh_requested: Notify::new(),
            start_time: std::time::Instant::now(),
        }
    }

    // ── Version Management ──────────────────────────────────────────────

    /// Atomically increment the state version, returning the new value.
    pub fn increment_version(&self) -> u64 {
        self.state_version.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn current_state_version(&self) -> u64 {
        self.state_version.load(Ordering::SeqCst)
    }

    // ── Snapshot ────────────────────────────────────────────────────────

    /// Replace the published snapshot. The snapshot's `state_version` is
    /// stamped with the freshly bumped counter.
    pub fn publish(&self, mut snapshot: DashboardSnapshot) -> u64 {
        let mut latest = self.latest.write();
        let version = self.increment_version();
        snapshot.state_version = version;
        *latest = Some(snapshot);
        version
    }

    pub fn latest_snapshot(&self) -> Option<DashboardSnapshot> {
        self.latest.read().clone()
    }

    // ── Error Logging ───────────────────────────────────────────────────

    /// Record an error. The ring buffer is capped at [`MAX_RECENT_ERRORS`];
    /// oldest entries are evicted first.
    pub fn push_error(
        &self,
        source: &str,
        message: String,
        detail: Option<String>,
        cycle_id: Option<Uuid>,
    ) {
        let record = ErrorRecord {
            source: source.to_string(),
            message,
            detail,
            cycle_id,
            at: Utc::now().to_rfc3339(),
        };

        let mut errors = self.recent_errors.write();
        errors.push(record);
        if errors.len() > MAX_RECENT_ERRORS {
            let excess = errors.len() - MAX_RECENT_ERRORS;
            errors.drain(..excess);
        }
        drop(errors);

        self.increment_version();
    }

    pub fn recent_errors(&self) -> Vec<ErrorRecord> {
        self.recent_errors.read().clone()
    }

    // ── Manual refresh ──────────────────────────────────────────────────

    /// Ask the refresh loop to run a cycle now. Requests made while a cycle
    /// is running collapse into one follow-up cycle.
    pub fn request_refresh(&self) {
        self.refresh_requested.notify_one();
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
