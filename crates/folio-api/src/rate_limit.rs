use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

/// Submissions accepted per caller per window.
pub const SUBMISSIONS_PER_WINDOW: u32 = 5;
pub const SUBMISSION_WINDOW: Duration = Duration::from_secs(60);

/// Purge stale windows inline once the map grows past this many keys.
const INLINE_PURGE_THRESHOLD: usize = 10_000;

struct Window {
    count: u32,
    started: Instant,
}

/// Fixed-window counter keyed by caller.
///
/// Each key gets `limit` hits per `window`. The window starts at the first hit
/// and resets once `window` has elapsed since then. State is process-local and
/// lost on restart.
pub struct FixedWindowLimiter {
    limit: u32,
    window: Duration,
    windows: Mutex<HashMap<String, Window>>,
}

impl FixedWindowLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// The limiter used for note submissions: 5 per minute.
    pub fn for_submissions() -> Self {
        Self::new(SUBMISSIONS_PER_WINDOW, SUBMISSION_WINDOW)
    }

    pub fn check(&self, key: &str) -> Result<(), Duration> {
        self.check_at(key, Instant::now())
    }

    /// Count a hit for `key` at `now`. On rejection returns how long until the
    /// current window rolls over.
    pub fn check_at(&self, key: &str, now: Instant) -> Result<(), Duration> {
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());

        if windows.len() >= INLINE_PURGE_THRESHOLD {
            let window = self.window;
            windows.retain(|_, w| now.saturating_duration_since(w.started) < window);
        }

        let entry = windows.entry(key.to_string()).or_insert(Window {
            count: 0,
            started: now,
        });

        if now.saturating_duration_since(entry.started) >= self.window {
            entry.count = 0;
            entry.started = now;
        }

        if entry.count >= self.limit {
            let elapsed = now.saturating_duration_since(entry.started);
            return Err(self.window.saturating_sub(elapsed));
        }

        entry.count += 1;
        Ok(())
    }

    /// Drop windows that have fully elapsed. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    pub fn purge_expired_at(&self, now: Instant) -> usize {
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());
        let before = windows.len();
        windows.retain(|_, w| now.saturating_duration_since(w.started) < self.window);
        before - windows.len()
    }

    pub fn tracked_keys(&self) -> usize {
        self.windows.lock().map(|w| w.len()).unwrap_or_else(|e| e.into_inner().len())
    }
}

/// Background task that prunes elapsed windows so one-off callers don't
/// accumulate.
pub async fn run_sweep_loop(limiter: Arc<FixedWindowLimiter>, interval_secs: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

    loop {
        interval.tick().await;

        let removed = limiter.purge_expired();
        if removed > 0 {
            debug!("Rate limiter sweep: dropped {} expired windows", removed);
        }
        let tracked = limiter.tracked_keys();
        if tracked >= INLINE_PURGE_THRESHOLD {
            warn!("Rate limiter tracking {} active callers", tracked);
        }
    }
}
