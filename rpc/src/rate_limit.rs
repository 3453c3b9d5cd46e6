//! Fixed-window request limiter keyed by caller.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Default number of requests allowed per window.
pub const DEFAULT_QUOTA: u32 = 30;

/// Default window length.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Counts requests per caller in fixed windows.
///
/// A caller's window starts with its first request and lasts `window`;
/// within it at most `quota` requests are admitted. Windows that have
/// ended are swept out at most once per window length.
pub struct RateLimiter {
    quota: u32,
    window: Duration,
    state: Mutex<LimiterState>,
}

struct LimiterState {
    /// caller -> (count, window_start)
    windows: HashMap<String, (u32, Instant)>,
    last_sweep: Instant,
}

impl RateLimiter {
    pub fn new(quota: u32, window: Duration) -> Self {
        Self {
            quota,
            window,
            state: Mutex::new(LimiterState {
                windows: HashMap::new(),
                last_sweep: Instant::now(),
            }),
        }
    }

    pub fn quota(&self) -> u32 {
        self.quota
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record a request from `caller`; `false` means it is over quota.
    pub fn check(&self, caller: &str) -> bool {
        self.check_at(caller, Instant::now())
    }

    pub fn check_at(&self, caller: &str, now: Instant) -> bool {
        // Counters only; a panic elsewhere never leaves them inconsistent.
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if now.saturating_duration_since(state.last_sweep) >= self.window {
            let window = self.window;
            state
                .windows
                .retain(|_, (_, start)| now.saturating_duration_since(*start) < window);
            state.last_sweep = now;
        }

        match state.windows.get_mut(caller) {
            Some((count, start)) if now.saturating_duration_since(*start) < self.window => {
                if *count >= self.quota {
                    return false;
                }
                *count += 1;
                true
            }
            Some(entry) => {
                *entry = (1, now);
                self.quota > 0
            }
            None => {
                state.windows.insert(caller.to_string(), (1, now));
                self.quota > 0
            }
        }
    }

    /// Number of callers currently tracked.
    pub fn tracked(&self) -> usize {
        self.state
            .lock()
            .map(|s| s.windows.len())
            .unwrap_or_else(|poisoned| poisoned.into_inner().windows.len())
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_QUOTA, DEFAULT_WINDOW)
    }
}
