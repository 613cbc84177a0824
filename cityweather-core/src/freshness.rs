use std::time::{Duration, SystemTime};

/// Three hours, the step size of the OpenWeather forecast.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(3 * 60 * 60);

/// Decides whether a cache entry must be refreshed, based on its mtime alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessPolicy {
    window: Duration,
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl FreshnessPolicy {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Stale iff the entry is strictly older than the window.
    /// An mtime in the future (clock skew) counts as fresh.
    pub fn is_stale(&self, modified: SystemTime, now: SystemTime) -> bool {
        match now.duration_since(modified) {
            Ok(age) => age > self.window,
            Err(_) => false,
        }
    }
}
