use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug)]
struct Window {
    started_at: Instant,
    suppressed: u64,
}

/// Rate-limits repeated log events per key. A poll hitting a broken storage
/// area every tick would otherwise log the same failure forever.
#[derive(Debug)]
pub struct LogThrottle {
    interval: Duration,
    windows: Mutex<HashMap<&'static str, Window>>,
}

impl LogThrottle {
    pub fn new(interval: Duration) -> Self {
        LogThrottle {
            interval,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Returns `Some(suppressed_count)` when an event for `key` should be
    /// logged, otherwise `None` and the event is counted as suppressed.
    pub fn should_emit(&self, key: &'static str) -> Option<u64> {
        let now = Instant::now();
        // A poisoned lock only means another thread panicked mid-update;
        // the counters are still usable.
        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let Some(window) = windows.get_mut(key) else {
            windows.insert(
                key,
                Window {
                    started_at: now,
                    suppressed: 0,
                },
            );
            return Some(0);
        };
        if now.duration_since(window.started_at) >= self.interval {
            let suppressed = window.suppressed;
            window.started_at = now;
            window.suppressed = 0;
            Some(suppressed)
        } else {
            window.suppressed += 1;
            None
        }
    }
}
