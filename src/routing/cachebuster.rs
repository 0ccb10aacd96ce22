//! Cache-busting values for forwarded prerender requests.

use std::time::{SystemTime, UNIX_EPOCH};

/// Produces a value unique enough per request that intermediate caches
/// never serve a stale prerender.
pub trait CacheBuster: Send + Sync {
    fn next_value(&self) -> String;
}

/// Wall-clock milliseconds since the Unix epoch, in decimal.
#[derive(Debug, Clone, Copy, Default)]
pub struct WallClock;

impl CacheBuster for WallClock {
    fn next_value(&self) -> String {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis()
            .to_string()
    }
}
