use std::time::{SystemTime, UNIX_EPOCH};

// Time source for tick timestamps.
pub trait Clock: Send + Sync + 'static {
    fn now_epoch_millis(&self) -> u64;
}

// Wall clock used in production.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}
