use chrono::Utc;

pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Next log timestamp: wall-clock time, bumped past `last` so ordering stays strict.
pub fn next_timestamp(now_millis: i64, last: Option<i64>) -> i64 {
    match last {
        Some(last) if now_millis <= last => last.saturating_add(1),
        _ => now_millis,
    }
}
