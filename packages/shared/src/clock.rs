use chrono::{DateTime, Duration, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

/// Fixed-width, so lexicographic order matches chronological order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Source of the timestamps embedded in `StatusDate`.
pub trait Clock: Send + Sync {
    fn now(&self) -> String;
}

pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.format(TIMESTAMP_FORMAT).to_string()
}

/// Wall clock that never hands out a timestamp older than the previous one.
#[derive(Debug, Default)]
pub struct SystemClock {
    last_micros: AtomicI64,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock::default()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> String {
        let current = Utc::now();
        let micros = current.timestamp_micros();
        let previous = self.last_micros.fetch_max(micros, Ordering::SeqCst);
        if previous > micros {
            if let Some(instant) = DateTime::from_timestamp_micros(previous) {
                return format_timestamp(instant);
            }
        }
        format_timestamp(current)
    }
}

/// Deterministic clock: every call advances by a fixed step.
#[derive(Debug)]
pub struct TickingClock {
    start: DateTime<Utc>,
    step: Duration,
    ticks: AtomicI64,
}

impl TickingClock {
    pub fn new(start: DateTime<Utc>, step: Duration) -> Self {
        TickingClock {
            start,
            step,
            ticks: AtomicI64::new(0),
        }
    }

    /// Starts at the Unix epoch and ticks one second at a time.
    pub fn from_epoch() -> Self {
        TickingClock::new(DateTime::<Utc>::UNIX_EPOCH, Duration::seconds(1))
    }
}

impl Clock for TickingClock {
    fn now(&self) -> String {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        let offset = self.step * i32::try_from(tick).unwrap_or(i32::MAX);
        format_timestamp(self.start + offset)
    }
}
