/// Days/hours/minutes/seconds left until the target instant.

const SECOND_MS: i64 = 1_000;
const MINUTE_MS: i64 = 60 * SECOND_MS;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct TimeLeft {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl TimeLeft {
    /// Break a positive millisecond difference into units.
    /// Each unit except `days` wraps at the next larger one.
    /// Returns `None` once the target is reached (`diff_ms <= 0`).
    pub fn from_millis(diff_ms: i64) -> Option<Self> {
        if diff_ms <= 0 {
            return None;
        }
        Some(TimeLeft {
            days: diff_ms / DAY_MS,
            hours: (diff_ms / HOUR_MS) % 24,
            minutes: (diff_ms / MINUTE_MS) % 60,
            seconds: (diff_ms / SECOND_MS) % 60,
        })
    }

    pub fn total_seconds(&self) -> i64 {
        self.days * 86_400 + self.hours * 3_600 + self.minutes * 60 + self.seconds
    }
}
