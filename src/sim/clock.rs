/// Wall-clock source for the countdown.
///
/// The controller never calls `Utc::now()` itself; it reads the injected
/// clock so tests can drive the whole midnight sequence without waiting.

use chrono::{DateTime, Utc};

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Hand-driven clock. Clones share the same instant.
#[cfg(test)]
#[derive(Clone)]
pub struct ManualClock(std::rc::Rc<std::cell::Cell<DateTime<Utc>>>);

#[cfg(test)]
impl ManualClock {
    pub fn at(t: DateTime<Utc>) -> Self {
        ManualClock(std::rc::Rc::new(std::cell::Cell::new(t)))
    }

    pub fn set(&self, t: DateTime<Utc>) {
        self.0.set(t);
    }

    pub fn advance_ms(&self, ms: i64) {
        self.0.set(self.0.get() + chrono::TimeDelta::milliseconds(ms));
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.0.get()
    }
}
