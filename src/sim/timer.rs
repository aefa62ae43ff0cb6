/// Cooperative timers: handles owned by whoever armed them.
///
/// Nothing here runs on its own. The main loop polls each handle with the
/// current time; a due handle fires once and re-arms itself. Cancelling is
/// idempotent, and a cancelled handle never fires again.
///
///   - `Interval`  : repeating deadline (countdown ticks, animation frames)
///   - `Sequence`  : finite list of `(delay, effect)` steps, each delay
///                   measured from the previous step's scheduled time

use std::ops::Add;
use std::time::{Duration, Instant};

use chrono::{DateTime, TimeDelta, Utc};

/// Repeating deadline on any monotone timeline `T` with span `D`.
#[derive(Clone, Debug)]
pub struct Interval<T, D> {
    period: D,
    next: Option<T>,
}

/// One-second countdown tick on the wall clock.
pub type Ticker = Interval<DateTime<Utc>, TimeDelta>;

/// Frame schedule on the monotonic clock.
pub type FrameSchedule = Interval<Instant, Duration>;

impl<T, D> Interval<T, D>
where
    T: Copy + Ord + Add<D, Output = T>,
    D: Copy,
{
    /// Arm the interval. The first firing is due immediately.
    pub fn start(period: D, now: T) -> Self {
        Interval { period, next: Some(now) }
    }

    /// Fire if due. Re-arms relative to `now`, so a stalled host gets one
    /// late tick instead of a burst of catch-up ticks.
    pub fn poll(&mut self, now: T) -> bool {
        match self.next {
            Some(due) if now >= due => {
                self.next = Some(now + self.period);
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.next = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next.is_some()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Step<D, E> {
    pub delay: D,
    pub effect: E,
}

/// A finite chain of delayed effects.
#[derive(Clone, Debug)]
pub struct Sequence<T, D, E> {
    steps: Vec<Step<D, E>>,
    next: usize,
    /// Scheduled time of the previous step (or the start).
    anchor: Option<T>,
}

impl<T, D, E> Sequence<T, D, E>
where
    T: Copy + Ord + Add<D, Output = T>,
    D: Copy,
    E: Copy,
{
    pub fn idle() -> Self {
        Sequence { steps: Vec::new(), next: 0, anchor: None }
    }

    pub fn start(steps: Vec<Step<D, E>>, now: T) -> Self {
        Sequence { steps, next: 0, anchor: Some(now) }
    }

    /// Return the effects of every step that has come due, in order.
    pub fn poll(&mut self, now: T) -> Vec<E> {
        let mut fired = Vec::new();
        while let (Some(anchor), Some(step)) = (self.anchor, self.steps.get(self.next)) {
            let due = anchor + step.delay;
            if now < due {
                break;
            }
            fired.push(step.effect);
            self.anchor = Some(due);
            self.next += 1;
        }
        if self.next >= self.steps.len() {
            self.anchor = None;
        }
        fired
    }

    pub fn cancel(&mut self) {
        self.anchor = None;
        self.next = self.steps.len();
    }

    pub fn is_pending(&self) -> bool {
        self.anchor.is_some() && self.next < self.steps.len()
    }
}
