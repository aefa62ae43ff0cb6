/// Countdown controller: owns the page, the timer breakdown and the
/// visibility flags, and runs the midnight sequence.
///
/// ## Timeline
///
/// ```text
///   … tick (1s) … tick ── T: target reached ─────────────────────────▶
///                          fireworks ON, page = NewYear
///                          T+5s: fireworks OFF, message ON
///                          T+8s: message OFF, page = Intro
/// ```
///
/// The 1-second ticker and the midnight sequence are handles stored here;
/// `teardown` (also run on drop) cancels both. Time comes from an injected
/// `Clock`, never from the system directly.
///
/// While the sequence is pending, page buttons are ignored. The only input
/// accepted is Continue on the message overlay, which jumps straight to
/// Intro and cancels the remaining step.

use chrono::{DateTime, TimeDelta, Utc};
use log::{debug, info};

use crate::config::TimingConfig;
use crate::domain::breakdown::TimeLeft;
use crate::domain::page::{self, Action, Page};
use super::clock::Clock;
use super::event::CardEvent;
use super::timer::{Sequence, Step, Ticker};

/// Effects of the midnight sequence steps.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Effect {
    /// Fireworks off, message on.
    EndFireworks,
    /// Message off, go to Intro.
    EndMessage,
}

pub struct CountdownController<C: Clock> {
    clock: C,
    target: DateTime<Utc>,
    timing: TimingConfig,

    page: Page,
    time_left: Option<TimeLeft>,
    fireworks_visible: bool,
    message_visible: bool,
    midnight_at: Option<DateTime<Utc>>,

    ticker: Ticker,
    midnight: Sequence<DateTime<Utc>, TimeDelta, Effect>,
}

impl<C: Clock> CountdownController<C> {
    /// Start counting down. The first tick is due immediately.
    pub fn new(clock: C, target: DateTime<Utc>, timing: TimingConfig) -> Self {
        let now = clock.now();
        info!("countdown to {target} (now {now})");
        CountdownController {
            ticker: Ticker::start(ms(timing.tick_ms), now),
            midnight: Sequence::idle(),
            clock,
            target,
            timing,
            page: Page::Countdown,
            time_left: None,
            fireworks_visible: false,
            message_visible: false,
            midnight_at: None,
        }
    }

    // ── Queries ──

    pub fn page(&self) -> Page {
        self.page
    }

    /// Latest breakdown. Stale (frozen) once the target has passed.
    pub fn time_left(&self) -> Option<TimeLeft> {
        self.time_left
    }

    pub fn fireworks_visible(&self) -> bool {
        self.fireworks_visible
    }

    pub fn message_visible(&self) -> bool {
        self.message_visible
    }

    /// True while the midnight sequence still has steps to run.
    pub fn celebrating(&self) -> bool {
        self.midnight.is_pending()
    }

    // ── Driving ──

    /// Fire whatever is due: the countdown tick, then sequence steps.
    pub fn poll(&mut self) -> Vec<CardEvent> {
        let now = self.clock.now();
        let mut events = Vec::new();

        if self.ticker.poll(now) {
            self.tick(now, &mut events);
        }
        for effect in self.midnight.poll(now) {
            self.run(effect, &mut events);
        }

        events
    }

    /// Apply a button press.
    pub fn apply(&mut self, action: Action) -> Vec<CardEvent> {
        let mut events = Vec::new();

        if action == Action::Continue {
            if self.message_visible {
                debug!("message dismissed early");
                self.midnight.cancel();
                self.run(Effect::EndMessage, &mut events);
            }
            return events;
        }

        if self.celebrating() {
            debug!("ignoring {action:?} during the midnight sequence");
            return events;
        }

        self.set_page(page::transition(self.page, action), &mut events);
        events
    }

    /// Cancel the ticker and any pending sequence step. Idempotent.
    pub fn teardown(&mut self) {
        self.ticker.cancel();
        self.midnight.cancel();
    }

    // ── Internal ──

    fn tick(&mut self, now: DateTime<Utc>, events: &mut Vec<CardEvent>) {
        let diff = (self.target - now).num_milliseconds();
        match TimeLeft::from_millis(diff) {
            Some(left) => {
                self.time_left = Some(left);
                events.push(CardEvent::Tick(left));
            }
            None => self.reach_midnight(now, events),
        }
    }

    fn reach_midnight(&mut self, now: DateTime<Utc>, events: &mut Vec<CardEvent>) {
        // Stop ticking first: this branch must run at most once.
        self.ticker.cancel();
        if self.midnight_at.is_some() {
            return;
        }
        info!("target reached at {now}");
        self.midnight_at = Some(now);
        self.fireworks_visible = true;
        events.push(CardEvent::Midnight);
        self.set_page(Page::NewYear, events);
        self.midnight = Sequence::start(
            vec![
                Step { delay: ms(self.timing.fireworks_ms), effect: Effect::EndFireworks },
                Step { delay: ms(self.timing.message_ms), effect: Effect::EndMessage },
            ],
            now,
        );
    }

    fn run(&mut self, effect: Effect, events: &mut Vec<CardEvent>) {
        match effect {
            Effect::EndFireworks => {
                self.fireworks_visible = false;
                self.message_visible = true;
                events.push(CardEvent::MessageShown);
            }
            Effect::EndMessage => {
                // Covers a Continue pressed before the fireworks ended.
                self.fireworks_visible = false;
                self.message_visible = false;
                events.push(CardEvent::MessageHidden);
                self.set_page(Page::Intro, events);
            }
        }
    }

    fn set_page(&mut self, to: Page, events: &mut Vec<CardEvent>) {
        if to != self.page {
            debug!("page {:?} -> {:?}", self.page, to);
            events.push(CardEvent::PageChanged { from: self.page, to });
            self.page = to;
        }
    }
}

impl<C: Clock> Drop for CountdownController<C> {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn ms(n: u64) -> TimeDelta {
    TimeDelta::milliseconds(n.min(i64::MAX as u64) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::clock::ManualClock;
    use chrono::NaiveDateTime;

    fn utc(s: &str) -> DateTime<Utc> {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap().and_utc()
    }

    const TARGET: &str = "2026-01-01T00:00:00";

    fn controller_at(now: &str) -> (ManualClock, CountdownController<ManualClock>) {
        let clock = ManualClock::at(utc(now));
        let c = CountdownController::new(clock.clone(), utc(TARGET), TimingConfig::default());
        (clock, c)
    }

    /// Run the controller up to and through the target; returns the trigger time.
    fn reach_target(clock: &ManualClock, c: &mut CountdownController<ManualClock>) -> DateTime<Utc> {
        clock.set(utc(TARGET));
        c.poll();
        assert_eq!(c.page(), Page::NewYear);
        c.midnight_at.unwrap()
    }

    #[test]
    fn two_seconds_before_new_year() {
        let (_clock, mut c) = controller_at("2025-12-31T23:59:58");
        let events = c.poll();
        let expected = TimeLeft { days: 0, hours: 0, minutes: 0, seconds: 2 };
        assert_eq!(c.time_left(), Some(expected));
        assert_eq!(events, vec![CardEvent::Tick(expected)]);
        assert_eq!(c.page(), Page::Countdown);
        assert!(!c.fireworks_visible());
    }

    #[test]
    fn ticks_once_per_second() {
        let (clock, mut c) = controller_at("2025-12-30T12:00:00");
        assert_eq!(c.poll().len(), 1);
        clock.advance_ms(400);
        assert!(c.poll().is_empty());
        clock.advance_ms(600);
        assert_eq!(c.poll().len(), 1);
        assert_eq!(
            c.time_left(),
            Some(TimeLeft { days: 1, hours: 11, minutes: 59, seconds: 59 })
        );
    }

    #[test]
    fn breakdown_matches_whole_seconds_left() {
        let (clock, mut c) = controller_at("2025-03-14T15:09:26");
        for _ in 0..100 {
            c.poll();
            let diff = (utc(TARGET) - clock.now()).num_milliseconds();
            assert_eq!(c.time_left().unwrap().total_seconds(), diff / 1000);
            clock.advance_ms(1_234_567);
        }
    }

    #[test]
    fn midnight_within_one_tick() {
        let (clock, mut c) = controller_at("2025-12-31T23:59:58");
        c.poll();
        clock.advance_ms(1000);
        c.poll();
        assert_eq!(c.page(), Page::Countdown);
        clock.advance_ms(1000);
        let events = c.poll();
        assert_eq!(c.page(), Page::NewYear);
        assert!(c.fireworks_visible());
        assert!(!c.ticker.is_armed());
        assert_eq!(events[0], CardEvent::Midnight);
        assert!(events.contains(&CardEvent::PageChanged { from: Page::Countdown, to: Page::NewYear }));
        // Breakdown is left as it was on the last positive tick.
        assert_eq!(c.time_left().unwrap().seconds, 1);
    }

    #[test]
    fn midnight_fires_exactly_once() {
        let (clock, mut c) = controller_at("2025-12-31T23:59:59");
        let mut midnights = 0;
        for _ in 0..30 {
            midnights += c.poll().iter().filter(|e| **e == CardEvent::Midnight).count();
            clock.advance_ms(1000);
        }
        assert_eq!(midnights, 1);
    }

    #[test]
    fn started_after_target_celebrates_immediately() {
        let (_clock, mut c) = controller_at("2026-02-01T00:00:00");
        c.poll();
        assert_eq!(c.page(), Page::NewYear);
        assert!(c.fireworks_visible());
        assert_eq!(c.time_left(), None);
    }

    #[test]
    fn flag_windows_follow_the_trigger() {
        let (clock, mut c) = controller_at("2025-12-31T23:59:50");
        let t = reach_target(&clock, &mut c);

        let at = |ms: i64| t + TimeDelta::milliseconds(ms);
        let mut probe = |ms: i64| {
            clock.set(at(ms));
            c.poll();
            (c.fireworks_visible(), c.message_visible(), c.page())
        };

        assert_eq!(probe(0), (true, false, Page::NewYear));
        assert_eq!(probe(4_999), (true, false, Page::NewYear));
        assert_eq!(probe(5_000), (false, true, Page::NewYear));
        assert_eq!(probe(7_999), (false, true, Page::NewYear));
        assert_eq!(probe(8_000), (false, false, Page::Intro));
        assert_eq!(probe(60_000), (false, false, Page::Intro));
    }

    #[test]
    fn late_poll_still_runs_both_steps_in_order() {
        let (clock, mut c) = controller_at("2025-12-31T23:59:50");
        let t = reach_target(&clock, &mut c);
        clock.set(t + TimeDelta::seconds(30));
        let events = c.poll();
        assert_eq!(events[0], CardEvent::MessageShown);
        assert_eq!(events[1], CardEvent::MessageHidden);
        assert_eq!(c.page(), Page::Intro);
        assert!(!c.fireworks_visible() && !c.message_visible());
    }

    #[test]
    fn buttons_are_ignored_while_celebrating() {
        let (clock, mut c) = controller_at("2025-12-31T23:59:50");
        reach_target(&clock, &mut c);
        assert!(c.apply(Action::Next).is_empty());
        assert_eq!(c.page(), Page::NewYear);
    }

    #[test]
    fn continue_skips_the_rest_of_the_message() {
        let (clock, mut c) = controller_at("2025-12-31T23:59:50");
        let t = reach_target(&clock, &mut c);

        // Continue does nothing while the fireworks are still up.
        assert!(c.apply(Action::Continue).is_empty());

        clock.set(t + TimeDelta::seconds(6));
        c.poll();
        assert!(c.message_visible());
        c.apply(Action::Continue);
        assert!(!c.message_visible());
        assert_eq!(c.page(), Page::Intro);
        assert!(!c.celebrating());

        // The cancelled step must not fire later.
        c.apply(Action::Yes);
        clock.set(t + TimeDelta::seconds(9));
        assert!(c.poll().is_empty());
        assert_eq!(c.page(), Page::Ready);
    }

    #[test]
    fn full_walk_through_the_card() {
        let (clock, mut c) = controller_at("2025-12-31T23:59:50");
        let t = reach_target(&clock, &mut c);
        clock.set(t + TimeDelta::seconds(8));
        c.poll();

        let steps = [
            (Action::No, Page::No),
            (Action::TryAgain, Page::Intro),
            (Action::Yes, Page::Ready),
            (Action::Yes, Page::NewYear),
            (Action::Next, Page::Gifts),
            (Action::OpenMemories, Page::Memories),
            (Action::Back, Page::Gifts),
        ];
        for (action, expected) in steps {
            c.apply(action);
            assert_eq!(c.page(), expected, "after {action:?}");
        }
        // Manual re-entry of NewYear never restarts the fireworks.
        assert!(!c.fireworks_visible());
        assert!(!c.celebrating());
    }

    #[test]
    fn teardown_cancels_everything_and_is_idempotent() {
        let (clock, mut c) = controller_at("2025-12-31T23:59:50");
        let t = reach_target(&clock, &mut c);
        c.teardown();
        c.teardown();
        assert!(!c.ticker.is_armed());
        assert!(!c.celebrating());
        clock.set(t + TimeDelta::seconds(10));
        assert!(c.poll().is_empty());

        let (clock, mut c) = controller_at("2025-12-31T23:59:50");
        c.teardown();
        clock.set(utc(TARGET));
        assert!(c.poll().is_empty());
        assert_eq!(c.page(), Page::Countdown);
    }

    #[test]
    fn day_long_timings_from_config_run_without_overflow() {
        let config = crate::config::CardConfig::from_str_or_default(
            "[timing]\ntick_ms = 10000000000000000\nfireworks_ms = 10000000000000000\n",
        );
        let clock = ManualClock::at(utc("2025-12-31T23:59:59"));
        let mut c = CountdownController::new(clock.clone(), utc(TARGET), config.timing);
        assert_eq!(c.poll().len(), 1);
        clock.set(utc(TARGET));
        assert!(c.poll().is_empty());
        clock.advance_ms(86_400_000);
        c.poll();
        assert_eq!(c.page(), Page::NewYear);
        assert!(c.fireworks_visible());
        clock.advance_ms(86_400_000);
        c.poll();
        assert!(!c.fireworks_visible());
        assert!(c.message_visible());
    }
}
