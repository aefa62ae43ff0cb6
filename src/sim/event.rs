/// Events emitted by the countdown controller and the fireworks engine.
/// The presentation layer consumes these for sound and logging.

use crate::domain::breakdown::TimeLeft;
use crate::domain::color::Rgb;
use crate::domain::page::Page;

#[derive(Clone, Debug, PartialEq)]
pub enum CardEvent {
    /// Countdown recomputed while the target is still ahead.
    Tick(TimeLeft),
    /// Target reached: fireworks start, page switches to `NewYear`.
    Midnight,
    /// Fireworks hidden, Happy New Year message shown.
    MessageShown,
    /// Message hidden (timed out or dismissed).
    MessageHidden,
    PageChanged { from: Page, to: Page },
    RocketLaunched,
    Burst { x: f32, y: f32, color: Rgb },
}
