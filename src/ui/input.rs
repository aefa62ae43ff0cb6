/// Keyboard and mouse input, turned into intents.
///
/// Only key presses count; Repeat and Release events are dropped, so
/// holding a key never activates a button twice. Terminal resizes are
/// collected separately and the last one wins.
///
///   ←/↑/Shift+Tab  →  focus previous button
///   →/↓/Tab        →  focus next button
///   Enter/Space    →  activate focused button
///   letter/digit   →  button hotkey
///   Esc            →  BACK, where the page has one
///   q / Ctrl+C     →  quit
///   left click     →  button under the pointer

use std::time::Duration;

use crossterm::event::{
    self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton,
    MouseEventKind,
};
use log::warn;

/// What the user asked for, before it's matched against the visible page.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Intent {
    Quit,
    FocusNext,
    FocusPrev,
    Activate,
    Back,
    Hotkey(char),
    Click { col: u16, row: u16 },
}

pub struct InputState {
    intents: Vec<Intent>,
    resized: Option<(u16, u16)>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            intents: Vec::with_capacity(8),
            resized: None,
        }
    }

    /// Drain every pending terminal event without blocking.
    /// Call once per frame, before anything reads intents.
    pub fn drain_events(&mut self) {
        self.intents.clear();
        self.resized = None;

        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) => {
                    if let Some(intent) = intent_for_key(key) {
                        self.intents.push(intent);
                    }
                }
                Ok(Event::Mouse(m)) => {
                    if m.kind == MouseEventKind::Down(MouseButton::Left) {
                        self.intents.push(Intent::Click { col: m.column, row: m.row });
                    }
                }
                Ok(Event::Resize(cols, rows)) => self.resized = Some((cols, rows)),
                Ok(_) => {}
                Err(e) => {
                    warn!("input: {e}");
                    break;
                }
            }
        }
    }

    pub fn intents(&self) -> &[Intent] {
        &self.intents
    }

    /// New viewport size, if the terminal was resized this frame.
    pub fn resized(&self) -> Option<(u16, u16)> {
        self.resized
    }

    pub fn quit_requested(&self) -> bool {
        self.intents.contains(&Intent::Quit)
    }
}

/// Map one key event. `None` for releases, repeats and unbound keys.
pub fn intent_for_key(key: KeyEvent) -> Option<Intent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C')).then_some(Intent::Quit);
    }
    match key.code {
        KeyCode::Right | KeyCode::Down | KeyCode::Tab => Some(Intent::FocusNext),
        KeyCode::Left | KeyCode::Up | KeyCode::BackTab => Some(Intent::FocusPrev),
        KeyCode::Enter | KeyCode::Char(' ') => Some(Intent::Activate),
        KeyCode::Esc => Some(Intent::Back),
        KeyCode::Char('q') | KeyCode::Char('Q') => Some(Intent::Quit),
        KeyCode::Char(c) if c.is_ascii_alphanumeric() => Some(Intent::Hotkey(c)),
        _ => None,
    }
}
