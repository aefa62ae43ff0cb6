/// Button focus and intent resolution for the visible page.
///
/// The card is navigated like a dialog: one button has focus, arrows move
/// it (wrapping), Enter activates it, hotkeys and clicks go straight to a
/// button. Focus resets to the first button whenever the page changes.

use crate::domain::breakdown::TimeLeft;
use crate::domain::content::{self, PageContent};
use crate::domain::page::{Action, Page};
use super::input::Intent;

/// What is on screen right now: the message overlay covers the page.
pub fn visible_content(page: Page, time_left: Option<TimeLeft>, message_visible: bool) -> PageContent {
    if message_visible {
        content::new_year_overlay()
    } else {
        content::render(page, time_left)
    }
}

#[derive(Default)]
pub struct Menu {
    focus: usize,
}

impl Menu {
    pub fn new() -> Self {
        Menu::default()
    }

    pub fn reset(&mut self) {
        self.focus = 0;
    }

    /// Focused button index, clamped to what the page has.
    pub fn focused(&self, content: &PageContent) -> Option<usize> {
        match content.buttons.len() {
            0 => None,
            n => Some(self.focus.min(n - 1)),
        }
    }

    /// Resolve an intent against `content`. Focus moves are applied here
    /// and return `None`; `Quit` and `Click` are the caller's business.
    pub fn resolve(&mut self, intent: Intent, content: &PageContent) -> Option<Action> {
        let n = content.buttons.len();
        match intent {
            Intent::FocusNext if n > 0 => {
                self.focus = (self.focus.min(n - 1) + 1) % n;
                None
            }
            Intent::FocusPrev if n > 0 => {
                self.focus = (self.focus.min(n - 1) + n - 1) % n;
                None
            }
            Intent::Activate => self.focused(content).map(|i| content.buttons[i].action),
            Intent::Hotkey(c) => content::action_for_hotkey(content, c),
            Intent::Back => content
                .buttons
                .iter()
                .find(|b| b.action == Action::Back)
                .map(|b| b.action),
            _ => None,
        }
    }

    /// A button was clicked: focus it and return its action.
    pub fn press(&mut self, index: usize, content: &PageContent) -> Option<Action> {
        let button = content.buttons.get(index)?;
        self.focus = index;
        Some(button.action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_replaces_the_page() {
        let c = visible_content(Page::NewYear, None, true);
        assert_eq!(c.buttons.len(), 1);
        assert_eq!(c.buttons[0].action, Action::Continue);
        let c = visible_content(Page::NewYear, None, false);
        assert_eq!(c.buttons[0].action, Action::Next);
    }

    #[test]
    fn focus_wraps_both_ways() {
        let gifts = content::render(Page::Gifts, None);
        let mut m = Menu::new();
        m.resolve(Intent::FocusPrev, &gifts);
        assert_eq!(m.focused(&gifts), Some(3));
        m.resolve(Intent::FocusNext, &gifts);
        assert_eq!(m.focused(&gifts), Some(0));
        m.resolve(Intent::FocusNext, &gifts);
        assert_eq!(m.resolve(Intent::Activate, &gifts), Some(Action::OpenBouquet));
    }

    #[test]
    fn stale_focus_is_clamped() {
        let gifts = content::render(Page::Gifts, None);
        let letter = content::render(Page::Letter, None);
        let mut m = Menu::new();
        m.press(3, &gifts);
        assert_eq!(m.focused(&letter), Some(0));
        assert_eq!(m.resolve(Intent::Activate, &letter), Some(Action::Back));
    }

    #[test]
    fn pages_without_buttons_do_nothing() {
        let countdown = content::render(Page::Countdown, None);
        let mut m = Menu::new();
        assert_eq!(m.resolve(Intent::FocusNext, &countdown), None);
        assert_eq!(m.resolve(Intent::Activate, &countdown), None);
        assert_eq!(m.focused(&countdown), None);
        assert_eq!(m.press(0, &countdown), None);
    }

    #[test]
    fn hotkeys_and_back() {
        let intro = content::render(Page::Intro, None);
        let memories = content::render(Page::Memories, None);
        let mut m = Menu::new();
        assert_eq!(m.resolve(Intent::Hotkey('n'), &intro), Some(Action::No));
        assert_eq!(m.resolve(Intent::Back, &intro), None);
        assert_eq!(m.resolve(Intent::Back, &memories), Some(Action::Back));
        assert_eq!(m.resolve(Intent::Quit, &intro), None);
    }
}
