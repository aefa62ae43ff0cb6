/// Card content: what each page shows, independent of how it is drawn.
///
/// `render` is a pure function of the page (plus the timer breakdown on the
/// countdown page). The renderer lays the result out; the input layer uses
/// the button list to resolve focus and hotkeys into `Action`s.

use super::breakdown::TimeLeft;
use super::page::{Action, Page};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Button {
    pub label: &'static str,
    pub hotkey: char,
    pub action: Action,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Body {
    /// Paragraphs of text, wrapped by the renderer.
    Text(Vec<&'static str>),
    /// The four-unit countdown. `None` before the first tick.
    Timer(Option<TimeLeft>),
    /// Icon tiles (gift grid). Each tile pairs with the button at the same index.
    Tiles(Vec<&'static str>),
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PageContent {
    pub title: &'static str,
    pub subtitle: Option<&'static str>,
    pub body: Body,
    pub caption: Option<&'static str>,
    pub buttons: Vec<Button>,
}

const fn button(label: &'static str, hotkey: char, action: Action) -> Button {
    Button { label, hotkey, action }
}

const BACK: Button = button("BACK", 'b', Action::Back);

pub fn render(page: Page, time_left: Option<TimeLeft>) -> PageContent {
    match page {
        Page::Countdown => PageContent {
            title: "Open when it's",
            subtitle: None,
            body: Body::Timer(time_left),
            caption: Some("New Year 🎆"),
            buttons: vec![],
        },
        Page::Intro => PageContent {
            title: "Hi My Beautiful Girl 💖",
            subtitle: Some("I got a surprise for you"),
            body: Body::Text(vec![]),
            caption: None,
            buttons: vec![
                button("YES", 'y', Action::Yes),
                button("NO", 'n', Action::No),
            ],
        },
        Page::No => PageContent {
            title: "How dare you 😤",
            subtitle: None,
            body: Body::Text(vec![]),
            caption: None,
            buttons: vec![button("TRY AGAIN", 't', Action::TryAgain)],
        },
        Page::Ready => PageContent {
            title: "Are you ready? 🥺",
            subtitle: None,
            body: Body::Text(vec![]),
            caption: None,
            buttons: vec![button("YES", 'y', Action::Yes)],
        },
        Page::NewYear => PageContent {
            title: "Happy New Year 🎉",
            subtitle: Some("My Beautiful Girl ❤"),
            body: Body::Text(vec![
                "As the New Year begins, I'm wishing you a year filled with confidence, \
                 peace, and endless smiles. May every new day bring you closer to your \
                 dreams and remind you of how strong you are.",
                "I hope this year gives you beautiful memories, good health, and moments \
                 worth celebrating. Thank you for being such a kind and supportive \
                 person who makes life brighter.",
                "Here's to a fresh start and a wonderful year ahead for you 🌸",
            ]),
            caption: None,
            buttons: vec![button("NEXT 🎁", 'n', Action::Next)],
        },
        Page::Gifts => PageContent {
            title: "Gifts For You 🎁",
            subtitle: None,
            body: Body::Tiles(vec!["💌", "🌹", "💿", "📸"]),
            caption: None,
            buttons: vec![
                button("Letter", '1', Action::OpenLetter),
                button("Bouquet", '2', Action::OpenBouquet),
                button("Memories", '3', Action::OpenMemories),
                button("Moments", '4', Action::OpenMoments),
            ],
        },
        Page::Letter => PageContent {
            title: "💌 My Letter",
            subtitle: None,
            body: Body::Text(vec![
                "As we step into a brand-new year, I just want to send you my warmest \
                 wishes. May the coming months bring you calm days, exciting \
                 opportunities, and the strength to handle whatever comes your way. \
                 You have a way of making people feel comfortable and valued, and \
                 that's something truly special.",
                "I'm grateful for the laughter, conversations, and support we've shared, \
                 and I hope this year gives you many moments that make you proud of \
                 yourself. May happiness find you often, and may your efforts turn \
                 into success.",
                "Wishing you a peaceful and joyful New Year. ✨",
            ]),
            caption: None,
            buttons: vec![BACK],
        },
        Page::Bouquet => PageContent {
            title: "🌹 Virtual Bouquet",
            subtitle: None,
            body: Body::Text(vec![
                "Until I see you again, let this bouquet carry my warmth to you. May \
                 each flower remind you that you are thought of and truly appreciated.",
                "Let its colors brighten your days and bring a gentle smile to your \
                 face. May it hold my good wishes for your happiness and peace. Until \
                 we meet again, let it speak all the care I'm sending your way.",
            ]),
            caption: None,
            buttons: vec![BACK],
        },
        Page::Memories => PageContent {
            title: "💿 Memories",
            subtitle: None,
            body: Body::Text(vec![
                "I often find myself smiling at the memories we've created together, \
                 from simple conversations to moments that felt unexpectedly special.",
                "Those shared laughs and quiet talks still stay with me, bringing \
                 comfort and warmth. No matter how much time passes, those memories \
                 remain a beautiful part of my days.",
            ]),
            caption: None,
            buttons: vec![BACK],
        },
        Page::Moments => PageContent {
            title: "📸 Best Moments",
            subtitle: None,
            body: Body::Text(vec![
                "Some of the best moments of ours are the ones that happened so \
                 naturally, without any planning. The laughter we shared and the \
                 small, meaningful conversations made those times unforgettable.",
                "Even now, those moments remain close to my heart and always bring a \
                 smile. Every laugh, every memory, every second with you is my \
                 favorite. ❤",
            ]),
            caption: None,
            buttons: vec![BACK],
        },
    }
}

/// The Happy New Year overlay shown after the fireworks.
pub fn new_year_overlay() -> PageContent {
    PageContent {
        title: "🎉 Happy New Year 🎉",
        subtitle: Some("Welcome to our beautiful new chapter ❤"),
        body: Body::Text(vec![]),
        caption: None,
        buttons: vec![button("Continue ❤", 'c', Action::Continue)],
    }
}

/// Resolve a hotkey to an action among the visible buttons.
pub fn action_for_hotkey(content: &PageContent, key: char) -> Option<Action> {
    let key = key.to_ascii_lowercase();
    content.buttons.iter().find(|b| b.hotkey == key).map(|b| b.action)
}
