/// Pages and the user-driven transitions between them.
///
/// The page graph is a fixed state machine. The only automatic edge,
/// `Countdown → NewYear`, belongs to the countdown controller; everything
/// here is driven by user actions and is a total function of
/// (page, action). Actions that don't apply leave the page unchanged.
///
/// ```text
///   Countdown ──(target reached)──▶ NewYear ──(sequence)──▶ Intro
///   Intro ─Yes─▶ Ready ─Yes─▶ NewYear ─Next─▶ Gifts
///   Intro ─No──▶ No ─TryAgain─▶ Intro
///   Gifts ─Open*─▶ Letter | Bouquet | Memories | Moments ─Back─▶ Gifts
/// ```

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Page {
    Countdown,
    NewYear,
    Intro,
    Ready,
    No,
    Gifts,
    Letter,
    Bouquet,
    Memories,
    Moments,
}

/// A button activation. One variant per button on the card.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Action {
    Yes,
    No,
    TryAgain,
    Next,
    OpenLetter,
    OpenBouquet,
    OpenMemories,
    OpenMoments,
    Back,
    /// Dismiss the Happy New Year overlay early.
    Continue,
}

impl Page {
    /// Leaf pages reached from `Gifts`.
    pub fn is_gift(self) -> bool {
        matches!(self, Page::Letter | Page::Bouquet | Page::Memories | Page::Moments)
    }
}

/// Apply a user action to the current page.
///
/// `Continue` is not a page edge; the controller handles it because it
/// also hides the overlay and cancels the pending sequence step.
pub fn transition(page: Page, action: Action) -> Page {
    match (page, action) {
        (Page::Intro, Action::Yes) => Page::Ready,
        (Page::Intro, Action::No) => Page::No,
        (Page::No, Action::TryAgain) => Page::Intro,
        (Page::Ready, Action::Yes) => Page::NewYear,
        (Page::NewYear, Action::Next) => Page::Gifts,
        (Page::Gifts, Action::OpenLetter) => Page::Letter,
        (Page::Gifts, Action::OpenBouquet) => Page::Bouquet,
        (Page::Gifts, Action::OpenMemories) => Page::Memories,
        (Page::Gifts, Action::OpenMoments) => Page::Moments,
        (p, Action::Back) if p.is_gift() => Page::Gifts,
        (p, _) => p,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_PAGES: [Page; 10] = [
        Page::Countdown, Page::NewYear, Page::Intro, Page::Ready, Page::No,
        Page::Gifts, Page::Letter, Page::Bouquet, Page::Memories, Page::Moments,
    ];

    const ALL_ACTIONS: [Action; 10] = [
        Action::Yes, Action::No, Action::TryAgain, Action::Next,
        Action::OpenLetter, Action::OpenBouquet, Action::OpenMemories,
        Action::OpenMoments, Action::Back, Action::Continue,
    ];

    #[test]
    fn intro_branches() {
        assert_eq!(transition(Page::Intro, Action::Yes), Page::Ready);
        assert_eq!(transition(Page::Intro, Action::No), Page::No);
        assert_eq!(transition(Page::No, Action::TryAgain), Page::Intro);
    }

    #[test]
    fn ready_yes_reenters_newyear() {
        assert_eq!(transition(Page::Ready, Action::Yes), Page::NewYear);
        assert_eq!(transition(Page::NewYear, Action::Next), Page::Gifts);
    }

    #[test]
    fn gift_round_trip_returns_to_gifts() {
        let opens = [
            (Action::OpenLetter, Page::Letter),
            (Action::OpenBouquet, Page::Bouquet),
            (Action::OpenMemories, Page::Memories),
            (Action::OpenMoments, Page::Moments),
        ];
        for (open, leaf) in opens {
            let entered = transition(Page::Gifts, open);
            assert_eq!(entered, leaf);
            assert_eq!(transition(entered, Action::Back), Page::Gifts);
        }
    }

    #[test]
    fn countdown_ignores_every_action() {
        for a in ALL_ACTIONS {
            assert_eq!(transition(Page::Countdown, a), Page::Countdown);
        }
    }

    #[test]
    fn transition_is_total() {
        // Every pair yields a page; unrelated actions are a no-op.
        for p in ALL_PAGES {
            for a in ALL_ACTIONS {
                let next = transition(p, a);
                if next != p {
                    assert!(a != Action::Continue, "{p:?} moved on Continue");
                }
            }
        }
        assert_eq!(transition(Page::Gifts, Action::Back), Page::Gifts);
        assert_eq!(transition(Page::Letter, Action::OpenBouquet), Page::Letter);
    }
}
