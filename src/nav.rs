//! Mobile menu state.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavEvent {
    /// The hamburger button was clicked.
    Toggle,
    /// A link inside the menu was followed.
    LinkClicked,
    /// A click landed outside both the menu and its toggle.
    OutsideClick,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MenuState {
    open: bool,
}

impl MenuState {
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Applies an event and returns the new open flag when it changed.
    /// Page scrolling is locked exactly while the menu is open, so callers
    /// apply class and scroll-lock side effects only on `Some`.
    pub fn handle(&mut self, event: NavEvent) -> Option<bool> {
        let next = match event {
            NavEvent::Toggle => !self.open,
            NavEvent::LinkClicked | NavEvent::OutsideClick => false,
        };
        if next == self.open {
            return None;
        }
        self.open = next;
        Some(next)
    }
}
