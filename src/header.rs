//! Fixed page header: entrance animation, scrolled styling and mobile menu.

use crate::animation::{EaseDirection, TimingFunction, Transition, VisualState};
use crate::element::ElementId;
use crate::executor::CancellationToken;
use crate::runtime::run_transition;

/// Scroll offset past which the header switches to its solid background.
pub const SCROLLED_THRESHOLD: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeaderState {
    pub scrolled: bool,
    pub menu_open: bool,
}

impl HeaderState {
    /// Update from a scroll offset. Returns true when `scrolled` changed.
    pub fn on_scroll(&mut self, scroll_y: f32) -> bool {
        let scrolled = scroll_y > SCROLLED_THRESHOLD;
        let changed = scrolled != self.scrolled;
        self.scrolled = scrolled;
        changed
    }

    pub fn toggle_menu(&mut self) {
        self.menu_open = !self.menu_open;
    }

    /// Following a navigation link closes the mobile menu.
    pub fn navigate(&mut self) {
        self.menu_open = false;
    }
}

/// Slide the header down into place once the page loads.
pub fn play_entrance(header: ElementId) -> CancellationToken {
    run_transition(
        header,
        Some(VisualState::new().y(-100.0).opacity(0.0)),
        VisualState::new().y(0.0).opacity(1.0),
        Transition::new(1000.0, TimingFunction::Power(3, EaseDirection::Out)).delay(500.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrolled_threshold() {
        let mut header = HeaderState::default();
        assert!(!header.on_scroll(50.0));
        assert!(header.on_scroll(51.0));
        assert!(header.scrolled);
        assert!(!header.on_scroll(400.0));
        assert!(header.on_scroll(0.0));
        assert!(!header.scrolled);
    }

    #[test]
    fn test_menu_toggle() {
        let mut header = HeaderState::default();
        header.toggle_menu();
        assert!(header.menu_open);
        header.navigate();
        assert!(!header.menu_open);
    }
}
