//! Viewport signals: size and vertical scroll offset.

use crate::element::Rect;

/// Direction of the last scroll movement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ScrollDirection {
    #[default]
    Idle,
    Down,
    Up,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub scroll_y: f32,
    pub direction: ScrollDirection,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            scroll_y: 0.0,
            direction: ScrollDirection::Idle,
        }
    }

    /// Move to a new scroll offset, tracking the direction of travel.
    /// Negative offsets (overscroll) clamp to zero.
    pub fn scroll_to(&mut self, scroll_y: f32) {
        let scroll_y = scroll_y.max(0.0);
        self.direction = if scroll_y > self.scroll_y {
            ScrollDirection::Down
        } else if scroll_y < self.scroll_y {
            ScrollDirection::Up
        } else {
            self.direction
        };
        self.scroll_y = scroll_y;
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    /// Distance from the viewport top to `y` (document space).
    pub fn offset_of(&self, y: f32) -> f32 {
        y - self.scroll_y
    }

    /// Whether any part of `rect` is on screen.
    pub fn intersects(&self, rect: &Rect) -> bool {
        let top = self.offset_of(rect.top());
        let bottom = self.offset_of(rect.bottom());
        bottom > 0.0 && top < self.height
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 800.0)
    }
}
