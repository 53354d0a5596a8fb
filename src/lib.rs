pub mod animation;
pub mod background;
pub mod contact;
pub mod content;
pub mod element;
pub mod error;
pub mod executor;
pub mod header;
pub mod hover;
pub mod observer;
pub mod page;
pub mod reveal;
pub mod runtime;
pub mod scope;
pub mod split;
pub mod stage;
pub mod timeline;
pub mod viewport;

use observer::Threshold;

pub use animation::{Property, TimingFunction, VisualState};
pub use element::{ElementId, Rect};
pub use executor::CancellationToken;
pub use hover::{HoverEffect, HoverKey};
pub use observer::{ArmMode, Edge};
pub use reveal::{RegistrationHandle, Reveal, RevealHandle};
pub use runtime::{
    create_child, create_element, detach_element, element_style, element_text, element_value,
    init, now, open_scope, pointer_enter, pointer_leave, refresh, register_hover, remove_element,
    reset, resize, run_transition, scroll_to, set_element_text, set_rect, split_heading, tick,
    trigger_count, with_stage,
};
pub use scope::ScopeHandle;

pub mod prelude {
    pub use crate::animation::{Repeat, TimingFunction, Transition, VisualState};
    pub use crate::element::{ElementId, Rect};
    pub use crate::hover::{HoverEffect, HoverKey};
    pub use crate::observer::{ArmMode, Edge, Threshold};
    pub use crate::reveal::Reveal;
    pub use crate::runtime::*;
    pub use crate::scope::ScopeHandle;
    pub use crate::timeline::{Position, Step, Timeline};
    pub use crate::StageConfig;
}

#[derive(Clone, Debug)]
pub struct StageConfig {
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// Threshold used by scroll triggers that do not set their own
    pub default_threshold: Threshold,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            viewport_width: 1280.0,
            viewport_height: 800.0,
            default_threshold: Threshold::default(),
        }
    }
}

impl StageConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn viewport(mut self, width: f32, height: f32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    pub fn default_threshold(mut self, threshold: Threshold) -> Self {
        self.default_threshold = threshold;
        self
    }
}
