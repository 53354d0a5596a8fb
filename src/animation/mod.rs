mod animatable;
mod property;
mod timing;

pub use animatable::Animatable;
pub use property::{Property, PropertySet, VisualState};
pub use timing::{EaseDirection, TimingFunction};

use std::time::Duration;

/// How many extra cycles a tween plays after its first one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Repeat {
    #[default]
    Never,
    Times(u32),
    Forever,
}

/// Configuration for how a property set animates from start to end
#[derive(Clone, Debug)]
pub struct Transition {
    /// Duration of one cycle in milliseconds
    pub duration_ms: f32,
    /// Timing function controlling the animation curve
    pub timing: TimingFunction,
    /// Delay before animation starts in milliseconds
    pub delay_ms: f32,
    /// Additional cycles after the first one
    pub repeat: Repeat,
    /// Alternate direction on every repeated cycle
    pub yoyo: bool,
}

impl Transition {
    /// Create a new transition with the given duration and timing function
    pub fn new(duration_ms: f32, timing: TimingFunction) -> Self {
        Self {
            duration_ms,
            timing,
            delay_ms: 0.0,
            repeat: Repeat::Never,
            yoyo: false,
        }
    }

    /// Set the delay before the animation starts
    pub fn delay(mut self, delay_ms: f32) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Set the duration of the animation
    pub fn duration(mut self, duration_ms: f32) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Set the timing function
    pub fn timing(mut self, timing: TimingFunction) -> Self {
        self.timing = timing;
        self
    }

    pub fn repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn yoyo(mut self, yoyo: bool) -> Self {
        self.yoyo = yoyo;
        self
    }

    pub fn delay_duration(&self) -> Duration {
        Duration::from_secs_f32(self.delay_ms.max(0.0) / 1000.0)
    }

    /// Length of everything after the delay, `None` when it never ends.
    pub fn active_ms(&self) -> Option<f32> {
        match self.repeat {
            Repeat::Never => Some(self.duration_ms),
            Repeat::Times(n) => Some(self.duration_ms * (n as f32 + 1.0)),
            Repeat::Forever => None,
        }
    }
}

impl Default for Transition {
    /// Half a second of `power1.out`
    fn default() -> Self {
        Self::new(500.0, TimingFunction::default())
    }
}
