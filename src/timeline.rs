//! Sequenced tweens with overlap control.
//!
//! ```
//! use folio::animation::{Transition, TimingFunction, VisualState};
//! use folio::timeline::{Position, Step, Timeline};
//! use folio::{Rect, create_element};
//!
//! let title = create_element(Rect::default());
//! let subtitle = create_element(Rect::default());
//! let hidden = VisualState::new().opacity(0.0).y(30.0);
//! let shown = VisualState::new().opacity(1.0).y(0.0);
//!
//! let timeline = Timeline::new(Transition::new(1000.0, TimingFunction::Linear))
//!     .add(Step::from_to(title, hidden, shown).delay(800.0))
//!     .add(Step::from_to(subtitle, hidden, shown).position("-=0.6".parse().unwrap()));
//!
//! assert_eq!(timeline.duration_ms(), Some(2200.0));
//! ```

use std::str::FromStr;

use crate::animation::{TimingFunction, Transition, VisualState};
use crate::element::ElementId;
use crate::error::ParseError;
use crate::executor::CancellationToken;
use crate::runtime::with_stage;

/// Where a step starts relative to the rest of the timeline.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum Position {
    /// At the current end of the timeline
    #[default]
    Sequential,
    /// Offset in milliseconds from the current end (negative overlaps)
    Relative(f32),
    /// Absolute time in milliseconds from the timeline start
    Absolute(f32),
}

impl FromStr for Position {
    type Err = ParseError;

    /// Parses `-=0.6`, `+=0.25` (seconds relative to the end) or `1.5`
    /// (absolute seconds). An empty string means sequential.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || ParseError::InvalidPosition(s.to_string());
        let secs = |v: &str| v.trim().parse::<f32>().map_err(|_| invalid());

        if s.is_empty() {
            Ok(Position::Sequential)
        } else if let Some(rest) = s.strip_prefix("-=") {
            Ok(Position::Relative(-secs(rest)? * 1000.0))
        } else if let Some(rest) = s.strip_prefix("+=") {
            Ok(Position::Relative(secs(rest)? * 1000.0))
        } else {
            let at = secs(s)?;
            if at < 0.0 {
                return Err(invalid());
            }
            Ok(Position::Absolute(at * 1000.0))
        }
    }
}

/// One tween of a timeline. Anything not set falls back to the timeline's
/// default transition.
#[derive(Clone, Debug)]
pub struct Step {
    pub(crate) target: ElementId,
    pub(crate) from: Option<VisualState>,
    pub(crate) to: VisualState,
    duration_ms: Option<f32>,
    timing: Option<TimingFunction>,
    delay_ms: f32,
    position: Position,
}

impl Step {
    pub fn from_to(target: ElementId, from: VisualState, to: VisualState) -> Self {
        Self {
            target,
            from: Some(from),
            to,
            duration_ms: None,
            timing: None,
            delay_ms: 0.0,
            position: Position::Sequential,
        }
    }

    pub fn to(target: ElementId, to: VisualState) -> Self {
        Self {
            from: None,
            ..Self::from_to(target, VisualState::new(), to)
        }
    }

    pub fn duration(mut self, duration_ms: f32) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn timing(mut self, timing: TimingFunction) -> Self {
        self.timing = Some(timing);
        self
    }

    /// Extra wait added after the step's position
    pub fn delay(mut self, delay_ms: f32) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    fn resolve(&self, defaults: &Transition) -> Transition {
        let mut transition = defaults.clone().delay(0.0);
        if let Some(duration) = self.duration_ms {
            transition.duration_ms = duration;
        }
        if let Some(timing) = &self.timing {
            transition.timing = timing.clone();
        }
        transition
    }
}

/// A step with its absolute start offset.
#[derive(Clone, Debug)]
pub struct ScheduledStep {
    pub step: Step,
    pub start_ms: f32,
    pub transition: Transition,
}

#[derive(Clone, Debug)]
pub struct Timeline {
    defaults: Transition,
    steps: Vec<Step>,
}

impl Timeline {
    /// `defaults` supplies duration and timing for every step that does not
    /// set its own; its delay postpones the whole timeline.
    pub fn new(defaults: Transition) -> Self {
        Self {
            defaults,
            steps: Vec::new(),
        }
    }

    pub fn add(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Compute absolute start offsets for every step.
    pub fn schedule(&self) -> Vec<ScheduledStep> {
        let base = self.defaults.delay_ms.max(0.0);
        let mut end = 0.0f32;
        let mut scheduled = Vec::with_capacity(self.steps.len());

        for step in &self.steps {
            let anchor = match step.position {
                Position::Sequential => end,
                Position::Relative(offset) => end + offset,
                Position::Absolute(at) => at,
            };
            let start = anchor.max(0.0) + step.delay_ms;
            let transition = step.resolve(&self.defaults);
            let length = transition.active_ms().unwrap_or(transition.duration_ms);
            end = end.max(start + length);

            scheduled.push(ScheduledStep {
                step: step.clone(),
                start_ms: base + start,
                transition,
            });
        }
        scheduled
    }

    /// Total length including the timeline delay, `None` if any step
    /// repeats forever.
    pub fn duration_ms(&self) -> Option<f32> {
        let mut total = 0.0f32;
        for scheduled in self.schedule() {
            let length = scheduled.transition.active_ms()?;
            total = total.max(scheduled.start_ms + length);
        }
        Some(total)
    }

    pub fn play(self) -> TimelineHandle {
        with_stage(|stage| stage.play_timeline(self))
    }
}

/// Handle to a playing timeline.
#[derive(Clone, Debug, Default)]
pub struct TimelineHandle {
    pub tweens: Vec<CancellationToken>,
}

impl TimelineHandle {
    pub fn cancel(&self) {
        for token in &self.tweens {
            token.cancel();
        }
    }

    pub fn is_active(&self) -> bool {
        self.tweens.iter().any(|t| t.is_active())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Rect;
    use crate::runtime::create_element;

    fn hidden() -> VisualState {
        VisualState::new().opacity(0.0).y(30.0)
    }

    fn shown() -> VisualState {
        VisualState::new().opacity(1.0).y(0.0)
    }

    #[test]
    fn test_parse_position() {
        assert_eq!("-=0.6".parse(), Ok(Position::Relative(-600.0)));
        assert_eq!("+=0.25".parse(), Ok(Position::Relative(250.0)));
        assert_eq!("1.5".parse(), Ok(Position::Absolute(1500.0)));
        assert_eq!("".parse(), Ok(Position::Sequential));
        assert!("-=soon".parse::<Position>().is_err());
        assert!("-2".parse::<Position>().is_err());
    }

    #[test]
    fn test_hero_overlap_schedule() {
        let ids: Vec<_> = (0..5).map(|_| create_element(Rect::default())).collect();
        let overlap = Position::Relative(-600.0);
        let mut timeline = Timeline::new(Transition::new(1000.0, TimingFunction::Linear))
            .add(Step::from_to(ids[0], hidden(), shown()).delay(800.0));
        for &id in &ids[1..] {
            timeline = timeline.add(Step::from_to(id, hidden(), shown()).position(overlap));
        }

        let starts: Vec<f32> = timeline.schedule().iter().map(|s| s.start_ms).collect();
        let expected = [800.0, 1200.0, 1600.0, 2000.0, 2400.0];
        for (start, expected) in starts.iter().zip(expected) {
            assert!((start - expected).abs() < 0.01, "{} != {}", start, expected);
        }
        let total = timeline.duration_ms().unwrap();
        assert!((total - 3400.0).abs() < 0.01);
    }

    #[test]
    fn test_negative_anchor_clamps_to_zero() {
        let id = create_element(Rect::default());
        let timeline = Timeline::new(Transition::new(500.0, TimingFunction::Linear))
            .add(Step::from_to(id, hidden(), shown()).position(Position::Relative(-2000.0)));
        assert_eq!(timeline.schedule()[0].start_ms, 0.0);
    }

    #[test]
    fn test_timeline_delay_shifts_everything() {
        let id = create_element(Rect::default());
        let timeline = Timeline::new(Transition::new(500.0, TimingFunction::Linear).delay(250.0))
            .add(Step::from_to(id, hidden(), shown()))
            .add(Step::from_to(id, shown(), hidden()).duration(100.0));
        let starts: Vec<f32> = timeline.schedule().iter().map(|s| s.start_ms).collect();
        assert_eq!(starts, vec![250.0, 750.0]);
        assert_eq!(timeline.duration_ms(), Some(850.0));
    }
}
