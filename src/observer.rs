//! Scroll observer: decides when scroll-triggered transitions fire.
//!
//! Every registration watches one trigger element. Its activation line is a
//! viewport-relative y coordinate (`viewport height * fraction`); the
//! registration is satisfied while the watched edge of the trigger sits at or
//! above that line. Lines are cached and recomputed on resize.
//!
//! - [`ArmMode::Once`]: `pending -> fired`, never re-arms.
//! - [`ArmMode::Repeat`]: `hidden <-> shown`, toggling as the edge crosses
//!   the line in either direction.
//!
//! The observer only answers "which registrations fire now"; running the
//! bound transitions is the caller's job.

use std::collections::BTreeMap;
use std::str::FromStr;

use crate::element::{ElementId, ElementTree, Rect};
use crate::error::ParseError;
use crate::viewport::Viewport;

/// Edge of the trigger element compared against the activation line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Edge {
    #[default]
    Top,
    Center,
    Bottom,
}

impl Edge {
    fn of(self, rect: &Rect) -> f32 {
        match self {
            Edge::Top => rect.top(),
            Edge::Center => rect.center_y(),
            Edge::Bottom => rect.bottom(),
        }
    }
}

/// When a trigger counts as visible: `edge` must reach `viewport_fraction`
/// of the way down the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Threshold {
    pub edge: Edge,
    pub viewport_fraction: f32,
}

impl Threshold {
    pub fn new(edge: Edge, viewport_fraction: f32) -> Self {
        Self {
            edge,
            viewport_fraction,
        }
    }

    pub fn activation_line(&self, viewport: &Viewport) -> f32 {
        viewport.height * self.viewport_fraction
    }
}

impl Default for Threshold {
    /// Top edge at 80% of the viewport height
    fn default() -> Self {
        Self::new(Edge::Top, 0.8)
    }
}

impl FromStr for Threshold {
    type Err = ParseError;

    /// Parses `"<edge> <viewport position>"`, e.g. `top 80%`, `center center`
    /// or `bottom top`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::InvalidThreshold(s.to_string());
        let mut parts = s.split_whitespace();
        let (Some(edge), Some(position), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(invalid());
        };

        let edge = match edge {
            "top" => Edge::Top,
            "center" => Edge::Center,
            "bottom" => Edge::Bottom,
            _ => return Err(invalid()),
        };

        let fraction = match position {
            "top" => 0.0,
            "center" => 0.5,
            "bottom" => 1.0,
            percent => {
                let number = percent.strip_suffix('%').ok_or_else(invalid)?;
                let value: f32 = number.parse().map_err(|_| invalid())?;
                value / 100.0
            }
        };

        Ok(Threshold::new(edge, fraction))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ArmMode {
    #[default]
    Once,
    Repeat,
}

/// What to watch and how.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriggerSpec {
    pub trigger: ElementId,
    pub threshold: Threshold,
    pub arm: ArmMode,
}

impl TriggerSpec {
    pub fn new(trigger: ElementId) -> Self {
        Self {
            trigger,
            threshold: Threshold::default(),
            arm: ArmMode::Once,
        }
    }

    pub fn threshold(mut self, threshold: Threshold) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn arm(mut self, arm: ArmMode) -> Self {
        self.arm = arm;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegistrationId(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerState {
    /// Once-mode, waiting for the first crossing
    Pending,
    /// Once-mode, done for good
    Fired,
    /// Repeat-mode, currently below the line
    Hidden,
    /// Repeat-mode, currently above the line
    Shown,
}

/// Outcome of evaluating one registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Firing {
    /// Run the bound transition forward
    Play(RegistrationId),
    /// Run the bound transition back toward its start state
    Reverse(RegistrationId),
}

struct Registration {
    spec: TriggerSpec,
    activation_line: f32,
    state: TriggerState,
}

#[derive(Default)]
pub struct ScrollObserver {
    registrations: BTreeMap<RegistrationId, Registration>,
    next_id: u64,
}

impl ScrollObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start watching `spec.trigger`. Returns `None` when the trigger element
    /// is missing or detached.
    pub fn register(
        &mut self,
        spec: TriggerSpec,
        viewport: &Viewport,
        elements: &ElementTree,
    ) -> Option<RegistrationId> {
        if elements.live(spec.trigger).is_none() {
            log::warn!(
                "scroll trigger {:?} is missing or detached, registration skipped",
                spec.trigger
            );
            return None;
        }

        let id = RegistrationId(self.next_id);
        self.next_id += 1;

        let state = match spec.arm {
            ArmMode::Once => TriggerState::Pending,
            ArmMode::Repeat => TriggerState::Hidden,
        };
        let activation_line = spec.threshold.activation_line(viewport);
        log::debug!(
            "registered trigger {:?} on {:?}, activation line {}",
            id,
            spec.trigger,
            activation_line
        );
        self.registrations.insert(
            id,
            Registration {
                spec,
                activation_line,
                state,
            },
        );
        Some(id)
    }

    pub fn unregister(&mut self, id: RegistrationId) -> bool {
        self.registrations.remove(&id).is_some()
    }

    /// Recompute activation lines for the new viewport size. Firing state is
    /// left untouched.
    pub fn resize(&mut self, viewport: &Viewport) {
        for registration in self.registrations.values_mut() {
            registration.activation_line = registration.spec.threshold.activation_line(viewport);
        }
    }

    /// Evaluate every live registration against the current scroll position.
    /// Firings come back in registration order.
    pub fn evaluate(&mut self, viewport: &Viewport, elements: &ElementTree) -> Vec<Firing> {
        self.evaluate_where(viewport, elements, |_| true)
    }

    /// Same as [`evaluate`](Self::evaluate) limited to the given registrations.
    pub fn evaluate_only(
        &mut self,
        ids: &[RegistrationId],
        viewport: &Viewport,
        elements: &ElementTree,
    ) -> Vec<Firing> {
        self.evaluate_where(viewport, elements, |id| ids.contains(&id))
    }

    fn evaluate_where(
        &mut self,
        viewport: &Viewport,
        elements: &ElementTree,
        include: impl Fn(RegistrationId) -> bool,
    ) -> Vec<Firing> {
        let mut firings = Vec::new();

        for (&id, registration) in self.registrations.iter_mut() {
            if registration.state == TriggerState::Fired || !include(id) {
                continue;
            }
            let Some(trigger) = elements.live(registration.spec.trigger) else {
                continue;
            };

            let edge = registration.spec.threshold.edge.of(&trigger.rect);
            let satisfied = viewport.offset_of(edge) <= registration.activation_line;

            match (registration.state, satisfied) {
                (TriggerState::Pending, true) => {
                    registration.state = TriggerState::Fired;
                    firings.push(Firing::Play(id));
                }
                (TriggerState::Hidden, true) => {
                    registration.state = TriggerState::Shown;
                    firings.push(Firing::Play(id));
                }
                (TriggerState::Shown, false) => {
                    registration.state = TriggerState::Hidden;
                    firings.push(Firing::Reverse(id));
                }
                _ => {}
            }
        }

        if !firings.is_empty() {
            log::debug!("scroll {} fired {:?}", viewport.scroll_y, firings);
        }
        firings
    }

    pub fn state(&self, id: RegistrationId) -> Option<TriggerState> {
        self.registrations.get(&id).map(|r| r.state)
    }

    pub fn activation_line(&self, id: RegistrationId) -> Option<f32> {
        self.registrations.get(&id).map(|r| r.activation_line)
    }

    pub fn contains(&self, id: RegistrationId) -> bool {
        self.registrations.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(top: f32) -> (ElementTree, ElementId, Viewport) {
        let mut elements = ElementTree::new();
        let id = elements.insert(Rect::new(0.0, top, 100.0, 50.0));
        (elements, id, Viewport::new(1000.0, 1000.0))
    }

    #[test]
    fn test_parse_threshold() {
        assert_eq!("top 80%".parse(), Ok(Threshold::new(Edge::Top, 0.8)));
        assert_eq!(
            "center center".parse(),
            Ok(Threshold::new(Edge::Center, 0.5))
        );
        assert_eq!("bottom top".parse(), Ok(Threshold::new(Edge::Bottom, 0.0)));
        assert!("top".parse::<Threshold>().is_err());
        assert!("top 80".parse::<Threshold>().is_err());
        assert!("left 80%".parse::<Threshold>().is_err());
    }

    #[test]
    fn test_once_fires_on_crossing_only_once() {
        let (elements, id, mut viewport) = setup(1500.0);
        let mut observer = ScrollObserver::new();
        let reg = observer
            .register(TriggerSpec::new(id), &viewport, &elements)
            .unwrap();

        assert!(observer.evaluate(&viewport, &elements).is_empty());

        // 1500 - 700 = 800 <= 800
        viewport.scroll_to(700.0);
        assert_eq!(
            observer.evaluate(&viewport, &elements),
            vec![Firing::Play(reg)]
        );

        viewport.scroll_to(0.0);
        assert!(observer.evaluate(&viewport, &elements).is_empty());
        viewport.scroll_to(900.0);
        assert!(observer.evaluate(&viewport, &elements).is_empty());
        assert_eq!(observer.state(reg), Some(TriggerState::Fired));
    }

    #[test]
    fn test_repeat_toggles() {
        let (elements, id, mut viewport) = setup(1500.0);
        let mut observer = ScrollObserver::new();
        let reg = observer
            .register(TriggerSpec::new(id).arm(ArmMode::Repeat), &viewport, &elements)
            .unwrap();

        viewport.scroll_to(800.0);
        assert_eq!(observer.evaluate(&viewport, &elements), vec![Firing::Play(reg)]);
        viewport.scroll_to(100.0);
        assert_eq!(
            observer.evaluate(&viewport, &elements),
            vec![Firing::Reverse(reg)]
        );
        viewport.scroll_to(800.0);
        assert_eq!(observer.evaluate(&viewport, &elements), vec![Firing::Play(reg)]);
    }

    #[test]
    fn test_resize_recomputes_lines() {
        let (elements, id, mut viewport) = setup(1500.0);
        let mut observer = ScrollObserver::new();
        let reg = observer
            .register(TriggerSpec::new(id), &viewport, &elements)
            .unwrap();
        assert_eq!(observer.activation_line(reg), Some(800.0));

        viewport.resize(1000.0, 500.0);
        observer.resize(&viewport);
        assert_eq!(observer.activation_line(reg), Some(400.0));
    }

    #[test]
    fn test_missing_trigger_is_skipped() {
        let (mut elements, id, viewport) = setup(0.0);
        elements.remove(id);
        let mut observer = ScrollObserver::new();
        assert!(
            observer
                .register(TriggerSpec::new(id), &viewport, &elements)
                .is_none()
        );
        assert!(observer.is_empty());
    }

    #[test]
    fn test_firing_follows_registration_order() {
        let mut elements = ElementTree::new();
        let lower = elements.insert(Rect::new(0.0, 1200.0, 10.0, 10.0));
        let upper = elements.insert(Rect::new(0.0, 1100.0, 10.0, 10.0));
        let mut viewport = Viewport::new(1000.0, 1000.0);
        let mut observer = ScrollObserver::new();
        let first = observer
            .register(TriggerSpec::new(lower), &viewport, &elements)
            .unwrap();
        let second = observer
            .register(TriggerSpec::new(upper), &viewport, &elements)
            .unwrap();

        viewport.scroll_to(600.0);
        assert_eq!(
            observer.evaluate(&viewport, &elements),
            vec![Firing::Play(first), Firing::Play(second)]
        );
    }
}
