//! Builder for reveal animations, optionally bound to a scroll trigger.

use crate::animation::{TimingFunction, Transition, VisualState};
use crate::element::ElementId;
use crate::executor::CancellationToken;
use crate::observer::{ArmMode, RegistrationId, Threshold, TriggerState};
use crate::runtime::with_stage;
use crate::scope::ScopeId;

/// A batch of targets animated from one state to another.
///
/// Without [`scroll_trigger`](Self::scroll_trigger) the batch plays as soon
/// as [`play`](Self::play) is called. With one, the targets snap to the start
/// state immediately and animate once the trigger crosses its activation
/// line. Target `i` of the batch is delayed by `i * stagger`.
#[derive(Clone, Debug)]
pub struct Reveal {
    pub(crate) targets: Vec<ElementId>,
    pub(crate) from: Option<VisualState>,
    pub(crate) to: VisualState,
    pub(crate) transition: Transition,
    pub(crate) stagger_ms: f32,
    pub(crate) trigger: Option<ElementId>,
    pub(crate) threshold: Option<Threshold>,
    pub(crate) arm: ArmMode,
}

impl Reveal {
    pub fn from_to(
        targets: impl IntoIterator<Item = ElementId>,
        from: VisualState,
        to: VisualState,
    ) -> Self {
        Self::build(targets, Some(from), to)
    }

    /// Animate from whatever the targets currently show.
    pub fn to(targets: impl IntoIterator<Item = ElementId>, to: VisualState) -> Self {
        Self::build(targets, None, to)
    }

    fn build(
        targets: impl IntoIterator<Item = ElementId>,
        from: Option<VisualState>,
        to: VisualState,
    ) -> Self {
        Self {
            targets: targets.into_iter().collect(),
            from,
            to,
            transition: Transition::default(),
            stagger_ms: 0.0,
            trigger: None,
            threshold: None,
            arm: ArmMode::Once,
        }
    }

    pub fn transition(mut self, transition: Transition) -> Self {
        self.transition = transition;
        self
    }

    pub fn duration(mut self, duration_ms: f32) -> Self {
        self.transition.duration_ms = duration_ms;
        self
    }

    pub fn delay(mut self, delay_ms: f32) -> Self {
        self.transition.delay_ms = delay_ms;
        self
    }

    pub fn timing(mut self, timing: TimingFunction) -> Self {
        self.transition.timing = timing;
        self
    }

    pub fn stagger(mut self, stagger_ms: f32) -> Self {
        self.stagger_ms = stagger_ms;
        self
    }

    pub fn scroll_trigger(mut self, trigger: ElementId) -> Self {
        self.trigger = Some(trigger);
        self
    }

    /// Override the stage's default threshold for this trigger.
    pub fn threshold(mut self, threshold: Threshold) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn arm(mut self, arm: ArmMode) -> Self {
        self.arm = arm;
        self
    }

    /// Transition for batch member `index`.
    pub(crate) fn staggered(transition: &Transition, stagger_ms: f32, index: usize) -> Transition {
        let base = transition.delay_ms;
        transition
            .clone()
            .delay(base + crate::split::stagger_delay_ms(index, stagger_ms))
    }

    /// Hand the reveal to the thread's stage.
    pub fn play(self) -> RevealHandle {
        with_stage(|stage| stage.reveal(self))
    }
}

/// What a trigger runs when it fires.
pub(crate) struct Binding {
    pub scope: Option<ScopeId>,
    pub targets: Vec<ElementId>,
    pub from: Option<VisualState>,
    /// Per-target values to return to when a repeat trigger reverses
    pub origins: Vec<VisualState>,
    pub to: VisualState,
    pub transition: Transition,
    pub stagger_ms: f32,
    pub played: bool,
}

/// Handle to a scroll-trigger registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegistrationHandle {
    id: RegistrationId,
}

impl RegistrationHandle {
    pub(crate) fn new(id: RegistrationId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> RegistrationId {
        self.id
    }

    /// Stop watching the trigger. Tweens it already started keep running.
    pub fn unregister(&self) -> bool {
        let id = self.id;
        with_stage(|stage| stage.unregister_trigger(id))
    }

    pub fn state(&self) -> Option<TriggerState> {
        let id = self.id;
        with_stage(|stage| stage.observer.state(id))
    }

    pub fn has_fired(&self) -> bool {
        matches!(
            self.state(),
            Some(TriggerState::Fired) | Some(TriggerState::Shown)
        )
    }

    pub fn is_registered(&self) -> bool {
        self.state().is_some()
    }
}

/// Result of [`Reveal::play`].
#[derive(Clone, Debug, Default)]
pub struct RevealHandle {
    /// Present when the reveal waits on a scroll trigger
    pub registration: Option<RegistrationHandle>,
    /// Tweens started immediately (untriggered reveals, or triggers that
    /// were already satisfied at registration)
    pub tweens: Vec<CancellationToken>,
}

impl RevealHandle {
    pub fn cancel(&self) {
        if let Some(registration) = &self.registration {
            registration.unregister();
        }
        for token in &self.tweens {
            token.cancel();
        }
    }
}
