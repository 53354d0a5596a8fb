//! Transition executor: interpolates element properties over time.
//!
//! A tween snaps its target to the start state as soon as it is created,
//! waits out its delay, then interpolates every property of the end state in
//! lockstep. Time is always measured from a monotonic [`Instant`] supplied by
//! the caller, so playback speed does not depend on the frame rate.

use std::collections::BTreeMap;
use std::time::Instant;

use crate::animation::{Animatable, Repeat, Transition, VisualState};
use crate::element::{ElementId, ElementTree};
use crate::runtime::with_stage;

/// Identifier of a running tween.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TweenId(u64);

/// Stops a tween started through the thread's stage.
///
/// A token for a tween that was never started (empty end state, missing
/// target) is inert: cancelling it does nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct CancellationToken {
    id: Option<TweenId>,
}

impl CancellationToken {
    pub(crate) fn new(id: Option<TweenId>) -> Self {
        Self { id }
    }

    pub fn id(&self) -> Option<TweenId> {
        self.id
    }

    /// Freeze the target at its current interpolated values. Returns false
    /// if the tween had already finished or been cancelled.
    pub fn cancel(&self) -> bool {
        match self.id {
            Some(id) => with_stage(|stage| stage.executor.cancel(id)),
            None => false,
        }
    }

    pub fn is_active(&self) -> bool {
        match self.id {
            Some(id) => with_stage(|stage| stage.executor.is_active(id)),
            None => false,
        }
    }
}

struct Tween {
    target: ElementId,
    start: VisualState,
    end: VisualState,
    transition: Transition,
    /// Anchor time plus delay, `None` until the first tick anchors it
    begins_at: Option<Instant>,
}

/// Position of a tween inside its cycle structure.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Progress {
    /// Curve input in [0, 1], already flipped for yoyo cycles
    t: f32,
    finished: bool,
}

fn progress(transition: &Transition, elapsed_ms: f32) -> Progress {
    if transition.duration_ms <= 0.0 {
        return Progress {
            t: 1.0,
            finished: transition.repeat != Repeat::Forever,
        };
    }

    let duration = transition.duration_ms;
    let (cycle, local, finished) = match transition.active_ms() {
        Some(total) if elapsed_ms >= total => {
            let last_cycle = (total / duration).round() as u64 - 1;
            (last_cycle, 1.0, true)
        }
        _ => {
            let cycle = (elapsed_ms / duration).floor();
            let local = (elapsed_ms - cycle * duration) / duration;
            (cycle as u64, local, false)
        }
    };

    let t = if transition.yoyo && cycle % 2 == 1 {
        1.0 - local
    } else {
        local
    };
    Progress { t, finished }
}

/// Runs and advances tweens.
#[derive(Default)]
pub struct Executor {
    tweens: BTreeMap<TweenId, Tween>,
    next_id: u64,
}

impl Executor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a tween on `target`.
    ///
    /// With `from` set, the target snaps to it immediately. Without it the
    /// tween starts from the target's current values and takes over the
    /// overlapping properties of any tween already driving the same target.
    ///
    /// `anchor` is the time the tween's clock starts from. Without one the
    /// tween is anchored at the first [`tick`](Self::tick) that sees it, so
    /// a tween started while the host was idle does not skip ahead.
    ///
    /// Returns `None` when there is nothing to animate: an empty end state or
    /// a missing or detached target.
    pub fn run(
        &mut self,
        elements: &mut ElementTree,
        target: ElementId,
        from: Option<VisualState>,
        to: VisualState,
        transition: Transition,
        anchor: Option<Instant>,
    ) -> Option<TweenId> {
        if to.is_empty() {
            log::warn!("tween on {:?} has an empty end state, ignoring", target);
            return None;
        }
        let Some(element) = elements.live(target) else {
            log::warn!("tween target {:?} is missing or detached, ignoring", target);
            return None;
        };

        let mut start = element.style.sample(to.properties());
        match from {
            Some(from) => {
                start.merge(&from);
                elements.apply(target, &start);
            }
            None => self.overwrite(target, &to),
        }

        let id = TweenId(self.next_id);
        self.next_id += 1;

        let begins_at = anchor.map(|anchor| anchor + transition.delay_duration());
        log::debug!(
            "tween {:?} on {:?}: {:?} -> {:?} over {}ms (+{}ms delay)",
            id,
            target,
            start,
            to,
            transition.duration_ms,
            transition.delay_ms
        );
        self.tweens.insert(
            id,
            Tween {
                target,
                start,
                end: to,
                transition,
                begins_at,
            },
        );
        Some(id)
    }

    /// Strip the properties of `incoming` from every tween on `target`.
    fn overwrite(&mut self, target: ElementId, incoming: &VisualState) {
        let taken = incoming.properties();
        self.tweens.retain(|_, tween| {
            if tween.target != target || !tween.end.properties().intersects(taken) {
                return true;
            }
            tween.end = tween.end.without(taken);
            tween.start = tween.start.without(taken);
            !tween.end.is_empty()
        });
    }

    /// Advance every tween to `now`. Returns true while any tween remains.
    pub fn tick(&mut self, elements: &mut ElementTree, now: Instant) -> bool {
        let mut done = Vec::new();

        for (&id, tween) in self.tweens.iter_mut() {
            let delay = tween.transition.delay_duration();
            let begins_at = *tween.begins_at.get_or_insert(now + delay);
            if now < begins_at {
                continue;
            }
            let elapsed_ms = now.duration_since(begins_at).as_secs_f32() * 1000.0;
            let Progress { t, finished } = progress(&tween.transition, elapsed_ms);
            let eased = tween.transition.timing.evaluate(t);
            let value = VisualState::lerp(&tween.start, &tween.end, eased);

            if !elements.apply(tween.target, &value) {
                log::debug!("tween {:?} lost its target {:?}", id, tween.target);
                done.push(id);
            } else if finished {
                done.push(id);
            }
        }

        for id in done {
            self.tweens.remove(&id);
        }
        !self.tweens.is_empty()
    }

    /// Stop a tween, leaving its target at the last computed values.
    /// Returns false when the tween already finished or never existed.
    pub fn cancel(&mut self, id: TweenId) -> bool {
        let cancelled = self.tweens.remove(&id).is_some();
        if cancelled {
            log::debug!("tween {:?} cancelled", id);
        }
        cancelled
    }

    pub fn is_active(&self, id: TweenId) -> bool {
        self.tweens.contains_key(&id)
    }

    pub fn is_animating(&self) -> bool {
        !self.tweens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tweens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }
}
