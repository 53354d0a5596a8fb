//! The stage ties elements, viewport, observer and executor together.
//!
//! All scroll, resize and frame events enter through the stage. Starting a
//! tween or registering a trigger while a scope is current records it in
//! that scope; tweens started later by a trigger are recorded in the scope
//! the trigger was registered in.

use std::collections::HashMap;
use std::time::Instant;

use crate::StageConfig;
use crate::animation::{Transition, VisualState};
use crate::element::{ElementId, ElementTree};
use crate::executor::{CancellationToken, Executor, TweenId};
use crate::hover::{HoverEffect, HoverKey, HoverRegistry};
use crate::observer::{Firing, RegistrationId, ScrollObserver, TriggerSpec};
use crate::reveal::{Binding, RegistrationHandle, Reveal, RevealHandle};
use crate::scope::{ScopeArena, ScopeId};
use crate::split::split_to_units;
use crate::timeline::{Timeline, TimelineHandle};
use crate::viewport::Viewport;

pub struct Stage {
    pub(crate) config: StageConfig,
    pub(crate) elements: ElementTree,
    pub(crate) viewport: Viewport,
    pub(crate) observer: ScrollObserver,
    pub(crate) executor: Executor,
    pub(crate) scopes: ScopeArena,
    pub(crate) hovers: HoverRegistry,
    bindings: HashMap<RegistrationId, Binding>,
    /// Timestamp of the latest frame or input event
    now: Instant,
    initialized: bool,
}

impl Stage {
    pub fn new(config: StageConfig) -> Self {
        let viewport = Viewport::new(config.viewport_width, config.viewport_height);
        Self {
            config,
            elements: ElementTree::new(),
            viewport,
            observer: ScrollObserver::new(),
            executor: Executor::new(),
            scopes: ScopeArena::new(),
            hovers: HoverRegistry::new(),
            bindings: HashMap::new(),
            now: Instant::now(),
            initialized: false,
        }
    }

    /// Apply `config` the first time only. Returns whether this call did
    /// the initialization.
    pub(crate) fn initialize(&mut self, config: StageConfig) -> bool {
        if self.initialized {
            log::debug!("stage already initialized, ignoring new config");
            return false;
        }
        log::info!(
            "stage initialized: viewport {}x{}, default threshold {:?}",
            config.viewport_width,
            config.viewport_height,
            config.default_threshold
        );
        self.viewport
            .resize(config.viewport_width, config.viewport_height);
        self.observer.resize(&self.viewport);
        self.config = config;
        self.initialized = true;
        true
    }

    pub fn now(&self) -> Instant {
        self.now
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn elements(&self) -> &ElementTree {
        &self.elements
    }

    pub fn elements_mut(&mut self) -> &mut ElementTree {
        &mut self.elements
    }

    fn advance_clock(&mut self, now: Instant) {
        // The clock is monotonic; late events never move it backwards
        if now > self.now {
            self.now = now;
        }
    }

    // ------------------------------------------------------------------
    // Viewport events
    // ------------------------------------------------------------------

    pub fn scroll_to(&mut self, scroll_y: f32, now: Instant) {
        self.advance_clock(now);
        self.viewport.scroll_to(scroll_y);
        self.evaluate_triggers();
    }

    /// Recompute activation lines, then fire anything newly satisfied.
    /// Once-mode triggers that already fired stay fired.
    pub fn resize(&mut self, width: f32, height: f32, now: Instant) {
        self.advance_clock(now);
        self.viewport.resize(width, height);
        self.observer.resize(&self.viewport);
        self.evaluate_triggers();
    }

    /// Re-evaluate triggers after the host changed element geometry.
    pub fn refresh(&mut self, now: Instant) {
        self.advance_clock(now);
        self.observer.resize(&self.viewport);
        self.evaluate_triggers();
    }

    /// Advance running tweens. Returns true while anything is still animating.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.advance_clock(now);
        self.executor.tick(&mut self.elements, self.now)
    }

    fn evaluate_triggers(&mut self) {
        let firings = self.observer.evaluate(&self.viewport, &self.elements);
        let anchor = Some(self.now);
        for firing in firings {
            self.fire(firing, anchor);
        }
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    /// Run one tween, owned by the current scope. Its clock starts at the
    /// next frame.
    pub fn run_transition(
        &mut self,
        target: ElementId,
        from: Option<VisualState>,
        to: VisualState,
        transition: Transition,
    ) -> CancellationToken {
        let scope = self.scopes.current();
        CancellationToken::new(self.start_tween(scope, target, from, to, transition, None))
    }

    /// Tweens started while handling a timestamped event are anchored at
    /// that event; all others at the next frame.
    fn start_tween(
        &mut self,
        scope: Option<ScopeId>,
        target: ElementId,
        from: Option<VisualState>,
        to: VisualState,
        transition: Transition,
        anchor: Option<Instant>,
    ) -> Option<TweenId> {
        let id = self
            .executor
            .run(&mut self.elements, target, from, to, transition, anchor)?;
        let executor = &self.executor;
        self.scopes
            .add_tween(scope, id, |tween| executor.is_active(tween));
        Some(id)
    }

    // ------------------------------------------------------------------
    // Reveals and triggers
    // ------------------------------------------------------------------

    pub fn reveal(&mut self, reveal: Reveal) -> RevealHandle {
        let scope = self.scopes.current();
        let targets: Vec<ElementId> = reveal
            .targets
            .iter()
            .copied()
            .filter(|&target| {
                let live = self.elements.live(target).is_some();
                if !live {
                    log::warn!("reveal target {:?} is missing or detached, skipped", target);
                }
                live
            })
            .collect();

        if targets.is_empty() {
            log::warn!("reveal has no live targets, nothing to do");
            return RevealHandle::default();
        }

        let Some(trigger) = reveal.trigger else {
            let tweens = targets
                .iter()
                .enumerate()
                .map(|(i, &target)| {
                    let transition = Reveal::staggered(&reveal.transition, reveal.stagger_ms, i);
                    CancellationToken::new(self.start_tween(
                        scope,
                        target,
                        reveal.from,
                        reveal.to,
                        transition,
                        None,
                    ))
                })
                .collect();
            return RevealHandle {
                registration: None,
                tweens,
            };
        };

        let spec = TriggerSpec::new(trigger)
            .threshold(reveal.threshold.unwrap_or(self.config.default_threshold))
            .arm(reveal.arm);
        let Some(registration) = self.observer.register(spec, &self.viewport, &self.elements)
        else {
            return RevealHandle::default();
        };

        // Targets show their start state until the trigger fires
        let origins = targets
            .iter()
            .map(|&target| {
                let mut origin = self
                    .elements
                    .style(target)
                    .unwrap_or_default()
                    .sample(reveal.to.properties());
                if let Some(from) = &reveal.from {
                    origin.merge(from);
                    self.elements.apply(target, from);
                }
                origin
            })
            .collect();

        self.bindings.insert(
            registration,
            Binding {
                scope,
                targets,
                from: reveal.from,
                origins,
                to: reveal.to,
                transition: reveal.transition,
                stagger_ms: reveal.stagger_ms,
                played: false,
            },
        );
        self.scopes.add_registration(scope, registration);

        // Content already above the line must not wait for a scroll event
        let mut tweens = Vec::new();
        let firings =
            self.observer
                .evaluate_only(&[registration], &self.viewport, &self.elements);
        for firing in firings {
            tweens.extend(
                self.fire(firing, None)
                    .into_iter()
                    .map(|id| CancellationToken::new(Some(id))),
            );
        }

        RevealHandle {
            registration: Some(RegistrationHandle::new(registration)),
            tweens,
        }
    }

    fn fire(&mut self, firing: Firing, anchor: Option<Instant>) -> Vec<TweenId> {
        let (id, forward) = match firing {
            Firing::Play(id) => (id, true),
            Firing::Reverse(id) => (id, false),
        };
        let Some(binding) = self.bindings.get_mut(&id) else {
            return Vec::new();
        };

        // First play snaps to the start state; later plays pick up from
        // wherever a reverse left the targets.
        let from = if forward && !binding.played {
            binding.from
        } else {
            None
        };
        if forward {
            binding.played = true;
        }

        let scope = binding.scope;
        let stagger_ms = binding.stagger_ms;
        let jobs: Vec<(ElementId, VisualState, Transition)> = binding
            .targets
            .iter()
            .zip(&binding.origins)
            .enumerate()
            .map(|(i, (&target, origin))| {
                let end = if forward { binding.to } else { *origin };
                (target, end, Reveal::staggered(&binding.transition, stagger_ms, i))
            })
            .collect();

        jobs.into_iter()
            .filter_map(|(target, end, transition)| {
                self.start_tween(scope, target, from, end, transition, anchor)
            })
            .collect()
    }

    pub fn unregister_trigger(&mut self, id: RegistrationId) -> bool {
        self.bindings.remove(&id);
        self.observer.unregister(id)
    }

    // ------------------------------------------------------------------
    // Text decomposition
    // ------------------------------------------------------------------

    /// Replace the heading's text with one child element per character.
    ///
    /// Units share the heading's geometry and come back in reading order.
    /// A missing or detached heading yields no units.
    pub fn split_heading(&mut self, heading: ElementId, text: &str) -> Vec<ElementId> {
        let Some(rect) = self.elements.live(heading).map(|e| e.rect) else {
            log::warn!("split target {:?} is missing or detached", heading);
            return Vec::new();
        };

        let units: Vec<ElementId> = split_to_units(text)
            .into_iter()
            .filter_map(|unit| {
                let id = self.elements.insert_child(heading, rect)?;
                if let Some(element) = self.elements.get_mut(id) {
                    element.text = Some(unit.text);
                }
                Some(id)
            })
            .collect();

        if let Some(element) = self.elements.get_mut(heading) {
            element.text = None;
        }
        log::debug!("split {:?} into {} units", heading, units.len());
        units
    }

    // ------------------------------------------------------------------
    // Timelines
    // ------------------------------------------------------------------

    pub fn play_timeline(&mut self, timeline: Timeline) -> TimelineHandle {
        let scope = self.scopes.current();
        let tweens = timeline
            .schedule()
            .into_iter()
            .map(|scheduled| {
                let transition = scheduled.transition.delay(scheduled.start_ms);
                CancellationToken::new(self.start_tween(
                    scope,
                    scheduled.step.target,
                    scheduled.step.from,
                    scheduled.step.to,
                    transition,
                    None,
                ))
            })
            .collect();
        TimelineHandle { tweens }
    }

    // ------------------------------------------------------------------
    // Hover
    // ------------------------------------------------------------------

    pub fn register_hover(&mut self, key: HoverKey, effects: Vec<HoverEffect>) {
        let scope = self.scopes.current();
        self.hovers.insert(key.clone(), effects, scope);
        self.scopes.add_hover(scope, key);
    }

    pub fn pointer_enter(&mut self, key: &HoverKey, now: Instant) -> Vec<CancellationToken> {
        self.hover(key, true, now)
    }

    pub fn pointer_leave(&mut self, key: &HoverKey, now: Instant) -> Vec<CancellationToken> {
        self.hover(key, false, now)
    }

    fn hover(&mut self, key: &HoverKey, entering: bool, now: Instant) -> Vec<CancellationToken> {
        self.advance_clock(now);
        let anchor = Some(self.now);
        let Some(entry) = self.hovers.set_hovered(key, entering) else {
            return Vec::new();
        };
        let scope = entry.scope;
        let jobs: Vec<(ElementId, VisualState, Transition)> = entry
            .effects
            .iter()
            .map(|effect| {
                if entering {
                    (effect.target, effect.enter, effect.enter_transition.clone())
                } else {
                    (effect.target, effect.leave, effect.leave_transition.clone())
                }
            })
            .collect();

        jobs.into_iter()
            .map(|(target, end, transition)| {
                CancellationToken::new(self.start_tween(
                    scope,
                    target,
                    None,
                    end,
                    transition,
                    anchor,
                ))
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Scopes
    // ------------------------------------------------------------------

    /// Tear down a scope and its children. Returns the cleanup callbacks so
    /// the caller can run them outside any borrow of the stage.
    pub(crate) fn dispose_scope(&mut self, id: ScopeId) -> Vec<Box<dyn FnOnce()>> {
        let Some(contents) = self.scopes.take(id) else {
            return Vec::new();
        };

        let mut cleanups = Vec::new();
        for child in contents.children {
            cleanups.extend(self.dispose_scope(child));
        }

        let registrations = contents.registrations.len();
        for registration in contents.registrations {
            self.unregister_trigger(registration);
        }
        let mut cancelled = 0;
        for tween in contents.tweens {
            if self.executor.cancel(tween) {
                cancelled += 1;
            }
        }
        for key in &contents.hovers {
            self.hovers.remove_owned(key, id);
        }
        log::debug!(
            "disposed scope {:?}: {} triggers, {} running tweens, {} hover entries",
            id,
            registrations,
            cancelled,
            contents.hovers.len()
        );

        cleanups.extend(contents.cleanups.into_iter().rev());
        cleanups
    }

    /// Number of live trigger registrations across all scopes.
    pub fn trigger_count(&self) -> usize {
        self.observer.len()
    }

    pub fn is_animating(&self) -> bool {
        self.executor.is_animating()
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::new(StageConfig::default())
    }
}
