//! Thread-local stage and the free-function API over it.
//!
//! The engine is single-threaded: one [`Stage`] lives in a thread local and
//! every handle ([`ScopeHandle`], [`CancellationToken`],
//! [`RegistrationHandle`](crate::reveal::RegistrationHandle)) talks to the
//! stage of the thread that created it.

use std::cell::RefCell;
use std::sync::Once;
use std::time::Instant;

use crate::StageConfig;
use crate::animation::{Property, Transition, VisualState};
use crate::element::{ElementId, Rect};
use crate::executor::CancellationToken;
use crate::hover::{HoverEffect, HoverKey};
use crate::scope::ScopeHandle;
use crate::stage::Stage;

thread_local! {
    static STAGE: RefCell<Stage> = RefCell::new(Stage::default());
}

static LOGGER: Once = Once::new();

/// Access the thread's stage.
///
/// # Panics
///
/// Panics if called re-entrantly from inside another `with_stage` closure.
pub fn with_stage<R>(f: impl FnOnce(&mut Stage) -> R) -> R {
    STAGE.with(|stage| f(&mut stage.borrow_mut()))
}

/// One-time setup performed at application start.
///
/// Installs the `env_logger` backend (once per process) and applies `config`
/// to this thread's stage. Later calls are no-ops and return false.
pub fn init(config: StageConfig) -> bool {
    LOGGER.call_once(|| {
        // Another logger may already be installed by the host
        let _ = env_logger::try_init();
    });
    with_stage(|stage| stage.initialize(config))
}

/// Replace the thread's stage with a fresh one.
pub fn reset() {
    with_stage(|stage| *stage = Stage::default());
}

pub fn now() -> Instant {
    with_stage(|stage| stage.now())
}

// ----------------------------------------------------------------------
// Elements
// ----------------------------------------------------------------------

pub fn create_element(rect: Rect) -> ElementId {
    with_stage(|stage| stage.elements.insert(rect))
}

pub fn create_child(parent: ElementId, rect: Rect) -> Option<ElementId> {
    with_stage(|stage| stage.elements.insert_child(parent, rect))
}

pub fn remove_element(id: ElementId) {
    with_stage(|stage| stage.elements.remove(id))
}

pub fn detach_element(id: ElementId) {
    with_stage(|stage| stage.elements.detach(id))
}

pub fn set_rect(id: ElementId, rect: Rect) {
    with_stage(|stage| stage.elements.set_rect(id, rect))
}

pub fn element_style(id: ElementId) -> Option<VisualState> {
    with_stage(|stage| stage.elements.style(id))
}

pub fn element_value(id: ElementId, property: Property) -> Option<f32> {
    with_stage(|stage| stage.elements.value(id, property))
}

pub fn element_text(id: ElementId) -> Option<String> {
    with_stage(|stage| stage.elements.get(id).and_then(|e| e.text.clone()))
}

pub fn set_element_text(id: ElementId, text: impl Into<String>) {
    let text = text.into();
    with_stage(|stage| {
        if let Some(element) = stage.elements.get_mut(id) {
            element.text = Some(text);
        }
    })
}

// ----------------------------------------------------------------------
// Viewport and frames
// ----------------------------------------------------------------------

pub fn scroll_to(scroll_y: f32, now: Instant) {
    with_stage(|stage| stage.scroll_to(scroll_y, now))
}

pub fn resize(width: f32, height: f32, now: Instant) {
    with_stage(|stage| stage.resize(width, height, now))
}

pub fn refresh(now: Instant) {
    with_stage(|stage| stage.refresh(now))
}

/// Advance all tweens to `now`. Returns true while anything is animating,
/// i.e. while the host should keep requesting frames.
pub fn tick(now: Instant) -> bool {
    with_stage(|stage| stage.tick(now))
}

// ----------------------------------------------------------------------
// Scopes, transitions, text, hover
// ----------------------------------------------------------------------

/// Open an animation scope owned by `owner`. If a scope is current, the
/// new one becomes its child.
pub fn open_scope(owner: ElementId) -> ScopeHandle {
    with_stage(|stage| {
        let id = stage.scopes.open(owner);
        log::debug!("opened scope {:?} for {:?}", id, owner);
        ScopeHandle::new(id, owner)
    })
}

/// Snap `target` to `from` (when given) and animate it to `to`, starting
/// from the next frame.
pub fn run_transition(
    target: ElementId,
    from: Option<VisualState>,
    to: VisualState,
    transition: Transition,
) -> CancellationToken {
    with_stage(|stage| stage.run_transition(target, from, to, transition))
}

/// Decompose a heading into per-character child elements.
pub fn split_heading(heading: ElementId, text: &str) -> Vec<ElementId> {
    with_stage(|stage| stage.split_heading(heading, text))
}

pub fn register_hover(key: impl Into<HoverKey>, effects: Vec<HoverEffect>) {
    let key = key.into();
    with_stage(|stage| stage.register_hover(key, effects))
}

/// Pointer entered the hoverable instance `key` at `now`.
pub fn pointer_enter(key: &HoverKey, now: Instant) -> Vec<CancellationToken> {
    with_stage(|stage| stage.pointer_enter(key, now))
}

pub fn pointer_leave(key: &HoverKey, now: Instant) -> Vec<CancellationToken> {
    with_stage(|stage| stage.pointer_leave(key, now))
}

/// Number of live scroll-trigger registrations on this thread.
pub fn trigger_count() -> usize {
    with_stage(|stage| stage.trigger_count())
}
