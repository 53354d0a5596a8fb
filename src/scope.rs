//! Animation scopes for automatic teardown.
//!
//! Every section that sets up animations does so inside a scope. Trigger
//! registrations, running tweens, hover entries and cleanup callbacks created
//! while a scope is current belong to it, and disposing the scope revokes
//! all of them in one go.
//!
//! # Overview
//!
//! - Scopes form a tree: a scope opened while another one is current becomes
//!   its child, and children are disposed before their parent
//! - Disposal unregisters triggers, cancels tweens (targets keep whatever
//!   value they had), drops hover entries, then runs cleanups in reverse
//!   order
//! - Disposal is idempotent
//!
//! # Example
//!
//! ```
//! use folio::{Rect, Reveal, VisualState, create_element, open_scope};
//!
//! let heading = create_element(Rect::new(0.0, 2000.0, 600.0, 48.0));
//! let scope = open_scope(heading);
//! scope.run(|| {
//!     Reveal::from_to(
//!         [heading],
//!         VisualState::new().opacity(0.0).y(30.0),
//!         VisualState::new().opacity(1.0).y(0.0),
//!     )
//!     .scroll_trigger(heading)
//!     .play();
//! });
//!
//! // On unmount
//! scope.dispose();
//! scope.dispose(); // no-op
//! ```

use crate::element::ElementId;
use crate::executor::TweenId;
use crate::hover::HoverKey;
use crate::observer::RegistrationId;
use crate::runtime::with_stage;

/// Unique identifier for a scope in the scope arena.
///
/// Slots are reused after disposal; the generation tells a stale handle
/// apart from the scope that now occupies its slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScopeId {
    index: u32,
    generation: u32,
}

/// Everything a disposed scope hands back to the stage for teardown.
pub(crate) struct ScopeContents {
    pub children: Vec<ScopeId>,
    pub registrations: Vec<RegistrationId>,
    pub tweens: Vec<TweenId>,
    pub hovers: Vec<HoverKey>,
    pub cleanups: Vec<Box<dyn FnOnce()>>,
}

struct Scope {
    owner: ElementId,
    parent: Option<ScopeId>,
    contents: ScopeContents,
}

impl Scope {
    fn new(owner: ElementId, parent: Option<ScopeId>) -> Self {
        Self {
            owner,
            parent,
            contents: ScopeContents {
                children: Vec::new(),
                registrations: Vec::new(),
                tweens: Vec::new(),
                hovers: Vec::new(),
                cleanups: Vec::new(),
            },
        }
    }
}

struct Slot {
    generation: u32,
    scope: Option<Scope>,
}

/// Arena-based storage for scopes.
#[derive(Default)]
pub(crate) struct ScopeArena {
    slots: Vec<Slot>,
    free_indices: Vec<u32>,
    current: Option<ScopeId>,
}

impl ScopeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a scope as a child of the current one.
    pub fn open(&mut self, owner: ElementId) -> ScopeId {
        let parent = self.current;
        let scope = Scope::new(owner, parent);

        let id = match self.free_indices.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.scope = Some(scope);
                ScopeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    scope: Some(scope),
                });
                ScopeId {
                    index,
                    generation: 0,
                }
            }
        };

        if let Some(parent) = parent.and_then(|parent_id| self.get_mut(parent_id)) {
            parent.contents.children.push(id);
        }
        id
    }

    fn get(&self, id: ScopeId) -> Option<&Scope> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.scope.as_ref())
    }

    fn get_mut(&mut self, id: ScopeId) -> Option<&mut Scope> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.scope.as_mut())
    }

    pub fn contains(&self, id: ScopeId) -> bool {
        self.get(id).is_some()
    }

    pub fn owner(&self, id: ScopeId) -> Option<ElementId> {
        self.get(id).map(|s| s.owner)
    }

    pub fn parent(&self, id: ScopeId) -> Option<ScopeId> {
        self.get(id)?.parent
    }

    pub fn current(&self) -> Option<ScopeId> {
        self.current
    }

    /// Make `id` current, returning the previous current scope.
    pub fn enter(&mut self, id: Option<ScopeId>) -> Option<ScopeId> {
        std::mem::replace(&mut self.current, id)
    }

    /// Take a scope out of the arena and free its slot. `None` if already
    /// disposed.
    pub fn take(&mut self, id: ScopeId) -> Option<ScopeContents> {
        let slot = self
            .slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)?;
        let scope = slot.scope.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_indices.push(id.index);
        if self.current == Some(id) {
            self.current = scope.parent;
        }
        Some(scope.contents)
    }

    /// Number of allocated slots, live or free.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn add_registration(&mut self, id: Option<ScopeId>, registration: RegistrationId) {
        if let Some(scope) = id.and_then(|id| self.get_mut(id)) {
            scope.contents.registrations.push(registration);
        }
    }

    /// Record a tween. Ids of tweens that already finished are pruned so
    /// long-lived scopes (hover effects) do not grow without bound.
    pub fn add_tween(
        &mut self,
        id: Option<ScopeId>,
        tween: TweenId,
        is_active: impl Fn(TweenId) -> bool,
    ) {
        if let Some(scope) = id.and_then(|id| self.get_mut(id)) {
            scope.contents.tweens.retain(|&t| is_active(t));
            scope.contents.tweens.push(tween);
        }
    }

    pub fn add_hover(&mut self, id: Option<ScopeId>, key: HoverKey) {
        if let Some(scope) = id.and_then(|id| self.get_mut(id)) {
            scope.contents.hovers.push(key);
        }
    }

    pub fn add_cleanup(&mut self, id: ScopeId, f: Box<dyn FnOnce()>) -> bool {
        match self.get_mut(id) {
            Some(scope) => {
                scope.contents.cleanups.push(f);
                true
            }
            None => false,
        }
    }
}

/// Handle to an animation scope.
///
/// Dropping the handle does not dispose the scope; call
/// [`dispose`](Self::dispose) when the owning section unmounts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScopeHandle {
    id: ScopeId,
    owner: ElementId,
}

impl ScopeHandle {
    pub(crate) fn new(id: ScopeId, owner: ElementId) -> Self {
        Self { id, owner }
    }

    pub fn id(&self) -> ScopeId {
        self.id
    }

    pub fn owner(&self) -> ElementId {
        self.owner
    }

    /// Execute a closure with this scope current.
    ///
    /// Everything registered inside the closure is owned by the scope.
    /// Running a disposed scope still runs the closure, but nothing created
    /// inside it is tracked.
    pub fn run<T>(&self, f: impl FnOnce() -> T) -> T {
        let id = self.id;
        let prev = with_stage(|stage| stage.scopes.enter(Some(id)));
        // Restores the previous scope even if `f` unwinds
        let _restore = RestoreScope(prev);
        f()
    }

    /// Register a callback to run when this scope is disposed.
    /// Callbacks run in reverse order of registration (LIFO).
    pub fn on_dispose(&self, f: impl FnOnce() + 'static) {
        let id = self.id;
        let added = with_stage(|stage| stage.scopes.add_cleanup(id, Box::new(f)));
        if !added {
            log::debug!("on_dispose on disposed scope {:?} ignored", id);
        }
    }

    /// Revoke every registration made through this scope and its children.
    ///
    /// Safe to call more than once; later calls do nothing.
    pub fn dispose(&self) {
        let id = self.id;
        let cleanups = with_stage(|stage| stage.dispose_scope(id));
        // Run outside the stage borrow so cleanups may use the runtime
        for cleanup in cleanups {
            cleanup();
        }
    }

    pub fn is_disposed(&self) -> bool {
        let id = self.id;
        with_stage(|stage| !stage.scopes.contains(id))
    }
}

struct RestoreScope(Option<ScopeId>);

impl Drop for RestoreScope {
    fn drop(&mut self) {
        let prev = self.0;
        with_stage(|stage| stage.scopes.enter(prev));
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::element::Rect;
    use crate::runtime::{create_element, open_scope};

    #[test]
    fn test_nested_scopes_dispose_children_first() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let owner = create_element(Rect::default());

        let outer = open_scope(owner);
        let order_outer = order.clone();
        let order_inner = order.clone();
        let inner = outer.run(|| {
            let inner = open_scope(owner);
            inner.on_dispose(move || order_inner.borrow_mut().push("inner"));
            inner
        });
        outer.on_dispose(move || order_outer.borrow_mut().push("outer"));

        outer.dispose();
        assert_eq!(*order.borrow(), vec!["inner", "outer"]);
        assert!(inner.is_disposed());
    }

    #[test]
    fn test_cleanups_run_in_reverse_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let scope = open_scope(create_element(Rect::default()));
        for name in ["first", "second", "third"] {
            let order = order.clone();
            scope.on_dispose(move || order.borrow_mut().push(name));
        }

        scope.dispose();
        assert_eq!(*order.borrow(), vec!["third", "second", "first"]);
    }

    #[test]
    fn test_dispose_twice_is_safe() {
        let scope = open_scope(create_element(Rect::default()));
        scope.dispose();
        scope.dispose();
        assert!(scope.is_disposed());
    }

    #[test]
    fn test_run_restores_previous_scope() {
        let owner = create_element(Rect::default());
        let outer = open_scope(owner);
        let (inside, after) = outer.run(|| {
            let inner = open_scope(owner);
            let inside = inner.run(|| crate::runtime::with_stage(|s| s.scopes.current()));
            let after = crate::runtime::with_stage(|s| s.scopes.current());
            (inside, after)
        });
        assert_ne!(inside, after);
        assert_eq!(after, Some(outer.id()));
        assert_eq!(crate::runtime::with_stage(|s| s.scopes.current()), None);
    }

    #[test]
    fn test_disposed_slots_are_reused() {
        let owner = create_element(Rect::default());
        let first = open_scope(owner);
        first.dispose();

        for _ in 0..100 {
            let scope = open_scope(owner);
            assert_eq!(
                crate::runtime::with_stage(|s| s.scopes.owner(scope.id())),
                Some(owner)
            );
            scope.dispose();
        }
        assert_eq!(crate::runtime::with_stage(|s| s.scopes.capacity()), 1);
    }

    #[test]
    fn test_stale_handle_leaves_new_scope_alone() {
        let owner = create_element(Rect::default());
        let stale = open_scope(owner);
        stale.dispose();

        let fresh = open_scope(owner);
        assert_ne!(stale.id(), fresh.id());
        stale.dispose();
        assert!(!fresh.is_disposed());
        assert_eq!(
            crate::runtime::with_stage(|s| s.scopes.parent(fresh.id())),
            None
        );
    }

    #[test]
    fn test_run_restores_previous_scope_after_panic() {
        let outer = open_scope(create_element(Rect::default()));
        let inner = open_scope(create_element(Rect::default()));

        outer.run(|| {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                inner.run(|| panic!("section setup failed"));
            }));
            assert!(result.is_err());
            assert_eq!(
                crate::runtime::with_stage(|s| s.scopes.current()),
                Some(outer.id())
            );
        });
        assert_eq!(crate::runtime::with_stage(|s| s.scopes.current()), None);
    }
}
