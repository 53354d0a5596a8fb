//! Arena-based element storage.
//!
//! The host layer mirrors every animatable node of the page into an
//! [`ElementTree`]: it reports document-space geometry, and the engine writes
//! back live visual property values.
//!
//! ## Key Features
//!
//! - **Generational Indices**: `ElementId` contains index + generation, so a
//!   stale id held by a disposed section never aliases a newer element.
//!
//! - **Detach vs remove**: a detached element keeps its slot (and its id
//!   stays valid) but is no longer part of the rendered page. Triggers and
//!   tweens treat detached elements as missing.

use crate::animation::{Property, VisualState};

/// Unique identifier for an element in the tree.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ElementId {
    index: u32,
    generation: u32,
}

impl ElementId {
    /// Convert to a u64 for external use (e.g. host-side lookup tables).
    /// Combines generation (high bits) with index (low bits).
    pub fn as_u64(self) -> u64 {
        ((self.generation as u64) << 32) | (self.index as u64)
    }
}

/// Document-space rectangle in logical pixels.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }
}

/// A node in the tree.
#[derive(Debug)]
pub struct Element {
    pub rect: Rect,
    pub attached: bool,
    /// Live property values written by tweens
    pub style: VisualState,
    /// Text carried by the element, if any (headings, split units)
    pub text: Option<String>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

impl Element {
    fn new(rect: Rect) -> Self {
        Self {
            rect,
            attached: true,
            style: VisualState::new(),
            text: None,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }
}

struct Slot {
    generation: u32,
    element: Option<Element>,
}

/// Central storage for elements.
#[derive(Default)]
pub struct ElementTree {
    slots: Vec<Slot>,
    free_indices: Vec<u32>,
    len: usize,
}

impl ElementTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an element and return its id.
    pub fn insert(&mut self, rect: Rect) -> ElementId {
        let element = Element::new(rect);
        self.len += 1;

        // Reuse a freed slot - its generation was bumped on removal
        if let Some(index) = self.free_indices.pop() {
            let slot = &mut self.slots[index as usize];
            slot.element = Some(element);
            return ElementId {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            element: Some(element),
        });
        ElementId {
            index,
            generation: 0,
        }
    }

    /// Register an element as the last child of `parent`.
    pub fn insert_child(&mut self, parent: ElementId, rect: Rect) -> Option<ElementId> {
        self.get(parent)?;
        let id = self.insert(rect);
        if let Some(child) = self.get_mut(id) {
            child.parent = Some(parent);
        }
        if let Some(parent) = self.get_mut(parent) {
            parent.children.push(id);
        }
        Some(id)
    }

    /// Remove an element and its descendants. Stale ids are ignored.
    pub fn remove(&mut self, id: ElementId) {
        let Some(element) = self.take(id) else {
            return;
        };

        if let Some(parent) = element.parent.and_then(|parent_id| self.get_mut(parent_id)) {
            parent.children.retain(|&c| c != id);
        }

        for child in element.children {
            self.remove(child);
        }
    }

    fn take(&mut self, id: ElementId) -> Option<Element> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let element = slot.element.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_indices.push(id.index);
        self.len -= 1;
        Some(element)
    }

    /// Take an element and its descendants out of the rendered page without
    /// invalidating their ids.
    pub fn detach(&mut self, id: ElementId) {
        let children = match self.get_mut(id) {
            Some(element) => {
                element.attached = false;
                element.children.clone()
            }
            None => return,
        };
        for child in children {
            self.detach(child);
        }
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.element.as_ref())
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.element.as_mut())
    }

    /// The element if it exists and is part of the rendered page.
    pub fn live(&self, id: ElementId) -> Option<&Element> {
        self.get(id).filter(|e| e.attached)
    }

    pub fn live_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.get_mut(id).filter(|e| e.attached)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.get(id).is_some()
    }

    pub fn set_rect(&mut self, id: ElementId, rect: Rect) {
        if let Some(element) = self.get_mut(id) {
            element.rect = rect;
        }
    }

    pub fn rect(&self, id: ElementId) -> Option<Rect> {
        self.get(id).map(|e| e.rect)
    }

    pub fn style(&self, id: ElementId) -> Option<VisualState> {
        self.get(id).map(|e| e.style)
    }

    /// Resolved value of one property, rest value if never written.
    pub fn value(&self, id: ElementId, property: Property) -> Option<f32> {
        self.get(id).map(|e| e.style.resolved(property))
    }

    /// Write `values` into the element's live style. Returns false when the
    /// element is missing or detached.
    pub fn apply(&mut self, id: ElementId, values: &VisualState) -> bool {
        match self.live_mut(id) {
            Some(element) => {
                element.style.merge(values);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut tree = ElementTree::new();
        let id = tree.insert(Rect::new(0.0, 100.0, 50.0, 20.0));
        assert_eq!(tree.rect(id).map(|r| r.top()), Some(100.0));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_stale_id_after_reuse() {
        let mut tree = ElementTree::new();
        let first = tree.insert(Rect::default());
        tree.remove(first);
        let second = tree.insert(Rect::default());

        assert_ne!(first, second);
        assert!(!tree.contains(first));
        assert!(tree.contains(second));
    }

    #[test]
    fn test_remove_drops_children() {
        let mut tree = ElementTree::new();
        let parent = tree.insert(Rect::default());
        let child = tree.insert_child(parent, Rect::default()).unwrap();
        assert_eq!(tree.get(parent).unwrap().children(), &[child]);

        tree.remove(parent);
        assert!(!tree.contains(child));
        assert!(tree.is_empty());
    }

    #[test]
    fn test_detach_keeps_id_but_blocks_writes() {
        let mut tree = ElementTree::new();
        let parent = tree.insert(Rect::default());
        let child = tree.insert_child(parent, Rect::default()).unwrap();
        tree.detach(parent);

        assert!(tree.contains(child));
        assert!(tree.live(child).is_none());
        assert!(!tree.apply(child, &VisualState::new().opacity(0.0)));
        assert_eq!(tree.value(child, Property::Opacity), Some(1.0));
    }
}
