// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Anchors: what a popup is attached to.
//!
//! A popup can be anchored to a live element handle, to a [`NodeRef`] that the host fills in
//! once the element exists, or to a [`RectSource`] callback for "virtual" anchors such as a text
//! caret or a context-menu click point.
//! [`resolve_anchor`] turns whatever the consumer supplied into the single [`AnchorSource`] a
//! positioning session is created with.

use alloc::rc::Rc;
use core::cell::RefCell;

use kurbo::Rect;

/// A shared, attachable reference to an element.
///
/// Hosts typically create one per anchor widget, hand clones to popups, and [`set`](Self::set)
/// it once the element is mounted.
pub struct NodeRef<E> {
    slot: Rc<RefCell<Option<E>>>,
}

impl<E> Clone for NodeRef<E> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<E> Default for NodeRef<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: core::fmt::Debug> core::fmt::Debug for NodeRef<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("NodeRef").field(&self.slot.borrow()).finish()
    }
}

impl<E> NodeRef<E> {
    /// Create an empty reference.
    pub fn new() -> Self {
        Self {
            slot: Rc::new(RefCell::new(None)),
        }
    }

    /// Attach an element.
    pub fn set(&self, element: E) {
        *self.slot.borrow_mut() = Some(element);
    }

    /// Detach the element.
    pub fn clear(&self) {
        *self.slot.borrow_mut() = None;
    }
}

impl<E: Clone> NodeRef<E> {
    /// The attached element, if any.
    pub fn get(&self) -> Option<E> {
        self.slot.borrow().clone()
    }
}

/// A callback producing the anchor's bounding rectangle on demand.
///
/// Identity is the callback allocation: clones compare equal for session purposes, two separately
/// constructed sources never do. Keep one source alive across renders to avoid rebinding.
#[derive(Clone)]
pub struct RectSource(Rc<dyn Fn() -> Rect>);

impl core::fmt::Debug for RectSource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("RectSource").finish_non_exhaustive()
    }
}

impl RectSource {
    /// Wrap a rectangle callback.
    pub fn new(f: impl Fn() -> Rect + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// A source that always reports `rect`.
    pub fn fixed(rect: Rect) -> Self {
        Self::new(move || rect)
    }

    /// Query the current rectangle.
    pub fn rect(&self) -> Rect {
        (self.0)()
    }

    /// Returns true if both sources share the same callback.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// What the consumer passed as the anchor.
#[derive(Clone, Debug)]
pub enum AnchorRef<E> {
    /// A live element.
    Element(E),
    /// A reference that may or may not be attached yet.
    Ref(NodeRef<E>),
}

impl<E: Clone> AnchorRef<E> {
    /// The element this anchor currently points at.
    pub fn current(&self) -> Option<E> {
        match self {
            Self::Element(e) => Some(e.clone()),
            Self::Ref(r) => r.get(),
        }
    }
}

impl<E> From<E> for AnchorRef<E> {
    fn from(element: E) -> Self {
        Self::Element(element)
    }
}

/// The resolved anchor a positioning session is bound to.
#[derive(Clone, Debug)]
pub enum AnchorSource<E> {
    /// Anchored to an element; the engine measures it.
    Element(E),
    /// Anchored to a rectangle callback.
    Virtual(RectSource),
}

impl<E: PartialEq> AnchorSource<E> {
    /// Returns true if both sources denote the same anchor.
    ///
    /// Elements compare with `==` (handles are expected to have identity semantics), rectangle
    /// sources by callback allocation.
    pub fn same_identity(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Element(a), Self::Element(b)) => a == b,
            (Self::Virtual(a), Self::Virtual(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

/// Resolve the consumer's anchor props into a session anchor.
///
/// An attached element wins; otherwise the rectangle callback is used. Returns `None` when
/// neither is available.
pub fn resolve_anchor<E: Clone>(
    anchor: Option<&AnchorRef<E>>,
    rect: Option<&RectSource>,
) -> Option<AnchorSource<E>> {
    anchor
        .and_then(AnchorRef::current)
        .map(AnchorSource::Element)
        .or_else(|| rect.cloned().map(AnchorSource::Virtual))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_wins_over_rect() {
        let rect = RectSource::fixed(Rect::new(0.0, 0.0, 1.0, 1.0));
        let resolved = resolve_anchor(Some(&AnchorRef::Element(3_u32)), Some(&rect)).unwrap();
        assert!(matches!(resolved, AnchorSource::Element(3)));
    }

    #[test]
    fn empty_ref_falls_back_to_rect() {
        let node: NodeRef<u32> = NodeRef::new();
        let rect = RectSource::fixed(Rect::new(0.0, 0.0, 1.0, 1.0));
        let anchor = AnchorRef::Ref(node.clone());
        let resolved = resolve_anchor(Some(&anchor), Some(&rect)).unwrap();
        assert!(matches!(resolved, AnchorSource::Virtual(_)));

        node.set(9);
        let resolved = resolve_anchor(Some(&anchor), Some(&rect)).unwrap();
        assert!(matches!(resolved, AnchorSource::Element(9)));
    }

    #[test]
    fn nothing_resolves_to_none() {
        let node: NodeRef<u32> = NodeRef::new();
        assert!(resolve_anchor::<u32>(None, None).is_none());
        assert!(resolve_anchor(Some(&AnchorRef::Ref(node)), None).is_none());
    }

    #[test]
    fn identity_semantics() {
        let a = RectSource::fixed(Rect::ZERO);
        let b = RectSource::fixed(Rect::ZERO);
        let va: AnchorSource<u32> = AnchorSource::Virtual(a.clone());
        assert!(va.same_identity(&AnchorSource::Virtual(a)));
        assert!(!va.same_identity(&AnchorSource::Virtual(b)));
        assert!(AnchorSource::Element(1_u32).same_identity(&AnchorSource::Element(1)));
        assert!(!AnchorSource::Element(1_u32).same_identity(&va));
    }
}
