// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core registry: slot allocation, stacking order, nesting, and queries.

use alloc::vec::Vec;
use kurbo::{Point, Rect};

use crate::types::{LayerError, LayerFlags, LayerId};

/// Z-index assigned to the bottom-most layer by [`LayerStack::new`].
pub const DEFAULT_BASE_Z: i32 = 1000;

#[derive(Clone, Debug)]
struct Layer<A> {
    generation: u32,
    owner: Option<A>,
    parent: Option<LayerId>,
    bounds: Rect,
    flags: LayerFlags,
}

/// Ordered registry of open layers.
///
/// Every open layer has a distinct rank; a layer opened later is always ranked above every layer
/// that was open at that time.
/// [`open`](Self::open) and [`close`](Self::close) are the only operations that change the order,
/// and closing a layer never changes the relative order of the others.
///
/// `A` is an optional owner key (typically the anchor element a popup is attached to).
pub struct LayerStack<A = ()> {
    layers: Vec<Option<Layer<A>>>, // slots
    generations: Vec<u32>,         // last generation per slot (persists across closes)
    free_list: Vec<usize>,
    order: Vec<LayerId>, // bottom → top
    base_z: i32,
}

impl<A> core::fmt::Debug for LayerStack<A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LayerStack")
            .field("slots_total", &self.layers.len())
            .field("open", &self.order.len())
            .field("free_list", &self.free_list.len())
            .field("base_z", &self.base_z)
            .finish_non_exhaustive()
    }
}

impl<A> Default for LayerStack<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> LayerStack<A> {
    /// Create an empty stack whose bottom layer sits at [`DEFAULT_BASE_Z`].
    pub fn new() -> Self {
        Self::with_base_z(DEFAULT_BASE_Z)
    }

    /// Create an empty stack whose bottom layer sits at `base_z`.
    pub fn with_base_z(base_z: i32) -> Self {
        Self {
            layers: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            order: Vec::new(),
            base_z,
        }
    }

    /// Z-index of the bottom-most layer.
    pub fn base_z(&self) -> i32 {
        self.base_z
    }

    /// Open a top-level layer above every currently open layer.
    pub fn open(&mut self, owner: Option<A>) -> LayerId {
        self.insert(owner, None)
    }

    /// Open a layer nested under `parent`.
    ///
    /// Nested layers still stack by open order; the parent link only records the relationship so
    /// callers can dismiss a subtree with [`descendants`](Self::descendants).
    pub fn open_nested(&mut self, parent: LayerId, owner: Option<A>) -> Result<LayerId, LayerError> {
        if !self.is_open(parent) {
            tracing::warn!(?parent, "refusing to nest a layer under a closed parent");
            return Err(LayerError::StaleParent(parent));
        }
        Ok(self.insert(owner, Some(parent)))
    }

    /// Close a layer.
    ///
    /// Returns `false` (and changes nothing) when `id` is already closed or stale.
    /// Layers nested under `id` stay open.
    pub fn close(&mut self, id: LayerId) -> bool {
        if !self.is_open(id) {
            return false;
        }
        self.order.retain(|l| *l != id);
        self.layers[id.idx()] = None;
        self.free_list.push(id.idx());
        tracing::debug!(?id, open = self.order.len(), "closed layer");
        true
    }

    /// Returns true if `id` refers to an open layer.
    pub fn is_open(&self, id: LayerId) -> bool {
        self.layer(id).is_some()
    }

    /// Number of open layers.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if no layer is open.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterate open layers from bottom to top.
    pub fn order(&self) -> impl DoubleEndedIterator<Item = LayerId> + '_ {
        self.order.iter().copied()
    }

    /// The top-most open layer.
    pub fn topmost(&self) -> Option<LayerId> {
        self.order.last().copied()
    }

    /// Position of `id` in the order (0 is the bottom), or `None` if it is not open.
    pub fn rank(&self, id: LayerId) -> Option<usize> {
        if !self.is_open(id) {
            return None;
        }
        self.order.iter().position(|l| *l == id)
    }

    /// Z-index of `id`: the stack's base plus its rank.
    pub fn z_index(&self, id: LayerId) -> Option<i32> {
        let rank = self.rank(id)?;
        Some(i32::try_from(rank).map_or(i32::MAX, |r| self.base_z.saturating_add(r)))
    }

    /// Owner key of `id`: the one given at open, or the latest [`set_owner`](Self::set_owner).
    pub fn owner(&self, id: LayerId) -> Option<&A> {
        self.layer(id)?.owner.as_ref()
    }

    /// Replace the owner key of an open layer. Does not change the order.
    pub fn set_owner(&mut self, id: LayerId, owner: Option<A>) {
        if let Some(l) = self.layer_mut(id) {
            l.owner = owner;
        }
    }

    /// Parent of a nested layer, if that parent is still open.
    pub fn parent(&self, id: LayerId) -> Option<LayerId> {
        self.layer(id)?.parent.filter(|p| self.is_open(*p))
    }

    /// Open layers directly nested under `id`, bottom to top.
    pub fn children(&self, id: LayerId) -> impl Iterator<Item = LayerId> + '_ {
        self.order
            .iter()
            .copied()
            .filter(move |l| self.layer(*l).and_then(|n| n.parent) == Some(id))
    }

    /// Open layers transitively nested under `id`, bottom to top.
    pub fn descendants(&self, id: LayerId) -> Vec<LayerId> {
        let mut out = Vec::new();
        if !self.is_open(id) {
            return out;
        }
        // A child always opens after its parent, so one bottom-to-top pass sees parents first.
        for l in self.order.iter().copied() {
            let Some(parent) = self.layer(l).and_then(|n| n.parent) else {
                continue;
            };
            if parent == id || out.contains(&parent) {
                out.push(l);
            }
        }
        out
    }

    /// Record the world-space bounds of a layer's content.
    pub fn set_bounds(&mut self, id: LayerId, bounds: Rect) {
        if let Some(l) = self.layer_mut(id) {
            l.bounds = bounds;
        }
    }

    /// Last bounds recorded with [`set_bounds`](Self::set_bounds).
    pub fn bounds(&self, id: LayerId) -> Option<Rect> {
        self.layer(id).map(|l| l.bounds)
    }

    /// Update layer flags.
    pub fn set_flags(&mut self, id: LayerId, flags: LayerFlags) {
        if let Some(l) = self.layer_mut(id) {
            l.flags = flags;
        }
    }

    /// Flags of an open layer.
    pub fn flags(&self, id: LayerId) -> Option<LayerFlags> {
        self.layer(id).map(|l| l.flags)
    }

    /// The top-most visible, pickable layer whose bounds contain `pt`.
    pub fn topmost_at(&self, pt: Point) -> Option<LayerId> {
        let wanted = LayerFlags::VISIBLE | LayerFlags::PICKABLE;
        self.order.iter().rev().copied().find(|id| {
            self.layer(*id)
                .is_some_and(|l| l.flags.contains(wanted) && l.bounds.contains(pt))
        })
    }

    // --- internals ---

    fn insert(&mut self, owner: Option<A>, parent: Option<LayerId>) -> LayerId {
        let layer = |generation| Layer {
            generation,
            owner,
            parent,
            bounds: Rect::ZERO,
            flags: LayerFlags::default(),
        };
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.layers[idx] = Some(layer(generation));
            (idx, generation)
        } else {
            let generation = 1_u32;
            self.layers.push(Some(layer(generation)));
            self.generations.push(generation);
            (self.layers.len() - 1, generation)
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "LayerId uses 32-bit indices by design."
        )]
        let id = LayerId::new(idx as u32, generation);
        self.order.push(id);
        tracing::debug!(?id, ?parent, open = self.order.len(), "opened layer");
        id
    }

    fn layer(&self, id: LayerId) -> Option<&Layer<A>> {
        self.layers
            .get(id.idx())?
            .as_ref()
            .filter(|l| l.generation == id.1)
    }

    fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer<A>> {
        self.layers
            .get_mut(id.idx())?
            .as_mut()
            .filter(|l| l.generation == id.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn collect<A>(stack: &LayerStack<A>) -> Vec<LayerId> {
        stack.order().collect()
    }

    #[test]
    fn later_layers_stack_above() {
        let mut stack: LayerStack = LayerStack::new();
        let a = stack.open(None);
        let b = stack.open(None);
        let c = stack.open(None);
        assert_eq!(collect(&stack), vec![a, b, c]);
        assert_eq!(stack.z_index(a), Some(DEFAULT_BASE_Z));
        assert_eq!(stack.z_index(c), Some(DEFAULT_BASE_Z + 2));
        assert_eq!(stack.topmost(), Some(c));
    }

    #[test]
    fn closing_middle_keeps_relative_order() {
        let mut stack: LayerStack = LayerStack::new();
        let a = stack.open(None);
        let b = stack.open(None);
        let c = stack.open(None);
        assert!(stack.close(b));
        assert_eq!(stack.len(), 2);
        assert_eq!(collect(&stack), vec![a, c]);
        assert!(stack.rank(a) < stack.rank(c), "a must stay below c");
        assert!(stack.z_index(a) < stack.z_index(c));
    }

    #[test]
    fn close_is_idempotent() {
        let mut stack: LayerStack = LayerStack::new();
        let a = stack.open(None);
        let b = stack.open(None);
        assert!(stack.close(a));
        assert!(!stack.close(a), "second close must be a no-op");
        assert_eq!(collect(&stack), vec![b]);
    }

    #[test]
    fn reused_slot_does_not_revive_stale_id() {
        let mut stack: LayerStack = LayerStack::new();
        let a = stack.open(None);
        stack.close(a);
        let b = stack.open(None);
        assert!(stack.is_open(b));
        assert!(!stack.is_open(a));
        if a.0 == b.0 {
            assert!(b.1 > a.1, "generation must increase on reuse");
        }
        assert!(!stack.close(a), "stale id must not close the new layer");
        assert!(stack.is_open(b));
    }

    #[test]
    fn rank_is_strict() {
        let mut stack: LayerStack = LayerStack::with_base_z(0);
        let ids: Vec<_> = (0..8).map(|_| stack.open(None)).collect();
        stack.close(ids[2]);
        stack.close(ids[5]);
        let z: Vec<_> = stack.order().filter_map(|id| stack.z_index(id)).collect();
        assert_eq!(z, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn owner_is_recorded() {
        let mut stack: LayerStack<u32> = LayerStack::new();
        let a = stack.open(Some(7));
        let b = stack.open(None);
        assert_eq!(stack.owner(a), Some(&7));
        assert_eq!(stack.owner(b), None);

        stack.set_owner(b, Some(9));
        assert_eq!(stack.owner(b), Some(&9));
        assert_eq!(collect(&stack), vec![a, b], "owner changes leave the order alone");

        stack.close(a);
        assert_eq!(stack.owner(a), None);
        stack.set_owner(a, Some(1));
        assert_eq!(stack.owner(a), None, "closed layers ignore owner updates");
    }

    #[test]
    fn nested_layers_and_descendants() {
        let mut stack: LayerStack = LayerStack::new();
        let menu = stack.open(None);
        let other = stack.open(None);
        let sub = stack.open_nested(menu, None).unwrap();
        let subsub = stack.open_nested(sub, None).unwrap();
        assert_eq!(stack.parent(sub), Some(menu));
        assert_eq!(stack.children(menu).collect::<Vec<_>>(), vec![sub]);
        assert_eq!(stack.descendants(menu), vec![sub, subsub]);
        assert!(stack.descendants(other).is_empty());

        // Closing the parent does not cascade.
        stack.close(menu);
        assert!(stack.is_open(sub));
        assert_eq!(stack.parent(sub), None);
    }

    #[test]
    fn nesting_under_closed_parent_fails() {
        let mut stack: LayerStack = LayerStack::new();
        let a = stack.open(None);
        stack.close(a);
        assert_eq!(stack.open_nested(a, None), Err(LayerError::StaleParent(a)));
        assert!(stack.is_empty());
    }

    #[test]
    fn topmost_at_prefers_higher_layer() {
        let mut stack: LayerStack = LayerStack::new();
        let a = stack.open(None);
        let b = stack.open(None);
        stack.set_bounds(a, Rect::new(0.0, 0.0, 100.0, 100.0));
        stack.set_bounds(b, Rect::new(50.0, 50.0, 150.0, 150.0));
        assert_eq!(stack.topmost_at(Point::new(60.0, 60.0)), Some(b));
        assert_eq!(stack.topmost_at(Point::new(10.0, 10.0)), Some(a));
        assert_eq!(stack.topmost_at(Point::new(500.0, 500.0)), None);

        stack.set_flags(b, LayerFlags::VISIBLE);
        assert_eq!(
            stack.topmost_at(Point::new(60.0, 60.0)),
            Some(a),
            "non-pickable layers are skipped"
        );
    }
}
