// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared handle and RAII leases for single-threaded UI code.
//!
//! A UI usually has one [`LayerStack`] that every popup registers with.
//! [`SharedLayerStack`] is a cheap, cloneable handle to it that can be passed down to popups
//! (constructor or context injection), and [`LayerLease`] ties one registration to a scope:
//! the layer is closed exactly once, when the lease is released or dropped.
//!
//! ```
//! use understory_layers::{LayerStack, SharedLayerStack};
//!
//! let stack: SharedLayerStack = SharedLayerStack::new(LayerStack::new());
//! let a = stack.open(None);
//! let b = stack.open(None);
//! assert_eq!(stack.borrow().topmost(), Some(b.id()));
//!
//! drop(b);
//! assert_eq!(stack.borrow().topmost(), Some(a.id()));
//! ```

use alloc::rc::Rc;
use core::cell::{Ref, RefCell, RefMut};

use kurbo::Rect;

use crate::stack::LayerStack;
use crate::types::{LayerError, LayerId};

/// Cloneable, single-threaded handle to a [`LayerStack`].
pub struct SharedLayerStack<A = ()> {
    inner: Rc<RefCell<LayerStack<A>>>,
}

impl<A> Clone for SharedLayerStack<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<A> core::fmt::Debug for SharedLayerStack<A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.inner.try_borrow() {
            Ok(stack) => f.debug_tuple("SharedLayerStack").field(&*stack).finish(),
            Err(_) => f.write_str("SharedLayerStack(<borrowed>)"),
        }
    }
}

impl<A> Default for SharedLayerStack<A> {
    fn default() -> Self {
        Self::new(LayerStack::new())
    }
}

impl<A> SharedLayerStack<A> {
    /// Wrap a stack for sharing.
    pub fn new(stack: LayerStack<A>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(stack)),
        }
    }

    /// Borrow the stack for queries.
    ///
    /// Panics if the stack is mutably borrowed.
    pub fn borrow(&self) -> Ref<'_, LayerStack<A>> {
        self.inner.borrow()
    }

    /// Borrow the stack mutably.
    ///
    /// Prefer leases for open/close; direct mutation is for flags and bounds.
    pub fn borrow_mut(&self) -> RefMut<'_, LayerStack<A>> {
        self.inner.borrow_mut()
    }

    /// Open a top-level layer and return a lease that closes it on drop.
    pub fn open(&self, owner: Option<A>) -> LayerLease<A> {
        let id = self.inner.borrow_mut().open(owner);
        LayerLease {
            stack: self.clone(),
            id,
        }
    }

    /// Open a layer nested under `parent` and return a lease that closes it on drop.
    pub fn open_nested(&self, parent: LayerId, owner: Option<A>) -> Result<LayerLease<A>, LayerError> {
        let id = self.inner.borrow_mut().open_nested(parent, owner)?;
        Ok(LayerLease {
            stack: self.clone(),
            id,
        })
    }

    /// Record the bounds of a layer's content.
    pub fn set_bounds(&self, id: LayerId, bounds: Rect) {
        self.inner.borrow_mut().set_bounds(id, bounds);
    }

    /// Returns true if both handles point at the same stack.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

/// One registration in a [`SharedLayerStack`].
///
/// Dropping the lease closes its layer. Do not drop a lease while the stack is borrowed.
#[must_use = "dropping a lease closes its layer immediately"]
pub struct LayerLease<A = ()> {
    stack: SharedLayerStack<A>,
    id: LayerId,
}

impl<A> core::fmt::Debug for LayerLease<A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LayerLease")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl<A> LayerLease<A> {
    /// The leased layer.
    pub fn id(&self) -> LayerId {
        self.id
    }

    /// The stack this lease is registered with.
    pub fn stack(&self) -> &SharedLayerStack<A> {
        &self.stack
    }

    /// Close the layer now.
    pub fn release(self) {
        drop(self);
    }
}

impl<A> Drop for LayerLease<A> {
    fn drop(&mut self) {
        self.stack.inner.borrow_mut().close(self.id);
    }
}
