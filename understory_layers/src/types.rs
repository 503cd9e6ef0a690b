// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the layer stack: layer identifiers, flags, and errors.

/// Identifier for an open layer.
///
/// This is a small, copyable handle that doubles as the popup's container: hosts mount popup
/// content into the layer named by it.
/// It consists of a slot index and a generation counter.
///
/// ## Semantics
///
/// - On open, a fresh slot is allocated with generation `1`.
/// - On close, the slot is freed; any existing `LayerId` that pointed to that slot is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new, distinct `LayerId`.
///
/// ### Liveness
///
/// Use [`LayerStack::is_open`](crate::LayerStack::is_open) to check whether a `LayerId` still
/// refers to an open layer.
/// Stale `LayerId`s never alias a different open layer because the generation must match.
///
/// ### Notes
///
/// - The generation increments on slot reuse and never decreases.
/// - `u32` is ample for practical lifetimes; behavior on generation overflow is unspecified.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct LayerId(pub(crate) u32, pub(crate) u32);

impl LayerId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Layer flags controlling visibility and picking.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct LayerFlags: u8 {
        /// Layer is visible (its content is rendered).
        const VISIBLE  = 0b0000_0001;
        /// Layer is pickable (participates in [`topmost_at`](crate::LayerStack::topmost_at)).
        const PICKABLE = 0b0000_0010;
    }
}

impl Default for LayerFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::PICKABLE
    }
}

/// Errors raised when registering a layer.
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum LayerError {
    /// A nested layer was requested under a parent that is not open.
    #[error("parent layer {0:?} is not open")]
    StaleParent(LayerId),
}
