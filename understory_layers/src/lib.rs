// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_layers --heading-base-level=0

//! Understory Layers: an ordered registry of open popup layers.
//!
//! Popups, menus, tooltips, and dialogs float above the regular content, and when several are open
//! at once they need one consistent stacking order.
//! This crate keeps that order.
//!
//! - Every open layer gets a distinct rank; later layers stack above earlier ones.
//! - [`LayerStack::open`] and [`LayerStack::close`] are the only mutators of the order, and closing
//!   a layer never reorders the remaining ones.
//! - A [`LayerId`] is a generational handle that doubles as the container a host mounts popup
//!   content into. Stale ids never alias a reopened slot.
//! - Optional nesting records which layer a popup was opened from, for subtree dismissal.
//! - Recorded bounds plus [`LayerStack::topmost_at`] give a cheap "which popup is under the
//!   pointer" query for outside-click handling.
//!
//! ## Sharing
//!
//! The stack is a plain owned value: construct it where your UI lives and hand it to popups.
//! [`SharedLayerStack`] wraps it in a single-threaded shared handle, and [`LayerLease`] releases a
//! registration exactly once when dropped.
//!
//! ## Not a renderer
//!
//! This crate does not create or paint anything.
//! Hosts map each [`LayerId`] to whatever node or surface they render popups into, and use
//! [`LayerStack::z_index`] (or [`LayerStack::order`]) to layer them.
//!
//! ## Example
//!
//! ```rust
//! use understory_layers::LayerStack;
//!
//! let mut stack: LayerStack = LayerStack::with_base_z(100);
//! let a = stack.open(None);
//! let b = stack.open(None);
//! let c = stack.open(None);
//!
//! // Closing B leaves A below C.
//! assert!(stack.close(b));
//! assert_eq!(stack.order().collect::<Vec<_>>(), vec![a, c]);
//! assert_eq!(stack.z_index(a), Some(100));
//! assert_eq!(stack.z_index(c), Some(101));
//!
//! // Closing twice is harmless.
//! assert!(!stack.close(b));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod shared;
mod stack;
mod types;

pub use shared::{LayerLease, SharedLayerStack};
pub use stack::{DEFAULT_BASE_Z, LayerStack};
pub use types::{LayerError, LayerFlags, LayerId};
