// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_popup --heading-base-level=0

//! Understory Popup: anchor-relative popups on top of a pluggable positioning engine.
//!
//! ## Overview
//!
//! A popup is content that floats next to an anchor: a dropdown under its button, a tooltip above
//! its target, a context menu at a click point.
//! The math that decides where it goes lives in an engine (see [`engine`]); this crate manages the
//! lifecycle around it.
//!
//! - [`adapter::PositionAdapter`] creates one engine session per (anchor, container) pair, pushes
//!   option changes into the live session instead of rebuilding it, and tracks the placement the
//!   engine actually chose.
//! - [`popup::Popup`] combines the adapter with a layer from
//!   [`understory_layers::SharedLayerStack`], so every open popup stacks above the ones opened
//!   before it.
//! - [`basic::BasicEngine`] is a small engine (flip, auto, alignment, offsets, shift into the
//!   boundary) for hosts that do not bring their own.
//!
//! ## Placement feedback
//!
//! Consumers ask for a [`placement::Placement`]; the engine may pick another side when the
//! preferred one lacks room. The chosen [`placement::ResolvedPlacement`] is available after every
//! render, and a callback fires when it deviates from what was last reported.
//!
//! ## Example
//!
//! ```rust
//! use kurbo::{Rect, Size};
//! use understory_layers::{LayerStack, SharedLayerStack};
//! use understory_popup::basic::{BasicEngine, Measure};
//! use understory_popup::placement::{Placement, Side};
//! use understory_popup::popup::{Container, MountTarget, Popup, PopupContent, PopupProps};
//!
//! struct Page;
//! impl Measure for Page {
//!     type Element = &'static str;
//!     type Container = Container<()>;
//!     fn element_rect(&self, id: &&'static str) -> Option<Rect> {
//!         (*id == "save").then_some(Rect::new(20.0, 570.0, 80.0, 600.0))
//!     }
//!     fn content_size(&self, _: &Container<()>) -> Size {
//!         Size::new(120.0, 60.0)
//!     }
//!     fn boundary(&self) -> Rect {
//!         Rect::new(0.0, 0.0, 800.0, 600.0)
//!     }
//! }
//!
//! let stack = SharedLayerStack::new(LayerStack::with_base_z(10));
//! let mut popup = Popup::new(BasicEngine::new(Page), stack.clone());
//!
//! let out = popup
//!     .render(
//!         PopupProps::new(PopupContent::Fixed("Save as..."))
//!             .with_anchor("save")
//!             .with_placement(Placement::BOTTOM),
//!     )
//!     .unwrap()
//!     .unwrap();
//!
//! // No room below the button, so the popup opened above it, in the stack's first layer.
//! assert_eq!(out.placement.map(|p| p.side), Some(Side::Top));
//! assert!(matches!(out.target, MountTarget::Layer { z_index: 10, .. }));
//!
//! // Closing releases the layer.
//! assert!(popup.render(PopupProps::new(PopupContent::Fixed("")).with_open(false)).unwrap().is_none());
//! assert!(stack.borrow().is_empty());
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod adapter;
pub mod anchor;
pub mod basic;
pub mod engine;
pub mod placement;
pub mod popup;
