// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The popup component.
//!
//! [`Popup`] ties a [`PositionAdapter`] to a [`SharedLayerStack`]. Render it once per frame (or
//! whenever its props change) with [`Popup::render`]; it returns where the host should mount the
//! content, or `None` while closed.
//!
//! Per render, in order:
//!
//! 1. A closed popup destroys its session and then releases its layer.
//! 2. An open popup in [`PortalMode::Layer`] registers a layer if it has none. This happens before
//!    the adapter reads the container. If registration fails, the session is destroyed and the
//!    error is returned.
//! 3. The adapter reconciles with the resolved anchor, the container, and the options.
//! 4. A layer left over from a previous portal mode is released after the adapter has moved off it.
//! 5. The content is resolved against the current placement.

use alloc::rc::Rc;
use core::marker::PhantomData;

use understory_layers::{LayerError, LayerId, LayerLease, SharedLayerStack};

use crate::adapter::{PlacementCallback, PositionAdapter};
use crate::anchor::{AnchorRef, AnchorSource, RectSource, resolve_anchor};
use crate::engine::{EngineConfig, Modifier, PositionEngine};
use crate::placement::{Placement, ResolvedPlacement};

/// Name of the modifier that reports popup bounds to the layer stack.
pub const LAYER_BOUNDS_MODIFIER: &str = "layer_bounds";

/// The node a popup session positions.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Container<C> {
    /// A layer owned by the layer stack.
    Layer(LayerId),
    /// A host node.
    Node(C),
}

/// Where popup content is rendered.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum PortalMode<C> {
    /// Portal into a layer registered with the stack.
    #[default]
    Layer,
    /// Portal into an explicit host node.
    Target(C),
    /// Render in place; `C` is the in-tree node that gets positioned.
    Inline(C),
}

/// Where the host mounts the content of an open popup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MountTarget<C> {
    /// Into a stack layer, drawn at `z_index`.
    Layer {
        /// The layer.
        id: LayerId,
        /// Stacking order of the layer.
        z_index: i32,
    },
    /// Into an explicit host node.
    Portal(C),
    /// In place, inside the given node.
    Inline(C),
}

/// Popup content: a fixed value or a function of the resolved placement.
pub enum PopupContent<T> {
    /// Content that does not depend on placement.
    Fixed(T),
    /// Content computed from the latest resolved placement (`None` before the first placement).
    Computed(Rc<dyn Fn(Option<ResolvedPlacement>) -> T>),
}

impl<T: core::fmt::Debug> core::fmt::Debug for PopupContent<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Fixed(t) => f.debug_tuple("Fixed").field(t).finish(),
            Self::Computed(_) => f.debug_tuple("Computed").finish_non_exhaustive(),
        }
    }
}

impl<T> PopupContent<T> {
    /// Content computed from the placement.
    pub fn computed(f: impl Fn(Option<ResolvedPlacement>) -> T + 'static) -> Self {
        Self::Computed(Rc::new(f))
    }

    /// Produce this render's content.
    pub fn resolve(self, placement: Option<ResolvedPlacement>) -> T {
        match self {
            Self::Fixed(t) => t,
            Self::Computed(f) => f(placement),
        }
    }
}

/// Props for one render of a [`Popup`].
pub struct PopupProps<E, C, T> {
    /// Anchor element or reference.
    pub anchor: Option<AnchorRef<E>>,
    /// Anchor rectangle callback, used when `anchor` does not resolve.
    pub anchor_rect: Option<RectSource>,
    /// Whether the popup is open. Closed popups produce no output.
    pub open: bool,
    /// Preferred placement. Overrides `options.placement`.
    pub placement: Placement,
    /// Called when the engine settles on a placement different from the last one reported.
    pub on_placement_update: Option<PlacementCallback>,
    /// Engine options.
    pub options: EngineConfig,
    /// Where to render.
    pub portal: PortalMode<C>,
    /// Layer this popup was opened from, for nesting. Read when the layer is registered.
    pub parent_layer: Option<LayerId>,
    /// The content.
    pub content: PopupContent<T>,
}

impl<E: core::fmt::Debug, C: core::fmt::Debug, T: core::fmt::Debug> core::fmt::Debug
    for PopupProps<E, C, T>
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PopupProps")
            .field("anchor", &self.anchor)
            .field("anchor_rect", &self.anchor_rect)
            .field("open", &self.open)
            .field("placement", &self.placement)
            .field("options", &self.options)
            .field("portal", &self.portal)
            .field("parent_layer", &self.parent_layer)
            .field("content", &self.content)
            .finish_non_exhaustive()
    }
}

impl<E, C, T> PopupProps<E, C, T> {
    /// Open props with `content`, no anchor, and default options.
    pub fn new(content: PopupContent<T>) -> Self {
        Self {
            anchor: None,
            anchor_rect: None,
            open: true,
            placement: Placement::default(),
            on_placement_update: None,
            options: EngineConfig::default(),
            portal: PortalMode::Layer,
            parent_layer: None,
            content,
        }
    }

    /// Set the anchor.
    pub fn with_anchor(mut self, anchor: impl Into<AnchorRef<E>>) -> Self {
        self.anchor = Some(anchor.into());
        self
    }

    /// Set the anchor rectangle callback.
    pub fn with_anchor_rect(mut self, rect: RectSource) -> Self {
        self.anchor_rect = Some(rect);
        self
    }

    /// Set the open flag.
    pub fn with_open(mut self, open: bool) -> Self {
        self.open = open;
        self
    }

    /// Set the preferred placement.
    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    /// Set the placement callback.
    pub fn with_placement_callback(mut self, f: impl Fn(ResolvedPlacement) + 'static) -> Self {
        self.on_placement_update = Some(Rc::new(f));
        self
    }

    /// Set the engine options.
    pub fn with_options(mut self, options: EngineConfig) -> Self {
        self.options = options;
        self
    }

    /// Set the portal mode.
    pub fn with_portal(mut self, portal: PortalMode<C>) -> Self {
        self.portal = portal;
        self
    }

    /// Nest under `parent`.
    pub fn with_parent_layer(mut self, parent: LayerId) -> Self {
        self.parent_layer = Some(parent);
        self
    }
}

/// Output of an open popup's render.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedPopup<C, T> {
    /// Where to mount the content.
    pub target: MountTarget<C>,
    /// Content for this render.
    pub content: T,
    /// Latest resolved placement.
    pub placement: Option<ResolvedPlacement>,
}

/// Errors from [`Popup::render`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PopupError {
    /// The layer could not be registered.
    #[error(transparent)]
    Layer(#[from] LayerError),
}

/// A registered layer and the modifier that reports popup bounds into it.
///
/// The modifier is built once per layer so unchanged renders hand the session the same step.
struct LayerSlot<A> {
    lease: LayerLease<A>,
    bounds: Modifier,
}

/// An anchored popup.
///
/// Owns a [`PositionAdapter`] and, while open in [`PortalMode::Layer`], one layer lease.
/// Dropping the popup destroys the session and then releases the layer.
pub struct Popup<G, C>
where
    G: PositionEngine<Container = Container<C>>,
{
    // Declared before `layer` so the session is destroyed before its layer is closed.
    adapter: PositionAdapter<G>,
    layer: Option<LayerSlot<G::Element>>,
    stack: SharedLayerStack<G::Element>,
    _phantom: PhantomData<fn() -> C>,
}

impl<G, C> core::fmt::Debug for Popup<G, C>
where
    G: PositionEngine<Container = Container<C>>,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Popup")
            .field("adapter", &self.adapter)
            .field("layer", &self.layer.as_ref().map(|slot| slot.lease.id()))
            .finish_non_exhaustive()
    }
}

impl<G, C> Popup<G, C>
where
    G: PositionEngine<Container = Container<C>>,
    G::Element: 'static,
    C: Clone + PartialEq,
{
    /// Create a closed popup that registers layers with `stack`.
    pub fn new(engine: G, stack: SharedLayerStack<G::Element>) -> Self {
        Self {
            adapter: PositionAdapter::new(engine),
            layer: None,
            stack,
            _phantom: PhantomData,
        }
    }

    /// Reconcile with `props` and return what to mount, or `None` while closed.
    pub fn render<T>(
        &mut self,
        props: PopupProps<G::Element, C, T>,
    ) -> Result<Option<RenderedPopup<C, T>>, PopupError> {
        if !props.open {
            self.close();
            return Ok(None);
        }

        let anchor = resolve_anchor(props.anchor.as_ref(), props.anchor_rect.as_ref());
        let mut stale_layer = None;
        let (container, target, bounds) = match props.portal {
            PortalMode::Layer => {
                let id = match self.ensure_layer(anchor.as_ref(), props.parent_layer) {
                    Ok(id) => id,
                    Err(err) => {
                        // Nothing gets mounted, so no session may keep positioning a previous
                        // container.
                        self.adapter.unmount();
                        return Err(err.into());
                    }
                };
                let bounds = self.layer.as_ref().map(|slot| slot.bounds.clone());
                (Container::Layer(id), self.layer_target(id), bounds)
            }
            PortalMode::Target(node) => {
                stale_layer = self.layer.take();
                (Container::Node(node.clone()), MountTarget::Portal(node), None)
            }
            PortalMode::Inline(node) => {
                stale_layer = self.layer.take();
                (Container::Node(node.clone()), MountTarget::Inline(node), None)
            }
        };

        let mut options = props.options;
        options.placement = props.placement;
        options.modifiers.extend(bounds);

        self.adapter.set_placement_callback(props.on_placement_update);
        self.adapter.sync(anchor, Some(container), options);
        // The adapter has moved off any previous layer; it can go now.
        drop(stale_layer);

        let placement = self.adapter.placement();
        Ok(Some(RenderedPopup {
            target,
            content: props.content.resolve(placement),
            placement,
        }))
    }

    /// Destroy the session and release the layer.
    pub fn close(&mut self) {
        self.adapter.unmount();
        self.layer = None;
    }

    /// Returns true if the popup currently holds a session or a layer.
    pub fn is_open(&self) -> bool {
        self.adapter.is_bound() || self.layer.is_some()
    }

    /// The popup's layer, if it holds one.
    pub fn layer(&self) -> Option<LayerId> {
        self.layer.as_ref().map(|slot| slot.lease.id())
    }

    /// The adapter, for placement state and diagnostics.
    pub fn adapter(&self) -> &PositionAdapter<G> {
        &self.adapter
    }

    /// The live session, for imperative calls.
    pub fn session_mut(&mut self) -> Option<&mut G::Session> {
        self.adapter.session_mut()
    }

    /// The live session.
    pub fn session(&self) -> Option<&G::Session> {
        self.adapter.session()
    }

    // --- internals ---

    fn layer_target(&self, id: LayerId) -> MountTarget<C> {
        let stack = self.stack.borrow();
        MountTarget::Layer {
            id,
            z_index: stack.z_index(id).unwrap_or(stack.base_z()),
        }
    }

    fn ensure_layer(
        &mut self,
        anchor: Option<&AnchorSource<G::Element>>,
        parent: Option<LayerId>,
    ) -> Result<LayerId, LayerError> {
        let owner = match anchor {
            Some(AnchorSource::Element(e)) => Some(e.clone()),
            _ => None,
        };
        if let Some(id) = self.layer() {
            {
                let mut stack = self.stack.borrow_mut();
                if stack.is_open(id) {
                    // The owner follows the current anchor.
                    stack.set_owner(id, owner);
                    return Ok(id);
                }
            }
            tracing::debug!(layer = ?id, "layer closed externally; registering again");
            self.layer = None;
        }
        let lease = match parent {
            Some(parent) => self.stack.open_nested(parent, owner)?,
            None => self.stack.open(owner),
        };
        let id = lease.id();
        let stack = self.stack.clone();
        let bounds = Modifier::new(LAYER_BOUNDS_MODIFIER, move |c| {
            stack.set_bounds(id, c.rect);
        });
        self.layer = Some(LayerSlot { lease, bounds });
        Ok(id)
    }
}
