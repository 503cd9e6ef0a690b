// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Session lifecycle for one popup.
//!
//! ## Overview
//!
//! [`PositionAdapter`] owns at most one engine [`Session`] and keeps it in step with the props a
//! popup is rendered with. It is a two-state machine:
//!
//! - `Unbound`: no session. Entered initially, on [`unmount`](PositionAdapter::unmount), and while
//!   the anchor cannot be resolved.
//! - `Bound`: a live session for one (anchor, container) pair.
//!
//! ## Split dependencies
//!
//! Only the identity of the anchor and of the container decides whether a session is created or
//! destroyed. Everything else (placement preference, offsets, modifiers, callbacks, content) is
//! pushed into the live session with [`Session::set_options`].
//! When the identity changes, the old session is destroyed before the new one is created.
//!
//! ## Placement tracking
//!
//! Every session is configured with an extra observer modifier, appended after the consumer's
//! modifiers. Each time the engine computes, it stores the [`ResolvedPlacement`] and rectangle in
//! the adapter and calls the placement callback when the placement differs from the baseline: the
//! last value reported, or the concrete preference when nothing has been reported since the
//! preference last changed.
//!
//! ```
//! # use understory_popup::adapter::{MountStatus, PositionAdapter};
//! # use understory_popup::anchor::{AnchorSource, RectSource};
//! # use understory_popup::basic::{BasicEngine, Measure};
//! # use understory_popup::engine::EngineConfig;
//! # use understory_popup::placement::{Placement, Side};
//! # use kurbo::{Rect, Size};
//! struct Screen;
//! impl Measure for Screen {
//!     type Element = u32;
//!     type Container = u32;
//!     fn element_rect(&self, _: &u32) -> Option<Rect> { None }
//!     fn content_size(&self, _: &u32) -> Size { Size::new(100.0, 40.0) }
//!     fn boundary(&self) -> Rect { Rect::new(0.0, 0.0, 800.0, 600.0) }
//! }
//!
//! let mut adapter = PositionAdapter::new(BasicEngine::new(Screen));
//! // A virtual anchor near the bottom edge: `bottom` does not fit, so the engine flips.
//! let anchor = AnchorSource::Virtual(RectSource::fixed(Rect::new(300.0, 580.0, 340.0, 600.0)));
//! let status = adapter.mount(Some(anchor), 1, EngineConfig::default().with_placement(Placement::BOTTOM));
//! assert_eq!(status, MountStatus::Bound);
//! assert_eq!(adapter.placement().map(|p| p.side), Some(Side::Top));
//! ```

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use kurbo::Rect;

use crate::anchor::AnchorSource;
use crate::engine::{Computed, EngineConfig, Modifier, PositionEngine, Session};
use crate::placement::{Placement, ResolvedPlacement};

/// Name of the modifier the adapter appends to every session configuration.
pub const OBSERVER_MODIFIER: &str = "placement_observer";

/// Callback invoked when the resolved placement changes.
pub type PlacementCallback = Rc<dyn Fn(ResolvedPlacement)>;

/// Result of [`PositionAdapter::mount`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MountStatus {
    /// A session was created.
    Bound,
    /// The anchor could not be resolved; no session exists.
    Unresolved,
}

/// Non-fatal conditions recorded by the adapter.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Diagnostic {
    /// Neither an anchor element nor a rectangle source was available.
    UnresolvedAnchor,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnresolvedAnchor => {
                f.write_str("popup anchor is neither an element nor a rectangle source")
            }
        }
    }
}

/// State written by the observer modifier.
#[derive(Default)]
struct Observed {
    placement: Cell<Option<ResolvedPlacement>>,
    rect: Cell<Option<Rect>>,
    baseline: Cell<Option<ResolvedPlacement>>,
    callback: RefCell<Option<PlacementCallback>>,
}

impl Observed {
    fn record(&self, computed: &Computed) {
        let placement = computed.placement;
        self.placement.set(Some(placement));
        self.rect.set(Some(computed.rect));
        if self.baseline.get() == Some(placement) {
            return;
        }
        self.baseline.set(Some(placement));
        // Clone out so the callback may replace itself.
        let callback = self.callback.borrow().clone();
        if let Some(callback) = callback {
            callback(placement);
        }
    }
}

enum Binding<S, E, C> {
    Unbound,
    Bound {
        session: S,
        anchor: AnchorSource<E>,
        container: C,
    },
}

/// Keeps one positioning session bound to a popup's anchor and container.
///
/// Dropping the adapter destroys its session.
pub struct PositionAdapter<G: PositionEngine> {
    engine: G,
    binding: Binding<G::Session, G::Element, G::Container>,
    options: EngineConfig,
    // Consumer options the live session was last configured with.
    applied: Option<EngineConfig>,
    preference: Option<Placement>,
    // Set by a successful mount, consumed by the next options update.
    skip_next_update: bool,
    unresolved_reported: bool,
    observed: Rc<Observed>,
    diagnostics: Vec<Diagnostic>,
}

impl<G: PositionEngine> fmt::Debug for PositionAdapter<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PositionAdapter")
            .field("bound", &self.is_bound())
            .field("options", &self.options)
            .field("placement", &self.placement())
            .field("diagnostics", &self.diagnostics)
            .finish_non_exhaustive()
    }
}

impl<G: PositionEngine> PositionAdapter<G> {
    /// Create an unbound adapter.
    pub fn new(engine: G) -> Self {
        Self {
            engine,
            binding: Binding::Unbound,
            options: EngineConfig::default(),
            applied: None,
            preference: None,
            skip_next_update: false,
            unresolved_reported: false,
            observed: Rc::new(Observed::default()),
            diagnostics: Vec::new(),
        }
    }

    /// Create a session for `anchor` and `container`.
    ///
    /// Any existing session is destroyed first. If `anchor` is `None`, no session is created,
    /// [`Diagnostic::UnresolvedAnchor`] is recorded, and the placement state is left untouched;
    /// `options` are kept for the next mount.
    pub fn mount(
        &mut self,
        anchor: Option<AnchorSource<G::Element>>,
        container: G::Container,
        options: EngineConfig,
    ) -> MountStatus {
        self.unmount();
        self.set_preference(options.placement);
        self.options = options;
        let Some(anchor) = anchor else {
            self.report_unresolved();
            return MountStatus::Unresolved;
        };
        self.unresolved_reported = false;
        let config = self.session_config();
        tracing::debug!(placement = %self.options.placement, "creating positioning session");
        let session = self
            .engine
            .create_session(anchor.clone(), container.clone(), config);
        self.binding = Binding::Bound {
            session,
            anchor,
            container,
        };
        self.applied = Some(self.options.clone());
        self.skip_next_update = true;
        MountStatus::Bound
    }

    /// Push new options into the live session without recreating it.
    ///
    /// The first call after a mount is skipped because the mount already applied its options.
    /// Options that match the ones last applied (see [`EngineConfig::same_as`]) do not reach the
    /// session either, so re-rendering with unchanged props costs no recomputation.
    /// Without a session the options are only stored.
    pub fn update_options(&mut self, options: EngineConfig) {
        self.set_preference(options.placement);
        self.options = options;
        let Binding::Bound { session, .. } = &mut self.binding else {
            return;
        };
        if core::mem::take(&mut self.skip_next_update) {
            return;
        }
        if self.applied.as_ref().is_some_and(|a| a.same_as(&self.options)) {
            tracing::trace!("options unchanged; session left as is");
            return;
        }
        let mut config = self.options.clone();
        config.modifiers.push(observer(&self.observed));
        session.set_options(config);
        self.applied = Some(self.options.clone());
    }

    /// Destroy the live session, if any. Returns true if one was destroyed.
    pub fn unmount(&mut self) -> bool {
        self.skip_next_update = false;
        self.applied = None;
        match core::mem::replace(&mut self.binding, Binding::Unbound) {
            Binding::Unbound => false,
            Binding::Bound { mut session, .. } => {
                tracing::debug!("destroying positioning session");
                session.destroy();
                true
            }
        }
    }

    /// Reconcile with one render's props.
    ///
    /// Runs the creation step, keyed only on anchor and container identity, and then the options
    /// step. A `None` container (for example a closed popup) unbinds without a diagnostic.
    pub fn sync(
        &mut self,
        anchor: Option<AnchorSource<G::Element>>,
        container: Option<G::Container>,
        options: EngineConfig,
    ) {
        let unchanged = match (&self.binding, &anchor, &container) {
            (Binding::Bound { anchor: a, container: c, .. }, Some(na), Some(nc)) => {
                a.same_identity(na) && c == nc
            }
            _ => false,
        };
        if !unchanged {
            self.unmount();
            match container {
                None => self.unresolved_reported = false,
                // An anchor that stays unresolved is reported once, not on every render.
                Some(container) if anchor.is_some() || !self.unresolved_reported => {
                    self.mount(anchor, container, options.clone());
                }
                Some(_) => {}
            }
        }
        self.update_options(options);
    }

    /// Returns true if a session is live.
    pub fn is_bound(&self) -> bool {
        matches!(self.binding, Binding::Bound { .. })
    }

    /// The live session, for imperative calls such as [`Session::update`].
    pub fn session(&self) -> Option<&G::Session> {
        match &self.binding {
            Binding::Bound { session, .. } => Some(session),
            Binding::Unbound => None,
        }
    }

    /// The live session, mutably.
    pub fn session_mut(&mut self) -> Option<&mut G::Session> {
        match &mut self.binding {
            Binding::Bound { session, .. } => Some(session),
            Binding::Unbound => None,
        }
    }

    /// The anchor the live session is bound to.
    pub fn anchor(&self) -> Option<&AnchorSource<G::Element>> {
        match &self.binding {
            Binding::Bound { anchor, .. } => Some(anchor),
            Binding::Unbound => None,
        }
    }

    /// The container the live session is bound to.
    pub fn container(&self) -> Option<&G::Container> {
        match &self.binding {
            Binding::Bound { container, .. } => Some(container),
            Binding::Unbound => None,
        }
    }

    /// Latest options passed to the adapter.
    pub fn options(&self) -> &EngineConfig {
        &self.options
    }

    /// Latest placement reported by the engine.
    pub fn placement(&self) -> Option<ResolvedPlacement> {
        self.observed.placement.get()
    }

    /// Latest rectangle reported by the engine.
    pub fn rect(&self) -> Option<Rect> {
        self.observed.rect.get()
    }

    /// Replace the placement callback. Takes effect for the live session immediately.
    pub fn set_placement_callback(&mut self, callback: Option<PlacementCallback>) {
        *self.observed.callback.borrow_mut() = callback;
    }

    /// Diagnostics recorded so far.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Drain recorded diagnostics.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        core::mem::take(&mut self.diagnostics)
    }

    /// The engine.
    pub fn engine(&self) -> &G {
        &self.engine
    }

    // --- internals ---

    fn set_preference(&mut self, preference: Placement) {
        if self.preference != Some(preference) {
            self.preference = Some(preference);
            self.observed.baseline.set(preference.concrete());
        }
    }

    fn session_config(&self) -> EngineConfig {
        let mut config = self.options.clone();
        config.modifiers.push(observer(&self.observed));
        config
    }

    fn report_unresolved(&mut self) {
        self.unresolved_reported = true;
        let diagnostic = Diagnostic::UnresolvedAnchor;
        tracing::warn!(%diagnostic, "popup left unpositioned");
        self.diagnostics.push(diagnostic);
    }
}

impl<G: PositionEngine> Drop for PositionAdapter<G> {
    fn drop(&mut self) {
        self.unmount();
    }
}

fn observer(observed: &Rc<Observed>) -> Modifier {
    let observed = Rc::clone(observed);
    Modifier::new(OBSERVER_MODIFIER, move |computed| observed.record(computed))
}
