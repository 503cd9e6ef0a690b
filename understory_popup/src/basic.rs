// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A small positioning engine.
//!
//! [`BasicEngine`] covers the common cases: place the popup on the preferred side, flip when that
//! side lacks room, pick the roomiest side for `auto`, align along the anchor edge, and shift the
//! result back inside the boundary.
//! It measures through a [`Measure`] implementation supplied by the host and recomputes when the
//! options change or [`Session::update`] is called (for example from the host's scroll or resize
//! handling).

use alloc::rc::Rc;

use kurbo::{Point, Rect, Size};

use crate::anchor::AnchorSource;
use crate::engine::{Computed, EngineConfig, PositionEngine, Session, Strategy};
use crate::placement::{Align, ResolvedPlacement, Side};

/// Geometry queries the basic engine needs from the host.
pub trait Measure {
    /// Element handle.
    type Element: Clone + PartialEq;
    /// Container handle.
    type Container: Clone + PartialEq;

    /// Bounding rectangle of an anchor element, or `None` if it is not laid out.
    fn element_rect(&self, element: &Self::Element) -> Option<Rect>;
    /// Size of the content mounted in a container.
    fn content_size(&self, container: &Self::Container) -> Size;
    /// Region the popup must stay inside (usually the viewport).
    fn boundary(&self) -> Rect;
}

/// Engine that positions with a [`Measure`].
pub struct BasicEngine<M> {
    measure: Rc<M>,
}

impl<M> Clone for BasicEngine<M> {
    fn clone(&self) -> Self {
        Self {
            measure: Rc::clone(&self.measure),
        }
    }
}

impl<M> core::fmt::Debug for BasicEngine<M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BasicEngine").finish_non_exhaustive()
    }
}

impl<M> BasicEngine<M> {
    /// Create an engine owning `measure`.
    pub fn new(measure: M) -> Self {
        Self::shared(Rc::new(measure))
    }

    /// Create an engine over a shared `measure`.
    pub fn shared(measure: Rc<M>) -> Self {
        Self { measure }
    }

    /// The measure.
    pub fn measure(&self) -> &M {
        &self.measure
    }
}

impl<M: Measure> PositionEngine for BasicEngine<M> {
    type Element = M::Element;
    type Container = M::Container;
    type Session = BasicSession<M>;

    fn create_session(
        &mut self,
        anchor: AnchorSource<M::Element>,
        container: M::Container,
        config: EngineConfig,
    ) -> BasicSession<M> {
        let mut session = BasicSession {
            measure: Rc::clone(&self.measure),
            anchor,
            container,
            config,
            last: None,
            destroyed: false,
        };
        session.update();
        session
    }
}

/// Session created by [`BasicEngine`].
pub struct BasicSession<M: Measure> {
    measure: Rc<M>,
    anchor: AnchorSource<M::Element>,
    container: M::Container,
    config: EngineConfig,
    last: Option<Computed>,
    destroyed: bool,
}

impl<M: Measure> core::fmt::Debug for BasicSession<M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BasicSession")
            .field("config", &self.config)
            .field("last", &self.last)
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}

impl<M: Measure> BasicSession<M> {
    /// Result of the latest computation.
    pub fn last(&self) -> Option<Computed> {
        self.last
    }

    /// Current configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns true once [`Session::destroy`] has run.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

impl<M: Measure> Session for BasicSession<M> {
    fn set_options(&mut self, config: EngineConfig) {
        self.config = config;
        self.update();
    }

    fn update(&mut self) {
        if self.destroyed {
            return;
        }
        let anchor = match &self.anchor {
            AnchorSource::Element(e) => self.measure.element_rect(e),
            AnchorSource::Virtual(source) => Some(source.rect()),
        };
        let Some(anchor) = anchor else {
            tracing::trace!("anchor element has no layout yet");
            return;
        };
        let size = self.measure.content_size(&self.container);
        let boundary = self.measure.boundary();
        let mut computed = compute(anchor, size, boundary, &self.config);
        if self.config.strategy == Strategy::Fixed {
            computed.rect = computed.rect - boundary.origin().to_vec2();
        }
        self.last = Some(computed);
        self.config.run_modifiers(&computed);
    }

    fn destroy(&mut self) {
        self.destroyed = true;
    }
}

/// Space between the anchor and the boundary on `side`.
fn room(side: Side, anchor: Rect, boundary: Rect) -> f64 {
    match side {
        Side::Top => anchor.y0 - boundary.y0,
        Side::Bottom => boundary.y1 - anchor.y1,
        Side::Left => anchor.x0 - boundary.x0,
        Side::Right => boundary.x1 - anchor.x1,
    }
}

/// Space the popup needs on `side`.
fn needed(side: Side, size: Size, distance: f64) -> f64 {
    if side.is_vertical() {
        size.height + distance
    } else {
        size.width + distance
    }
}

fn choose_side(anchor: Rect, size: Size, boundary: Rect, config: &EngineConfig) -> Side {
    let fits = |side| room(side, anchor, boundary) >= needed(side, size, config.distance);
    let Some(preferred) = config.placement.side() else {
        let mut best = Side::ALL[0];
        for side in Side::ALL {
            if room(side, anchor, boundary) > room(best, anchor, boundary) {
                best = side;
            }
        }
        return best;
    };
    if !config.flip || fits(preferred) {
        return preferred;
    }
    // Opposite side first, then the perpendicular ones.
    let fallbacks = if preferred.is_vertical() {
        [preferred.opposite(), Side::Right, Side::Left]
    } else {
        [preferred.opposite(), Side::Bottom, Side::Top]
    };
    fallbacks.into_iter().find(|s| fits(*s)).unwrap_or(preferred)
}

/// Start coordinate of an extent of `len` aligned against `[lo, hi]`.
fn aligned(align: Align, lo: f64, hi: f64, len: f64) -> f64 {
    match align {
        Align::Start => lo,
        Align::Center => (lo + hi) * 0.5 - len * 0.5,
        Align::End => hi - len,
    }
}

/// Clamp `start` so `[start, start + len]` stays within `[lo, hi]`, favoring `lo`.
fn shift_into(start: f64, len: f64, lo: f64, hi: f64) -> f64 {
    start.min(hi - len).max(lo)
}

fn compute(anchor: Rect, size: Size, boundary: Rect, config: &EngineConfig) -> Computed {
    let side = choose_side(anchor, size, boundary, config);
    let align = config.placement.align();
    let origin = if side.is_vertical() {
        let y = match side {
            Side::Top => anchor.y0 - config.distance - size.height,
            _ => anchor.y1 + config.distance,
        };
        let x = aligned(align, anchor.x0, anchor.x1, size.width) + config.skidding;
        Point::new(shift_into(x, size.width, boundary.x0, boundary.x1), y)
    } else {
        let x = match side {
            Side::Left => anchor.x0 - config.distance - size.width,
            _ => anchor.x1 + config.distance,
        };
        let y = aligned(align, anchor.y0, anchor.y1, size.height) + config.skidding;
        Point::new(x, shift_into(y, size.height, boundary.y0, boundary.y1))
    };
    Computed {
        placement: ResolvedPlacement::new(side, align),
        rect: Rect::from_origin_size(origin, size),
    }
}
