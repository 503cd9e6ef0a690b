// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The geometry engine contract.
//!
//! Positioning math lives behind [`PositionEngine`]: given an anchor, a container, and an
//! [`EngineConfig`], the engine creates a [`Session`] that keeps the container placed next to the
//! anchor. Sessions recompute on their own schedule (scroll, resize, content changes, or an
//! explicit [`Session::update`]) and report each result by running the configured [`Modifier`]s
//! in order.
//!
//! [`basic`](crate::basic) provides a small engine; hosts can plug in their own.

use alloc::rc::Rc;
use alloc::vec::Vec;

use kurbo::Rect;

use crate::anchor::AnchorSource;
use crate::placement::{Placement, ResolvedPlacement};

/// One computation result.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Computed {
    /// Placement the engine chose.
    pub placement: ResolvedPlacement,
    /// Where the container's content goes, in the strategy's coordinate space.
    pub rect: Rect,
}

/// How computed rectangles are expressed.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Strategy {
    /// Relative to the document (the anchor's coordinate space).
    #[default]
    Absolute,
    /// Relative to the top-left of the engine's boundary (viewport).
    Fixed,
}

/// A step run after every computation.
///
/// Modifiers run in configuration order; disabled ones are skipped.
#[derive(Clone)]
pub struct Modifier {
    /// Name used in logs.
    pub name: &'static str,
    /// Whether the engine runs this modifier.
    pub enabled: bool,
    run: Rc<dyn Fn(&Computed)>,
}

impl core::fmt::Debug for Modifier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Modifier")
            .field("name", &self.name)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

impl Modifier {
    /// Create an enabled modifier.
    pub fn new(name: &'static str, run: impl Fn(&Computed) + 'static) -> Self {
        Self {
            name,
            enabled: true,
            run: Rc::new(run),
        }
    }

    /// Returns true if both modifiers are the same step: same name, same enabled state, and
    /// clones of one closure.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.name == other.name && self.enabled == other.enabled && Rc::ptr_eq(&self.run, &other.run)
    }

    /// Run the modifier if it is enabled.
    pub fn apply(&self, computed: &Computed) {
        if self.enabled {
            (self.run)(computed);
        }
    }
}

/// Configuration for a positioning session.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Preferred placement.
    pub placement: Placement,
    /// Coordinate space of computed rectangles.
    pub strategy: Strategy,
    /// Gap between the anchor and the popup, along the placement side.
    pub distance: f64,
    /// Shift along the anchor edge.
    pub skidding: f64,
    /// Allow the engine to move to another side when the preferred one lacks room.
    pub flip: bool,
    /// Steps run after each computation, in order.
    pub modifiers: Vec<Modifier>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            placement: Placement::default(),
            strategy: Strategy::default(),
            distance: 0.0,
            skidding: 0.0,
            flip: true,
            modifiers: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Set the preferred placement.
    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    /// Set the positioning strategy.
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the gap and the edge shift.
    pub fn with_offset(mut self, distance: f64, skidding: f64) -> Self {
        self.distance = distance;
        self.skidding = skidding;
        self
    }

    /// Enable or disable flipping.
    pub fn with_flip(mut self, flip: bool) -> Self {
        self.flip = flip;
        self
    }

    /// Append a modifier.
    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    /// Returns true if applying `other` over `self` would not change anything.
    ///
    /// Scalars compare by value, modifiers with [`Modifier::ptr_eq`]. A modifier rebuilt from a
    /// fresh closure is treated as a change.
    pub fn same_as(&self, other: &Self) -> bool {
        self.placement == other.placement
            && self.strategy == other.strategy
            && self.distance == other.distance
            && self.skidding == other.skidding
            && self.flip == other.flip
            && self.modifiers.len() == other.modifiers.len()
            && self
                .modifiers
                .iter()
                .zip(&other.modifiers)
                .all(|(a, b)| a.ptr_eq(b))
    }

    /// Run every enabled modifier in order.
    pub fn run_modifiers(&self, computed: &Computed) {
        for m in &self.modifiers {
            tracing::trace!(modifier = m.name, "running modifier");
            m.apply(computed);
        }
    }
}

/// A live binding between one anchor and one container.
pub trait Session {
    /// Replace the configuration and recompute.
    fn set_options(&mut self, config: EngineConfig);
    /// Force a recomputation.
    fn update(&mut self);
    /// Release engine resources. No modifier runs afterwards.
    fn destroy(&mut self);
}

/// Creates positioning sessions.
pub trait PositionEngine {
    /// Element handle the engine can measure.
    type Element: Clone + PartialEq;
    /// Container handle the engine positions.
    type Container: Clone + PartialEq;
    /// Session type.
    type Session: Session;

    /// Bind `container` to `anchor` and compute an initial placement.
    fn create_session(
        &mut self,
        anchor: AnchorSource<Self::Element>,
        container: Self::Container,
        config: EngineConfig,
    ) -> Self::Session;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::{Align, Side};
    use core::cell::Cell;

    fn computed() -> Computed {
        Computed {
            placement: ResolvedPlacement::new(Side::Top, Align::Center),
            rect: Rect::ZERO,
        }
    }

    #[test]
    fn modifiers_run_in_order_and_skip_disabled() {
        let log = Rc::new(Cell::new(0_u32));
        let (a, b, c) = (log.clone(), log.clone(), log.clone());
        let mut skipped = Modifier::new("skipped", move |_| b.set(b.get() + 100));
        skipped.enabled = false;
        let config = EngineConfig::default()
            .with_modifier(Modifier::new("first", move |_| a.set(a.get() * 10 + 1)))
            .with_modifier(skipped)
            .with_modifier(Modifier::new("second", move |_| c.set(c.get() * 10 + 2)));
        config.run_modifiers(&computed());
        assert_eq!(log.get(), 12, "enabled modifiers run in order");
    }

    #[test]
    fn same_as_compares_values_and_closure_identity() {
        let step = Modifier::new("step", |_| {});
        let base = EngineConfig::default().with_modifier(step.clone());
        assert!(base.same_as(&base.clone()));
        assert!(base.same_as(&EngineConfig::default().with_modifier(step.clone())));
        assert!(!base.same_as(&base.clone().with_offset(1.0, 0.0)));
        assert!(!base.same_as(&base.clone().with_placement(Placement::TOP)));
        assert!(!base.same_as(&EngineConfig::default()));

        let rebuilt = EngineConfig::default().with_modifier(Modifier::new("step", |_| {}));
        assert!(!base.same_as(&rebuilt), "a fresh closure is a different step");

        let mut disabled = step;
        disabled.enabled = false;
        assert!(!base.same_as(&EngineConfig::default().with_modifier(disabled)));
    }

    #[test]
    fn builders_set_fields() {
        let config = EngineConfig::default()
            .with_placement(Placement::TOP)
            .with_strategy(Strategy::Fixed)
            .with_offset(8.0, 2.0)
            .with_flip(false);
        assert_eq!(config.placement, Placement::TOP);
        assert_eq!(config.strategy, Strategy::Fixed);
        assert_eq!(config.distance, 8.0);
        assert_eq!(config.skidding, 2.0);
        assert!(!config.flip);
    }
}
