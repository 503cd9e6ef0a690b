// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Placement preferences and resolved placements.
//!
//! A [`Placement`] is what the consumer asks for; it may be `auto`.
//! A [`ResolvedPlacement`] is what the engine chose after looking at the available space; it
//! always names a concrete [`Side`] and can differ from the preference.
//!
//! Both use the familiar `side[-alignment]` spelling:
//!
//! ```
//! use understory_popup::placement::{Align, Placement, Side};
//!
//! let p: Placement = "bottom-start".parse().unwrap();
//! assert_eq!(p, Placement::Side(Side::Bottom, Align::Start));
//! assert_eq!(p.to_string(), "bottom-start");
//! assert_eq!("auto".parse::<Placement>().unwrap(), Placement::Auto(Align::Center));
//! ```

use core::fmt;
use core::str::FromStr;

/// Side of the anchor the popup is placed on.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Side {
    /// Above the anchor.
    Top,
    /// Below the anchor.
    Bottom,
    /// Left of the anchor.
    Left,
    /// Right of the anchor.
    Right,
}

impl Side {
    /// All sides, in the order `auto` considers them when room is equal.
    pub const ALL: [Self; 4] = [Self::Bottom, Self::Top, Self::Right, Self::Left];

    /// The side across the anchor.
    pub const fn opposite(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Returns true for `Top` and `Bottom`.
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }

    /// Lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Alignment of the popup along the anchor's edge.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Align {
    /// Centered on the anchor.
    #[default]
    Center,
    /// Flush with the anchor's leading edge.
    Start,
    /// Flush with the anchor's trailing edge.
    End,
}

impl Align {
    const fn suffix(self) -> &'static str {
        match self {
            Self::Center => "",
            Self::Start => "-start",
            Self::End => "-end",
        }
    }
}

/// The placement a consumer asks for.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Placement {
    /// Let the engine pick the side with the most room.
    Auto(Align),
    /// Prefer a specific side.
    Side(Side, Align),
}

impl Default for Placement {
    fn default() -> Self {
        Self::Side(Side::Bottom, Align::Center)
    }
}

impl Placement {
    /// `auto`.
    pub const AUTO: Self = Self::Auto(Align::Center);
    /// `top`.
    pub const TOP: Self = Self::Side(Side::Top, Align::Center);
    /// `bottom`.
    pub const BOTTOM: Self = Self::Side(Side::Bottom, Align::Center);
    /// `left`.
    pub const LEFT: Self = Self::Side(Side::Left, Align::Center);
    /// `right`.
    pub const RIGHT: Self = Self::Side(Side::Right, Align::Center);

    /// The preferred side, or `None` for `auto`.
    pub const fn side(self) -> Option<Side> {
        match self {
            Self::Auto(_) => None,
            Self::Side(side, _) => Some(side),
        }
    }

    /// The requested alignment.
    pub const fn align(self) -> Align {
        match self {
            Self::Auto(align) | Self::Side(_, align) => align,
        }
    }

    /// The same preference on the opposite side; `auto` is unchanged.
    pub const fn opposite(self) -> Self {
        match self {
            Self::Auto(_) => self,
            Self::Side(side, align) => Self::Side(side.opposite(), align),
        }
    }

    /// The concrete placement this preference names, if it is not `auto`.
    pub const fn concrete(self) -> Option<ResolvedPlacement> {
        match self {
            Self::Auto(_) => None,
            Self::Side(side, align) => Some(ResolvedPlacement { side, align }),
        }
    }
}

/// The placement an engine actually chose.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ResolvedPlacement {
    /// Side of the anchor.
    pub side: Side,
    /// Alignment along that side.
    pub align: Align,
}

impl ResolvedPlacement {
    /// Create a resolved placement.
    pub const fn new(side: Side, align: Align) -> Self {
        Self { side, align }
    }

    /// Returns true if this placement honors `preference`.
    ///
    /// Any side honors `auto` as long as the alignment matches.
    pub fn matches(self, preference: Placement) -> bool {
        match preference {
            Placement::Auto(align) => self.align == align,
            Placement::Side(side, align) => self.side == side && self.align == align,
        }
    }
}

impl From<ResolvedPlacement> for Placement {
    fn from(p: ResolvedPlacement) -> Self {
        Self::Side(p.side, p.align)
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = self.side().map_or("auto", Side::as_str);
        write!(f, "{side}{}", self.align().suffix())
    }
}

impl fmt::Display for ResolvedPlacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.side.as_str(), self.align.suffix())
    }
}

/// Error returned when a placement string is not recognized.
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("unrecognized placement")]
pub struct ParsePlacementError;

impl FromStr for Placement {
    type Err = ParsePlacementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (side, align) = match s.split_once('-') {
            Some((side, "start")) => (side, Align::Start),
            Some((side, "end")) => (side, Align::End),
            Some(_) => return Err(ParsePlacementError),
            None => (s, Align::Center),
        };
        let side = match side {
            "auto" => return Ok(Self::Auto(align)),
            "top" => Side::Top,
            "bottom" => Side::Bottom,
            "left" => Side::Left,
            "right" => Side::Right,
            _ => return Err(ParsePlacementError),
        };
        Ok(Self::Side(side, align))
    }
}

impl FromStr for ResolvedPlacement {
    type Err = ParsePlacementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<Placement>()?
            .concrete()
            .ok_or(ParsePlacementError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn parses_every_spelling() {
        for side in ["auto", "top", "bottom", "left", "right"] {
            for suffix in ["", "-start", "-end"] {
                let text = alloc::format!("{side}{suffix}");
                let p: Placement = text.parse().unwrap();
                assert_eq!(p.to_string(), text);
            }
        }
    }

    #[test]
    fn rejects_unknown_spellings() {
        assert_eq!("middle".parse::<Placement>(), Err(ParsePlacementError));
        assert_eq!("top-middle".parse::<Placement>(), Err(ParsePlacementError));
        assert_eq!("".parse::<Placement>(), Err(ParsePlacementError));
        assert_eq!(
            "auto-start".parse::<ResolvedPlacement>(),
            Err(ParsePlacementError),
            "auto never resolves"
        );
    }

    #[test]
    fn opposite_keeps_alignment() {
        let p = Placement::Side(Side::Left, Align::End);
        assert_eq!(p.opposite(), Placement::Side(Side::Right, Align::End));
        assert_eq!(Placement::AUTO.opposite(), Placement::AUTO);
    }

    #[test]
    fn matches_preference() {
        let top = ResolvedPlacement::new(Side::Top, Align::Center);
        assert!(top.matches(Placement::TOP));
        assert!(!top.matches(Placement::BOTTOM));
        assert!(top.matches(Placement::AUTO));
        assert!(!top.matches(Placement::Auto(Align::Start)));
    }
}
