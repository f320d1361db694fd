//! Orders written back to the game engine, one per ship per turn.

use std::fmt;

use crate::{PlanetId, ShipId};

/// Diagnostic tag folded into a thrust heading for replay tooling.
///
/// The wire heading becomes `heading + (value + 1) * 360`; the physical
/// heading is always recoverable as the encoded value modulo 360, and the
/// tag never changes behavior.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageTag {
    /// Crossing the map toward the named planet.
    Planet(PlanetId),
    /// Attacking a ship docked at a hostile planet.
    AttackDocked,
    /// Fighting mobile enemies in orbit of the target planet.
    FightInOrbit,
    /// Chasing an enemy ship across the map.
    Assassinate,
    /// Slowed one speed unit to clear a reserved path.
    AtcSlowed,
    /// Approaching a planet to dock.
    DockApproach,
    /// Moving toward a bare point target.
    PointTarget,
    /// Holding position for want of a target.
    NoTarget,
}

impl MessageTag {
    /// Wire value in `0..=180` folded into the heading.
    ///
    /// A planet chase reports the planet id itself; the named tags sit in
    /// a band above any planet id a real map hands out.
    #[must_use]
    pub const fn value(self) -> i32 {
        match self {
            Self::Planet(id) => id.get() as i32,
            Self::AttackDocked => 121,
            Self::FightInOrbit => 122,
            Self::Assassinate => 123,
            Self::AtcSlowed => 124,
            Self::DockApproach => 125,
            Self::PointTarget => 126,
            Self::NoTarget => 127,
        }
    }
}

/// A single committed order for one owned ship.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Order {
    /// Move at `speed` along the integer-degree `heading`.
    Thrust {
        /// Ship receiving the order.
        ship: ShipId,
        /// Thrust magnitude in `0..=7`.
        speed: i32,
        /// Physical heading in `0..360`.
        heading: i32,
        /// Optional replay-tool diagnostic tag.
        tag: Option<MessageTag>,
    },
    /// Begin docking at the planet.
    Dock {
        /// Ship receiving the order.
        ship: ShipId,
        /// Planet to dock at.
        planet: PlanetId,
    },
    /// Begin undocking from the current planet.
    Undock {
        /// Ship receiving the order.
        ship: ShipId,
    },
}

impl Order {
    /// Ship this order addresses.
    #[must_use]
    pub const fn ship(&self) -> ShipId {
        match self {
            Self::Thrust { ship, .. } | Self::Dock { ship, .. } | Self::Undock { ship } => *ship,
        }
    }

    /// Physical `(speed, heading)` of a thrust order; `None` otherwise.
    #[must_use]
    pub fn course(&self) -> Option<(i32, i32)> {
        match self {
            Self::Thrust { speed, heading, .. } => Some((*speed, heading.rem_euclid(360))),
            Self::Dock { .. } | Self::Undock { .. } => None,
        }
    }

    /// Whether this order leaves the ship where it is.
    #[must_use]
    pub fn is_stationary(&self) -> bool {
        self.course().map_or(true, |(speed, _)| speed == 0)
    }

    /// Renders the order in wire format.
    ///
    /// When `include_tags` is set, thrust headings carry their diagnostic
    /// tag folded in as `heading + (tag + 1) * 360`.
    #[must_use]
    pub fn encode(&self, include_tags: bool) -> String {
        match self {
            Self::Thrust {
                ship,
                speed,
                heading,
                tag,
            } => {
                let mut degrees = heading.rem_euclid(360);
                if include_tags {
                    if let Some(tag) = tag {
                        degrees += (tag.value() + 1) * 360;
                    }
                }
                format!("t {} {} {}", ship.get(), speed, degrees)
            }
            Self::Dock { ship, planet } => format!("d {} {}", ship.get(), planet.get()),
            Self::Undock { ship } => format!("u {}", ship.get()),
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thrust_encodes_wire_format() {
        let order = Order::Thrust {
            ship: ShipId::new(12),
            speed: 7,
            heading: 45,
            tag: None,
        };
        assert_eq!(order.encode(true), "t 12 7 45");
        assert_eq!(order.course(), Some((7, 45)));
        assert!(!order.is_stationary());
    }

    #[test]
    fn tagged_heading_folds_and_recovers_mod_360() {
        let order = Order::Thrust {
            ship: ShipId::new(3),
            speed: 5,
            heading: 100,
            tag: Some(MessageTag::Assassinate),
        };
        // (123 + 1) * 360 + 100.
        assert_eq!(order.encode(true), "t 3 5 44740");
        assert_eq!(44740 % 360, 100);
        // Tags never change the physical course.
        assert_eq!(order.course(), Some((5, 100)));
        assert_eq!(order.encode(false), "t 3 5 100");
    }

    #[test]
    fn planet_chase_tag_carries_the_planet_id() {
        let order = Order::Thrust {
            ship: ShipId::new(0),
            speed: 7,
            heading: 30,
            tag: Some(MessageTag::Planet(PlanetId::new(4))),
        };
        // (4 + 1) * 360 + 30.
        assert_eq!(order.encode(true), "t 0 7 1830");
        assert_eq!(MessageTag::Planet(PlanetId::new(4)).value(), 4);
        // Named tags stay clear of the planet-id band.
        assert!(MessageTag::NoTarget.value() > 120);
    }

    #[test]
    fn dock_and_undock_encode_wire_format() {
        let dock = Order::Dock {
            ship: ShipId::new(4),
            planet: PlanetId::new(2),
        };
        let undock = Order::Undock {
            ship: ShipId::new(4),
        };
        assert_eq!(dock.encode(true), "d 4 2");
        assert_eq!(undock.encode(true), "u 4");
        assert!(dock.is_stationary());
        assert_eq!(undock.course(), None);
    }

    #[test]
    fn negative_headings_normalize() {
        let order = Order::Thrust {
            ship: ShipId::new(0),
            speed: 2,
            heading: -90,
            tag: None,
        };
        assert_eq!(order.encode(false), "t 0 2 270");
    }
}
