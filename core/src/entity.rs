//! The entity model: ships, planets, bare points, and the explicit
//! no-target sentinel.
//!
//! `Entity` is a closed tagged union. Geometric queries against
//! [`Entity::Nothing`] are contract violations and panic loudly; they
//! indicate an upstream state-machine defect, never a normal runtime
//! condition.

use std::fmt;

use glam::DVec2;

use crate::{
    geometry::{angle_between, projection},
    DOCKING_RADIUS, DOCK_POINT_OFFSET, DOCK_POINT_SPACING, SHIP_RADIUS,
};

/// Unique identifier assigned to a ship by the game engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShipId(u32);

impl ShipId {
    /// Creates a new ship identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a planet by the game engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlanetId(u32);

impl PlanetId {
    /// Creates a new planet identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier of one of the competing players.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(u32);

impl PlayerId {
    /// Creates a new player identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Docking state reported for a ship each turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DockedStatus {
    /// Free to move and fight.
    Undocked,
    /// Partway through docking; immobile.
    Docking,
    /// Fully docked and producing; immobile.
    Docked,
    /// Partway through undocking; immobile.
    Undocking,
}

impl DockedStatus {
    /// Decodes the wire integer `0..=3`, if valid.
    #[must_use]
    pub const fn from_wire(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Undocked),
            1 => Some(Self::Docking),
            2 => Some(Self::Docked),
            3 => Some(Self::Undocking),
            _ => None,
        }
    }
}

/// Authoritative state of a single ship for the current turn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ship {
    /// Identifier persisting across turns.
    pub id: ShipId,
    /// Player controlling the ship.
    pub owner: PlayerId,
    /// Centre position in map coordinates.
    pub position: DVec2,
    /// Remaining hit points; zero means destroyed.
    pub hp: i32,
    /// Docking state for this turn.
    pub docked_status: DockedStatus,
    /// Planet the ship is docked at when not undocked.
    pub docked_planet: Option<PlanetId>,
    /// Turns of docking progress accumulated so far.
    pub docking_progress: i32,
    /// Turn this ship was first seen; detects new spawns.
    pub birth: u32,
}

impl Ship {
    /// Whether the ship still exists.
    #[must_use]
    pub const fn alive(&self) -> bool {
        self.hp > 0
    }

    /// Whether the ship can receive a movement order this turn.
    #[must_use]
    pub fn can_move(&self) -> bool {
        self.docked_status == DockedStatus::Undocked
    }

    /// Whether a dock order against `planet` would be legal right now.
    pub fn can_dock(&self, planet: &Planet) -> bool {
        self.alive()
            && planet.alive()
            && !planet.is_full()
            && planet.owner.map_or(true, |owner| owner == self.owner)
            && self.position.distance(planet.position) - planet.radius
                < DOCKING_RADIUS + SHIP_RADIUS
    }

    /// Hypothetical copy of the ship moved `distance` along `heading`.
    #[must_use]
    pub fn projected(&self, distance: f64, heading: i32) -> Self {
        let mut moved = *self;
        moved.position = projection(self.position, distance, heading);
        moved
    }
}

impl fmt::Display for Ship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ship {} [{},{}]",
            self.id.get(),
            self.position.x as i64,
            self.position.y as i64
        )
    }
}

/// Authoritative state of a single planet for the current turn.
#[derive(Clone, Debug, PartialEq)]
pub struct Planet {
    /// Identifier persisting across turns.
    pub id: PlanetId,
    /// Centre position in map coordinates.
    pub position: DVec2,
    /// Remaining hit points; zero means destroyed.
    pub hp: i32,
    /// Physical radius.
    pub radius: f64,
    /// Ship-hosting capacity.
    pub docking_spots: u32,
    /// Production accumulated toward the next spawned ship.
    pub current_production: i32,
    /// Controlling player; `None` while unowned.
    pub owner: Option<PlayerId>,
    /// Ships currently docked here.
    pub docked_ships: Vec<ShipId>,
}

impl Planet {
    /// Whether the planet still exists.
    #[must_use]
    pub const fn alive(&self) -> bool {
        self.hp > 0
    }

    /// Docking spots not yet taken.
    #[must_use]
    pub fn open_spots(&self) -> u32 {
        self.docking_spots
            .saturating_sub(self.docked_ships.len() as u32)
    }

    /// Whether every docking spot is taken.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.docked_ships.len() as u32 >= self.docking_spots
    }

    /// Waypoints on the circumference for an opening multi-ship dock.
    ///
    /// Returns one point on the bearing toward `reference`, at the planet's
    /// radius plus [`DOCK_POINT_OFFSET`]. With two or more spots a second
    /// point is found by stepping the bearing outward one degree at a time
    /// until it clears the central point by more than
    /// [`DOCK_POINT_SPACING`]; with three or more spots the mirrored point
    /// on the far side is added as well.
    #[must_use]
    pub fn opening_dock_positions(&self, reference: &Ship) -> Vec<DVec2> {
        let bearing = angle_between(self.position, reference.position);
        let offset = self.radius + DOCK_POINT_OFFSET;
        let central = projection(self.position, offset, bearing);

        if self.docking_spots <= 1 {
            return vec![central];
        }

        let mut points = vec![central];
        for step in 1..90 {
            let candidate = projection(self.position, offset, bearing + step);
            if candidate.distance(central) > DOCK_POINT_SPACING {
                points.push(candidate);
                if self.docking_spots > 2 {
                    points.push(projection(self.position, offset, bearing - step));
                }
                break;
            }
        }
        points
    }
}

impl fmt::Display for Planet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Planet {} [{},{}]",
            self.id.get(),
            self.position.x as i64,
            self.position.y as i64
        )
    }
}

/// Bare map position used as a movement target with no physical extent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    /// Location in map coordinates.
    pub position: DVec2,
}

impl Point {
    /// Creates a point target at the provided location.
    #[must_use]
    pub const fn at(position: DVec2) -> Self {
        Self { position }
    }
}

/// Closed set of things a pilot can target or avoid.
///
/// `Nothing` is the explicit "no target" state. It is never represented by
/// an absent reference: pilots match on it, and geometric queries against
/// it panic.
#[derive(Clone, Debug, PartialEq)]
pub enum Entity {
    /// A ship, own or hostile.
    Ship(Ship),
    /// A planet, owned or not.
    Planet(Planet),
    /// A bare map position.
    Point(Point),
    /// The explicit no-target sentinel.
    Nothing,
}

impl Entity {
    /// Whether this is the no-target sentinel.
    #[must_use]
    pub fn is_nothing(&self) -> bool {
        matches!(self, Self::Nothing)
    }

    /// Centre position of the entity.
    ///
    /// # Panics
    ///
    /// Panics when called on [`Entity::Nothing`].
    #[must_use]
    pub fn position(&self) -> DVec2 {
        match self {
            Self::Ship(ship) => ship.position,
            Self::Planet(planet) => planet.position,
            Self::Point(point) => point.position,
            Self::Nothing => panic!("position queried on the no-target sentinel"),
        }
    }

    /// Physical radius of the entity. Points have none.
    #[must_use]
    pub fn radius(&self) -> f64 {
        match self {
            Self::Ship(_) => SHIP_RADIUS,
            Self::Planet(planet) => planet.radius,
            Self::Point(_) | Self::Nothing => 0.0,
        }
    }

    /// Identifier of the underlying ship or planet.
    ///
    /// # Panics
    ///
    /// Panics when called on [`Entity::Point`] or [`Entity::Nothing`],
    /// which carry no identifier.
    #[must_use]
    pub fn id_value(&self) -> u32 {
        match self {
            Self::Ship(ship) => ship.id.get(),
            Self::Planet(planet) => planet.id.get(),
            Self::Point(_) => panic!("id queried on a point target"),
            Self::Nothing => panic!("id queried on the no-target sentinel"),
        }
    }

    /// Whether the entity still exists. The sentinel is never alive.
    #[must_use]
    pub fn alive(&self) -> bool {
        match self {
            Self::Ship(ship) => ship.alive(),
            Self::Planet(planet) => planet.alive(),
            Self::Point(_) => true,
            Self::Nothing => false,
        }
    }

    /// Centre-to-centre distance to `other`.
    ///
    /// # Panics
    ///
    /// Panics when either entity is [`Entity::Nothing`].
    #[must_use]
    pub fn dist(&self, other: &Self) -> f64 {
        self.position().distance(other.position())
    }

    /// Distance from this entity's centre to the edge of `other`.
    ///
    /// # Panics
    ///
    /// Panics when either entity is [`Entity::Nothing`].
    #[must_use]
    pub fn approach_dist(&self, other: &Self) -> f64 {
        self.dist(other) - other.radius()
    }

    /// Integer-degree bearing from this entity toward `other`.
    ///
    /// # Panics
    ///
    /// Panics when either entity is [`Entity::Nothing`].
    #[must_use]
    pub fn angle_to(&self, other: &Self) -> i32 {
        angle_between(self.position(), other.position())
    }

    /// Whether the two entities overlap. Edge-touching counts; symmetric.
    ///
    /// Only meaningful when at least one entity is hypothetical, since live
    /// entities never overlap.
    ///
    /// # Panics
    ///
    /// Panics when either entity is [`Entity::Nothing`].
    #[must_use]
    pub fn collides(&self, other: &Self) -> bool {
        self.dist(other) <= self.radius() + other.radius()
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ship(ship) => fmt::Display::fmt(ship, f),
            Self::Planet(planet) => fmt::Display::fmt(planet, f),
            Self::Point(point) => write!(
                f,
                "Point [{},{}]",
                point.position.x as i64, point.position.y as i64
            ),
            Self::Nothing => write!(f, "no target"),
        }
    }
}
