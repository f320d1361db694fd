//! Observation types produced by the protocol adapter from each snapshot.
//!
//! These carry exactly what the wire provides; the world layer turns them
//! into authoritative [`Ship`](crate::Ship)/[`Planet`](crate::Planet) state
//! and adds what only it can know, such as birth turns.

use glam::DVec2;

use crate::{DockedStatus, PlanetId, PlayerId, ShipId};

/// Initial handshake data sent once before the first turn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Handshake {
    /// Our own player id.
    pub player_id: PlayerId,
    /// Map width in world units.
    pub width: f64,
    /// Map height in world units.
    pub height: f64,
}

/// One ship as reported by the engine this turn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShipObservation {
    /// Identifier persisting across turns.
    pub id: ShipId,
    /// Centre position in map coordinates.
    pub position: DVec2,
    /// Remaining hit points.
    pub hp: i32,
    /// Docking state.
    pub docked_status: DockedStatus,
    /// Planet docked at, when not undocked.
    pub docked_planet: Option<PlanetId>,
    /// Turns of docking progress.
    pub docking_progress: i32,
}

/// One player's fleet as reported by the engine this turn.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerObservation {
    /// The player owning the listed ships.
    pub player: PlayerId,
    /// Every surviving ship of the player.
    pub ships: Vec<ShipObservation>,
}

/// One planet as reported by the engine this turn.
#[derive(Clone, Debug, PartialEq)]
pub struct PlanetObservation {
    /// Identifier persisting across turns.
    pub id: PlanetId,
    /// Centre position in map coordinates.
    pub position: DVec2,
    /// Remaining hit points.
    pub hp: i32,
    /// Physical radius.
    pub radius: f64,
    /// Ship-hosting capacity.
    pub docking_spots: u32,
    /// Production accumulated toward the next spawned ship.
    pub current_production: i32,
    /// Controlling player, already corrected to `None` when unowned.
    pub owner: Option<PlayerId>,
    /// Ships currently docked here.
    pub docked_ships: Vec<ShipId>,
}

/// Complete immutable snapshot for one turn.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TurnObservation {
    /// Every surviving player and their ships.
    pub players: Vec<PlayerObservation>,
    /// Every surviving planet.
    pub planets: Vec<PlanetObservation>,
}
