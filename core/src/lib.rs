#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Armada fleet agent.
//!
//! This crate defines the entity and geometry model every other workspace
//! member operates on: ships, planets, bare points and the explicit
//! no-target sentinel, the distance/angle/collision math over them, the
//! order types written back to the game engine, and the observation types
//! the protocol adapter produces from each turn snapshot. It holds no
//! mutable game state; the authoritative world lives in `armada-world`.

mod entity;
mod geometry;
mod order;
mod snapshot;

pub use entity::{DockedStatus, Entity, Planet, PlanetId, PlayerId, Point, Ship, ShipId};
pub use geometry::{
    angle_between, dist_point_to_segment, dist_segment_to_segment, projection,
    segments_intersect, Side,
};
pub use order::{MessageTag, Order};
pub use snapshot::{Handshake, PlanetObservation, PlayerObservation, ShipObservation, TurnObservation};

/// Radius shared by every ship.
pub const SHIP_RADIUS: f64 = 0.5;

/// Maximum centre-to-edge distance at which a ship may initiate docking.
pub const DOCKING_RADIUS: f64 = 4.0;

/// Maximum thrust magnitude a ship can apply in one turn.
pub const MAX_SPEED: i32 = 7;

/// Range within which an undocked ship deals weapon damage.
pub const WEAPON_RANGE: f64 = 5.0;

/// Hit points every ship spawns with.
pub const SHIP_SPAWN_HP: i32 = 255;

/// Turns a ship spends docking before it produces.
pub const DOCK_TURNS: i32 = 5;

/// Distance beyond a planet's edge at which opening dock waypoints sit.
pub const DOCK_POINT_OFFSET: f64 = 1.05;

/// Minimum spacing between opening dock waypoints on the same planet.
pub const DOCK_POINT_SPACING: f64 = 2.0;
