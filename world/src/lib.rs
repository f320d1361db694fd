#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative per-turn world state for the Armada agent.
//!
//! The world is rebuilt from the engine's snapshot every turn via
//! [`refresh`]; entities absent from the snapshot are dropped, ids persist
//! across turns, and the only state carried forward is what the snapshot
//! cannot provide: each ship's birth turn and the per-player cumulative
//! ship counts. Systems read the world exclusively through [`query`].

use std::collections::BTreeMap;

use armada_core::{
    Handshake, Planet, PlanetId, PlayerId, Ship, ShipId, TurnObservation,
};

/// Authoritative game state for the current turn.
#[derive(Debug)]
pub struct World {
    me: PlayerId,
    width: f64,
    height: f64,
    turn: u32,
    primed: bool,
    initial_players: usize,
    players: Vec<PlayerId>,
    ships: BTreeMap<ShipId, Ship>,
    planets: BTreeMap<PlanetId, Planet>,
    cumulative_ships: BTreeMap<PlayerId, u32>,
}

impl World {
    /// Creates an empty world from the protocol handshake.
    ///
    /// The world holds no entities until the first [`refresh`].
    #[must_use]
    pub fn new(handshake: Handshake) -> Self {
        Self {
            me: handshake.player_id,
            width: handshake.width,
            height: handshake.height,
            turn: 0,
            primed: false,
            initial_players: 0,
            players: Vec::new(),
            ships: BTreeMap::new(),
            planets: BTreeMap::new(),
            cumulative_ships: BTreeMap::new(),
        }
    }
}

/// Rebuilds the world from the provided turn snapshot.
///
/// The first call establishes turn 0; every later call advances the turn
/// counter by one. Ships seen for the first time record the current turn
/// as their birth turn and bump their owner's cumulative count.
pub fn refresh(world: &mut World, observation: &TurnObservation) {
    if world.primed {
        world.turn = world.turn.saturating_add(1);
    } else {
        world.primed = true;
    }

    let birth_turns: BTreeMap<ShipId, u32> = world
        .ships
        .iter()
        .map(|(id, ship)| (*id, ship.birth))
        .collect();

    world.ships.clear();
    world.players.clear();

    for player in &observation.players {
        world.players.push(player.player);
        for observed in &player.ships {
            let birth = birth_turns
                .get(&observed.id)
                .copied()
                .unwrap_or(world.turn);
            if birth == world.turn {
                let count = world.cumulative_ships.entry(player.player).or_insert(0);
                *count = count.saturating_add(1);
            }
            let _ = world.ships.insert(
                observed.id,
                Ship {
                    id: observed.id,
                    owner: player.player,
                    position: observed.position,
                    hp: observed.hp,
                    docked_status: observed.docked_status,
                    docked_planet: observed.docked_planet,
                    docking_progress: observed.docking_progress,
                    birth,
                },
            );
        }
    }
    world.players.sort_unstable();

    if world.initial_players == 0 {
        world.initial_players = world.players.len();
    }

    world.planets.clear();
    for observed in &observation.planets {
        let _ = world.planets.insert(
            observed.id,
            Planet {
                id: observed.id,
                position: observed.position,
                hp: observed.hp,
                radius: observed.radius,
                docking_spots: observed.docking_spots,
                current_production: observed.current_production,
                owner: observed.owner,
                docked_ships: observed.docked_ships.clone(),
            },
        );
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use armada_core::{DockedStatus, Entity, Planet, PlanetId, PlayerId, Ship, ShipId};
    use glam::DVec2;

    use super::World;

    /// Current turn number; turn 0 is the first snapshot.
    #[must_use]
    pub fn turn(world: &World) -> u32 {
        world.turn
    }

    /// Our own player id.
    #[must_use]
    pub fn me(world: &World) -> PlayerId {
        world.me
    }

    /// Map bounds as `(width, height)` in world units.
    #[must_use]
    pub fn bounds(world: &World) -> (f64, f64) {
        (world.width, world.height)
    }

    /// Number of players present when the match began.
    #[must_use]
    pub fn initial_players(world: &World) -> usize {
        world.initial_players
    }

    /// Players still holding ships this turn, in ascending id order.
    #[must_use]
    pub fn surviving_player_ids(world: &World) -> &[PlayerId] {
        &world.players
    }

    /// Looks up a ship by id.
    #[must_use]
    pub fn get_ship(world: &World, id: ShipId) -> Option<&Ship> {
        world.ships.get(&id)
    }

    /// Looks up a planet by id.
    #[must_use]
    pub fn get_planet(world: &World, id: PlanetId) -> Option<&Planet> {
        world.planets.get(&id)
    }

    /// Every surviving ship, in ascending id order.
    #[must_use]
    pub fn all_ships(world: &World) -> Vec<Ship> {
        world.ships.values().copied().collect()
    }

    /// Every surviving planet, in ascending id order.
    #[must_use]
    pub fn all_planets(world: &World) -> Vec<Planet> {
        world.planets.values().cloned().collect()
    }

    /// Ships owned by the provided player, in ascending id order.
    #[must_use]
    pub fn ships_owned_by(world: &World, player: PlayerId) -> Vec<Ship> {
        world
            .ships
            .values()
            .filter(|ship| ship.owner == player)
            .copied()
            .collect()
    }

    /// Our own ships, in ascending id order.
    #[must_use]
    pub fn my_ships(world: &World) -> Vec<Ship> {
        ships_owned_by(world, world.me)
    }

    /// Every hostile ship, in ascending id order.
    #[must_use]
    pub fn enemy_ships(world: &World) -> Vec<Ship> {
        world
            .ships
            .values()
            .filter(|ship| ship.owner != world.me)
            .copied()
            .collect()
    }

    /// Ships currently docked at the planet.
    #[must_use]
    pub fn ships_docked_at(world: &World, planet: &Planet) -> Vec<Ship> {
        planet
            .docked_ships
            .iter()
            .filter_map(|id| world.ships.get(id))
            .copied()
            .collect()
    }

    /// Everything that cannot move this turn: planets plus every ship that
    /// is docked, docking or undocking.
    #[must_use]
    pub fn all_immobile(world: &World) -> Vec<Entity> {
        let mut entities: Vec<Entity> = world
            .planets
            .values()
            .cloned()
            .map(Entity::Planet)
            .collect();
        entities.extend(
            world
                .ships
                .values()
                .filter(|ship| ship.docked_status != DockedStatus::Undocked)
                .copied()
                .map(Entity::Ship),
        );
        entities
    }

    /// The planet whose edge is nearest to `position`, if any survive.
    #[must_use]
    pub fn closest_planet(world: &World, position: DVec2) -> Option<Planet> {
        world
            .planets
            .values()
            .min_by(|a, b| {
                let da = position.distance(a.position) - a.radius;
                let db = position.distance(b.position) - b.radius;
                da.total_cmp(&db)
            })
            .cloned()
    }

    /// Docking spots worth sending ships toward.
    ///
    /// A friendly planet wants only its open spots filled; an unowned or
    /// hostile planet counts at full capacity, since the fleet intends to
    /// clear it and take the whole thing.
    #[must_use]
    pub fn desired_spots(world: &World, planet: &Planet) -> u32 {
        match planet.owner {
            Some(owner) if owner == world.me => planet.open_spots(),
            _ => planet.docking_spots,
        }
    }

    /// Ships spawned for the given player since the match began.
    #[must_use]
    pub fn cumulative_ship_count(world: &World, player: PlayerId) -> u32 {
        world.cumulative_ships.get(&player).copied().unwrap_or(0)
    }

    /// Centre of mass of every surviving ship, own and hostile.
    #[must_use]
    pub fn center_of_gravity(world: &World) -> Option<DVec2> {
        if world.ships.is_empty() {
            return None;
        }
        let sum: DVec2 = world.ships.values().map(|ship| ship.position).sum();
        Some(sum / world.ships.len() as f64)
    }

    /// Our ships first seen this turn, in ascending id order.
    #[must_use]
    pub fn my_new_ship_ids(world: &World) -> Vec<ShipId> {
        world
            .ships
            .values()
            .filter(|ship| ship.owner == world.me && ship.birth == world.turn)
            .map(|ship| ship.id)
            .collect()
    }
}
