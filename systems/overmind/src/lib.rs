//! Fleet-level orchestrator.
//!
//! The [`Overmind`] owns one [`Pilot`] per owned ship plus the shared
//! traffic ledger, and drives one full decision cycle per turn: roster
//! sync, threat mapping, opening-turn assignments, then the phased
//! target/plan/execute pass in ascending ship id. The lower id always
//! moves first, so path conflicts resolve the same way every turn.

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

use armada_core::{segments_intersect, Entity, Order, Point, Ship};
use armada_system_atc::AirTrafficControl;
use armada_system_pilot::{DockingClaims, Pilot, ThreatMap};
use armada_world::{query, World};
use glam::DVec2;
use log::{debug, info};

/// Edge distance within which a mobile hostile counts as threatening a planet.
pub const THREAT_RANGE: f64 = 20.0;

/// Opening closest-pair distance below which a two-player game opens with
/// ship hunts instead of pure expansion.
const RUSH_DISTANCE: f64 = 150.0;

/// Radius around the fleet's centre of gravity inside which an early
/// all-undocked brawl counts as a rush fight.
const RUSH_RADIUS: f64 = 20.0;

/// A side with more ships than this is past the rush window.
const RUSH_MAX_SHIPS: usize = 3;

/// Top-level agent state persisting across turns.
pub struct Overmind {
    pilots: Vec<Pilot>,
    atc: AirTrafficControl,
    threats: ThreatMap,
    docking_claims: DockingClaims,
    conservative: bool,
    rush_logged: bool,
}

impl Overmind {
    /// Creates an orchestrator with an empty roster.
    ///
    /// A conservative orchestrator never opens with assassinations.
    #[must_use]
    pub fn new(conservative: bool) -> Self {
        Self {
            pilots: Vec::new(),
            atc: AirTrafficControl::new(),
            threats: ThreatMap::new(),
            docking_claims: DockingClaims::new(),
            conservative,
            rush_logged: false,
        }
    }

    /// Current roster, ascending by ship id.
    #[must_use]
    pub fn pilots(&self) -> &[Pilot] {
        &self.pilots
    }

    /// Runs one full decision cycle and returns the orders to send.
    pub fn step(&mut self, world: &World) -> Vec<Order> {
        self.sync_pilots(world);
        self.update_threats(world);
        self.docking_claims.clear();
        self.atc.clear();
        if query::turn(world) == 0 {
            self.choose_opening_targets(world);
        }
        self.note_rush(world);
        self.run_turn(world)
    }

    /// Retires pilots whose ships died and seats pilots for new spawns.
    fn sync_pilots(&mut self, world: &World) {
        self.pilots.retain_mut(|pilot| pilot.refresh(world));
        for ship in query::my_ships(world) {
            if !self.pilots.iter().any(|pilot| pilot.id() == ship.id) {
                self.pilots.push(Pilot::new(ship));
            }
        }
        self.pilots.sort_by_key(Pilot::id);
    }

    /// Rebuilds the per-planet map of nearby mobile hostiles.
    fn update_threats(&mut self, world: &World) {
        self.threats.clear();
        let enemies = query::enemy_ships(world);
        for planet in query::all_planets(world) {
            let near: Vec<Ship> = enemies
                .iter()
                .filter(|enemy| {
                    enemy.can_move()
                        && enemy.position.distance(planet.position) - planet.radius
                            < THREAT_RANGE
                })
                .copied()
                .collect();
            if !near.is_empty() {
                let _ = self.threats.insert(planet.id, near);
            }
        }
    }

    /// Hands the opening fleet its first targets.
    fn choose_opening_targets(&mut self, world: &World) {
        self.assign_opening_docks(world);
        if self.conservative || query::initial_players(world) != 2 {
            return;
        }
        let mine = query::my_ships(world);
        let theirs = query::enemy_ships(world);
        if closest_pair_dist(&mine, &theirs) < RUSH_DISTANCE {
            self.assign_assassinations(world);
        }
    }

    /// Spreads the three starting ships over three nearby dock waypoints.
    ///
    /// Waypoints are gathered from the planets closest to the first ship
    /// until three are in hand; dock points on each planet face the middle
    /// ship. All six ship-to-waypoint assignments are tried in order and
    /// the first whose approach lines do not cross wins; if every
    /// assignment crosses, the identity assignment stands.
    fn assign_opening_docks(&mut self, world: &World) {
        if self.pilots.len() != 3 {
            return;
        }
        let anchor = *self.pilots[0].ship();
        let facing = *self.pilots[1].ship();
        let mut planets = query::all_planets(world);
        planets.sort_by(|a, b| {
            anchor
                .position
                .distance(a.position)
                .total_cmp(&anchor.position.distance(b.position))
        });
        let mut docks: Vec<DVec2> = Vec::new();
        'gather: for planet in &planets {
            for spot in planet.opening_dock_positions(&facing) {
                docks.push(spot);
                if docks.len() == 3 {
                    break 'gather;
                }
            }
        }
        if docks.len() < 3 {
            return;
        }
        let orderings: [[usize; 3]; 6] = [
            [0, 1, 2],
            [0, 2, 1],
            [1, 0, 2],
            [1, 2, 0],
            [2, 0, 1],
            [2, 1, 0],
        ];
        let starts: Vec<DVec2> = self.pilots.iter().map(|p| p.ship().position).collect();
        let chosen = orderings
            .iter()
            .find(|ordering| {
                (0..3).all(|i| {
                    ((i + 1)..3).all(|j| {
                        !segments_intersect(
                            starts[i],
                            docks[ordering[i]],
                            starts[j],
                            docks[ordering[j]],
                        )
                    })
                })
            })
            .unwrap_or(&orderings[0]);
        for (pilot, &dock) in self.pilots.iter_mut().zip(chosen.iter()) {
            pilot.set_target(Entity::Point(Point::at(docks[dock])));
        }
    }

    /// Pairs ships against the enemy opening fleet by vertical rank.
    fn assign_assassinations(&mut self, world: &World) {
        let mut enemies = query::enemy_ships(world);
        enemies.sort_by(|a, b| a.position.y.total_cmp(&b.position.y));
        let mut ranks: Vec<usize> = (0..self.pilots.len()).collect();
        ranks.sort_by(|&i, &j| {
            self.pilots[i]
                .ship()
                .position
                .y
                .total_cmp(&self.pilots[j].ship().position.y)
        });
        for (&index, enemy) in ranks.iter().zip(enemies.iter()) {
            self.pilots[index].set_target(Entity::Ship(*enemy));
        }
    }

    /// Logs, once, when the game has collapsed into an early rush brawl.
    fn note_rush(&mut self, world: &World) {
        if self.rush_logged || !rush_is_on(world) {
            return;
        }
        self.rush_logged = true;
        info!("turn {}: rush fight detected", query::turn(world));
    }

    /// The phased per-turn pass over the roster, ascending by ship id.
    fn run_turn(&mut self, world: &World) -> Vec<Order> {
        let obstacles = query::all_immobile(world);

        // Every mobile ship claims its own position before anyone plans.
        for pilot in &self.pilots {
            if pilot.ship().can_move() {
                self.atc.restrict(pilot.ship(), 0, 0);
            }
        }

        // Target phase. Claims accumulate as targets settle, so later
        // pilots see how much docking capacity is already spoken for.
        for pilot in &mut self.pilots {
            pilot.validate_target(world, &self.threats, &self.docking_claims);
            if !pilot.has_target() {
                pilot.choose_target(world, &self.threats, &self.docking_claims);
            }
            if let Entity::Planet(planet) = pilot.target() {
                let desired = query::desired_spots(world, planet);
                let claimed = self.docking_claims.entry(planet.id).or_insert(0);
                if *claimed < desired {
                    *claimed += 1;
                }
            }
        }

        // Plan phase.
        for pilot in &mut self.pilots {
            pilot.plan(world, &self.threats, &obstacles);
        }

        // Execution phase. A rejected proposal gets one retry at a lower
        // speed; a ship rejected twice keeps its stationary claim and
        // sends nothing.
        let mut orders = Vec::new();
        for pilot in &mut self.pilots {
            if !pilot.has_plan() {
                continue;
            }
            if let Some(order) = pilot.execute_with_atc(&mut self.atc) {
                orders.push(order);
                continue;
            }
            pilot.slow_plan_down();
            match pilot.execute_with_atc(&mut self.atc) {
                Some(order) => orders.push(order),
                None => debug!("{}: path reserved by a peer, standing down", pilot.ship()),
            }
        }
        orders
    }
}

/// Whether the game is an early two-player brawl with nobody docked.
///
/// True only while exactly two players survive, neither fields more than
/// three ships, and every surviving ship is undocked within 20 units of
/// the all-ship centre of gravity.
#[must_use]
pub fn rush_is_on(world: &World) -> bool {
    let players = query::surviving_player_ids(world);
    if players.len() != 2 {
        return false;
    }
    let Some(center) = query::center_of_gravity(world) else {
        return false;
    };
    players.iter().all(|&player| {
        let ships = query::ships_owned_by(world, player);
        ships.len() <= RUSH_MAX_SHIPS
            && ships
                .iter()
                .all(|ship| ship.can_move() && ship.position.distance(center) <= RUSH_RADIUS)
    })
}

fn closest_pair_dist(mine: &[Ship], theirs: &[Ship]) -> f64 {
    let mut best = f64::INFINITY;
    for ours in mine {
        for other in theirs {
            best = best.min(ours.position.distance(other.position));
        }
    }
    best
}
