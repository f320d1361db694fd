//! Per-ship pilot state machine.
//!
//! Each owned, surviving ship is flown by one [`Pilot`]. A pilot keeps a
//! persistent target across turns, re-resolves it against fresh state every
//! turn, plans at most one order, and commits that order through the shared
//! traffic ledger. Pilots never talk to each other; all fleet-level
//! coordination happens through the maps the orchestrator hands in.

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

use std::collections::BTreeMap;

use armada_core::{
    angle_between, Entity, MessageTag, Order, Planet, PlanetId, Ship, ShipId, Side,
    DOCKING_RADIUS, SHIP_RADIUS, WEAPON_RANGE,
};
use armada_system_atc::AirTrafficControl;
use armada_system_navigation as navigation;
use armada_world::{query, World};
use log::{debug, warn};

/// Clearance kept from a planet's edge while crossing the map toward it.
pub const PLANET_CLEARANCE: f64 = 4.45;

/// Clearance kept from an enemy ship's edge when closing to fight it.
pub const COMBAT_CLEARANCE: f64 = 5.45;

/// Clearance for the last leg before docking. Fractionally inside the dock
/// range so the stopping point itself is a legal dock position.
pub const DOCK_CLEARANCE: f64 = DOCKING_RADIUS + SHIP_RADIUS - 0.001;

/// Approach distance at which a planet target flips from chase to engagement.
pub const ENGAGE_RANGE: f64 = 10.0;

/// How far ahead the direct bearing is scanned when picking an avoidance side.
const SIDE_SCAN_DIST: f64 = 1000.0;

/// Mobile hostile ships loitering near each planet this turn.
pub type ThreatMap = BTreeMap<PlanetId, Vec<Ship>>;

/// Own ships already committed toward each planet's docking capacity.
pub type DockingClaims = BTreeMap<PlanetId, u32>;

/// State machine flying a single owned ship.
///
/// The target persists across turns; the plan and its execution flag are
/// turn-scoped and reset by [`Pilot::refresh`].
#[derive(Clone, Debug)]
pub struct Pilot {
    ship: Ship,
    target: Entity,
    plan: Option<Order>,
    executed: bool,
}

impl Pilot {
    /// Creates a pilot for a newly seen ship, with no target.
    #[must_use]
    pub const fn new(ship: Ship) -> Self {
        Self {
            ship,
            target: Entity::Nothing,
            plan: None,
            executed: false,
        }
    }

    /// The ship this pilot flies, as of the last refresh.
    #[must_use]
    pub const fn ship(&self) -> &Ship {
        &self.ship
    }

    /// Identifier of the flown ship.
    #[must_use]
    pub const fn id(&self) -> ShipId {
        self.ship.id
    }

    /// Current target.
    #[must_use]
    pub const fn target(&self) -> &Entity {
        &self.target
    }

    /// Overrides the current target.
    pub fn set_target(&mut self, target: Entity) {
        self.target = target;
    }

    /// Whether the pilot currently has a target.
    #[must_use]
    pub fn has_target(&self) -> bool {
        !self.target.is_nothing()
    }

    /// Whether a plan exists this turn, committed or not.
    #[must_use]
    pub const fn has_plan(&self) -> bool {
        self.plan.is_some()
    }

    /// Re-reads the authoritative ship state and discards last turn's plan.
    ///
    /// Ship and planet targets are re-resolved by id so their snapshot is
    /// never stale; a target that no longer exists collapses to the no-target
    /// state. Returns `false` when the flown ship itself is gone, in which
    /// case the pilot must be retired.
    pub fn refresh(&mut self, world: &World) -> bool {
        let Some(ship) = query::get_ship(world, self.ship.id) else {
            return false;
        };
        self.ship = *ship;
        self.plan = None;
        self.executed = false;
        self.target = match std::mem::replace(&mut self.target, Entity::Nothing) {
            Entity::Ship(old) => query::get_ship(world, old.id)
                .copied()
                .map_or(Entity::Nothing, Entity::Ship),
            Entity::Planet(old) => query::get_planet(world, old.id)
                .cloned()
                .map_or(Entity::Nothing, Entity::Planet),
            keep @ (Entity::Point(_) | Entity::Nothing) => keep,
        };
        true
    }

    /// Drops a target that no longer needs this ship.
    ///
    /// A ship target is dropped when destroyed. A planet target is dropped
    /// when destroyed, or when it is quiet (no nearby mobile hostiles) and
    /// its remaining docking appetite is already covered by other ships'
    /// claims. A contested planet is kept even when fully claimed.
    pub fn validate_target(&mut self, world: &World, threats: &ThreatMap, claims: &DockingClaims) {
        match &self.target {
            Entity::Ship(prey) => {
                if !prey.alive() {
                    self.target = Entity::Nothing;
                }
            }
            Entity::Planet(planet) => {
                let desired = query::desired_spots(world, planet);
                let claimed = claims.get(&planet.id).copied().unwrap_or(0);
                let contested = threats
                    .get(&planet.id)
                    .is_some_and(|hostiles| !hostiles.is_empty());
                if !planet.alive() || (!contested && claimed >= desired) {
                    self.target = Entity::Nothing;
                }
            }
            Entity::Point(_) | Entity::Nothing => {}
        }
    }

    /// Picks the nearest planet that still needs attention.
    ///
    /// A planet qualifies when its docking appetite exceeds the claims made
    /// so far this turn, or when mobile hostiles loiter near it. Leaves the
    /// no-target state in place when nothing qualifies.
    pub fn choose_target(&mut self, world: &World, threats: &ThreatMap, claims: &DockingClaims) {
        let mut best: Option<(f64, Planet)> = None;
        for planet in query::all_planets(world) {
            let desired = query::desired_spots(world, &planet);
            let claimed = claims.get(&planet.id).copied().unwrap_or(0);
            let contested = threats
                .get(&planet.id)
                .is_some_and(|hostiles| !hostiles.is_empty());
            if desired <= claimed && !contested {
                continue;
            }
            let dist = self.ship.position.distance(planet.position) - planet.radius;
            if best.as_ref().map_or(true, |(nearest, _)| dist < *nearest) {
                best = Some((dist, planet));
            }
        }
        if let Some((_, planet)) = best {
            self.target = Entity::Planet(planet);
        }
    }

    /// Plans this turn's order without committing it.
    ///
    /// Docked ships plan nothing. A pilot without a target plans a tagged
    /// hold. Planet targets are chased until within [`ENGAGE_RANGE`] of the
    /// surface and engaged after that; ship and point targets are pursued
    /// directly. Navigation failure on a pursuit clears the target so a
    /// fresh one is chosen next turn.
    pub fn plan(&mut self, world: &World, threats: &ThreatMap, obstacles: &[Entity]) {
        if !self.ship.can_move() {
            return;
        }
        if self.target.is_nothing() {
            self.plan_thrust(0, 0, Some(MessageTag::NoTarget));
            return;
        }
        let side = self.resolve_side(world, obstacles);
        match self.target.clone() {
            Entity::Planet(planet) => {
                let remaining = Entity::Ship(self.ship).approach_dist(&self.target);
                if remaining <= ENGAGE_RANGE {
                    self.engage_planet(world, &planet, threats, obstacles);
                } else {
                    match navigation::approach(
                        &self.ship,
                        &self.target,
                        PLANET_CLEARANCE,
                        obstacles,
                        side,
                    ) {
                        Ok(course) => self.plan_thrust(
                            course.speed,
                            course.heading,
                            Some(MessageTag::Planet(planet.id)),
                        ),
                        Err(err) => {
                            warn!("{}: cannot chase {}: {}", self.ship, planet, err);
                            self.target = Entity::Nothing;
                        }
                    }
                }
            }
            Entity::Ship(prey) => {
                match navigation::approach(
                    &self.ship,
                    &self.target,
                    COMBAT_CLEARANCE,
                    obstacles,
                    side,
                ) {
                    Ok(course) => {
                        if course.speed == 0
                            && Entity::Ship(self.ship).dist(&self.target) >= WEAPON_RANGE
                        {
                            debug!("{}: stalled outside weapon range of {}", self.ship, prey);
                        }
                        self.plan_thrust(
                            course.speed,
                            course.heading,
                            Some(MessageTag::Assassinate),
                        );
                    }
                    Err(err) => {
                        warn!("{}: cannot chase {}: {}", self.ship, prey, err);
                        self.target = Entity::Nothing;
                    }
                }
            }
            Entity::Point(point) => {
                match navigation::course_to_point(&self.ship, point.position, obstacles, side) {
                    Ok(course) => self.plan_thrust(
                        course.speed,
                        course.heading,
                        Some(MessageTag::PointTarget),
                    ),
                    Err(err) => {
                        warn!("{}: cannot reach point target: {}", self.ship, err);
                        self.target = Entity::Nothing;
                    }
                }
            }
            Entity::Nothing => {}
        }
    }

    /// Tries to commit the plan through the traffic ledger.
    ///
    /// Dock orders bypass the ledger since the ship keeps its stationary
    /// claim. For a thrust plan, the pilot's stationary claim is lifted and
    /// the swept path proposed; on rejection the stationary claim is put
    /// back and `None` returned so the caller may retry with a slower plan.
    pub fn execute_with_atc(&mut self, atc: &mut AirTrafficControl) -> Option<Order> {
        if self.executed {
            return None;
        }
        let order = self.plan?;
        match order.course() {
            None => {
                self.executed = true;
                Some(order)
            }
            Some((speed, heading)) => {
                atc.unrestrict(&self.ship, 0, 0);
                if atc.path_is_free(&self.ship, speed, heading) {
                    atc.restrict(&self.ship, speed, heading);
                    self.executed = true;
                    Some(order)
                } else {
                    atc.restrict(&self.ship, 0, 0);
                    None
                }
            }
        }
    }

    /// Drops an unexecuted thrust plan by one speed unit, retagging it.
    ///
    /// A plan already at zero speed is left alone.
    pub fn slow_plan_down(&mut self) {
        if let Some(Order::Thrust {
            ship,
            speed,
            heading,
            ..
        }) = self.plan
        {
            if speed >= 1 {
                self.plan = Some(Order::Thrust {
                    ship,
                    speed: speed - 1,
                    heading,
                    tag: Some(MessageTag::AtcSlowed),
                });
            }
        }
    }

    fn plan_thrust(&mut self, speed: i32, heading: i32, tag: Option<MessageTag>) {
        self.plan = Some(Order::Thrust {
            ship: self.ship.id,
            speed,
            heading: heading.rem_euclid(360),
            tag,
        });
    }

    /// Picks which way to deviate around whatever blocks the direct bearing.
    ///
    /// The default side alternates by ship id parity so a stream of ships
    /// splits around an obstacle instead of stacking up on one side. When a
    /// planet (or a ship docked at one) blocks the bearing and is not itself
    /// the target, the geometrically shorter side wins instead.
    fn resolve_side(&self, world: &World, obstacles: &[Entity]) -> Side {
        let mut side = Side::default_for(self.ship.id);
        let bearing = angle_between(self.ship.position, self.target.position());
        if let Some(blocker) =
            navigation::first_collision(&self.ship, SIDE_SCAN_DIST, bearing, obstacles)
        {
            let blocking_planet = match &blocker {
                Entity::Planet(planet) => Some(planet.clone()),
                Entity::Ship(ship) => ship
                    .docked_planet
                    .and_then(|id| query::get_planet(world, id))
                    .cloned(),
                Entity::Point(_) | Entity::Nothing => None,
            };
            if let Some(planet) = blocking_planet {
                let chasing_it =
                    matches!(&self.target, Entity::Planet(target) if target.id == planet.id);
                if !chasing_it {
                    side = navigation::decide_side(
                        &self.ship,
                        &self.target,
                        &Entity::Planet(planet),
                    );
                }
            }
        }
        side
    }

    /// Handles a planet target once within engagement range of its surface.
    fn engage_planet(
        &mut self,
        world: &World,
        planet: &Planet,
        threats: &ThreatMap,
        obstacles: &[Entity],
    ) {
        let me = query::me(world);
        let hostiles = threats.get(&planet.id).map_or(&[][..], Vec::as_slice);
        if !hostiles.is_empty() {
            // Mobile defenders first; dockers join the pool at hostile planets.
            let mut enemies: Vec<Ship> = hostiles.to_vec();
            if planet.owner.is_some_and(|owner| owner != me) {
                enemies.extend(query::ships_docked_at(world, planet));
            }
            if let Some(enemy) = self.nearest_of(&enemies) {
                let target = Entity::Ship(enemy);
                let side =
                    navigation::decide_side(&self.ship, &target, &Entity::Planet(planet.clone()));
                match navigation::approach(&self.ship, &target, COMBAT_CLEARANCE, obstacles, side) {
                    Ok(course) => self.plan_thrust(
                        course.speed,
                        course.heading,
                        Some(MessageTag::FightInOrbit),
                    ),
                    Err(err) => {
                        warn!("{}: cannot close with {}: {}", self.ship, enemy, err);
                        self.plan_thrust(0, 0, Some(MessageTag::FightInOrbit));
                    }
                }
            }
            return;
        }
        if planet.owner.is_none() || (planet.owner == Some(me) && !planet.is_full()) {
            self.final_dock_approach(planet, obstacles);
            return;
        }
        if planet.owner == Some(me) {
            debug!("{}: full friendly {} needs nothing", self.ship, planet);
            return;
        }
        // Hostile, fully quiet planet: shoot its docked ships.
        let docked = query::ships_docked_at(world, planet);
        if let Some(victim) = self.nearest_of(&docked) {
            let target = Entity::Ship(victim);
            let side =
                navigation::decide_side(&self.ship, &target, &Entity::Planet(planet.clone()));
            match navigation::approach(&self.ship, &target, COMBAT_CLEARANCE, obstacles, side) {
                Ok(course) => self.plan_thrust(
                    course.speed,
                    course.heading,
                    Some(MessageTag::AttackDocked),
                ),
                Err(err) => warn!("{}: cannot reach docked {}: {}", self.ship, victim, err),
            }
        }
    }

    /// Last leg toward a dockable planet: dock when legal, close in otherwise.
    fn final_dock_approach(&mut self, planet: &Planet, obstacles: &[Entity]) {
        if self.ship.can_dock(planet) {
            self.plan = Some(Order::Dock {
                ship: self.ship.id,
                planet: planet.id,
            });
            return;
        }
        let side = Side::default_for(self.ship.id);
        match navigation::approach(
            &self.ship,
            &Entity::Planet(planet.clone()),
            DOCK_CLEARANCE,
            obstacles,
            side,
        ) {
            Ok(course) => {
                self.plan_thrust(course.speed, course.heading, Some(MessageTag::DockApproach));
            }
            Err(err) => {
                warn!("{}: final approach to {} blocked: {}", self.ship, planet, err);
                self.plan_thrust(0, 0, Some(MessageTag::DockApproach));
            }
        }
    }

    fn nearest_of(&self, ships: &[Ship]) -> Option<Ship> {
        ships
            .iter()
            .min_by(|a, b| {
                self.ship
                    .position
                    .distance(a.position)
                    .total_cmp(&self.ship.position.distance(b.position))
            })
            .copied()
    }
}
