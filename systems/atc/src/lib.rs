#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Air traffic control: the per-turn swept-path reservation ledger.
//!
//! Every pilot plans independently against the obstacles known at the
//! start of the turn, but all own-fleet moves commit simultaneously, so
//! two independently safe paths may still cross. The ledger arbitrates:
//! consulted sequentially in a fixed fleet order, a committed reservation
//! claims its swept 2-D region for the remainder of the turn, and every
//! later proposal must stay clear of all earlier claims. The ledger is
//! owned by the turn orchestrator, rebuilt from scratch each turn, and has
//! no concurrent writers.

use armada_core::{dist_segment_to_segment, projection, Ship, ShipId, SHIP_RADIUS};
use glam::DVec2;

/// Safety pad added when separating two reserved swept paths.
pub const RESERVATION_MARGIN: f64 = 0.01;

/// One claimed swept path: a ship's identity and committed course.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Reservation {
    ship: ShipId,
    start: DVec2,
    end: DVec2,
}

impl Reservation {
    fn for_course(ship: &Ship, speed: i32, heading: i32) -> Self {
        Self {
            ship: ship.id,
            start: ship.position,
            end: projection(ship.position, f64::from(speed), heading),
        }
    }
}

/// Per-turn reservation ledger over swept 2-D regions.
#[derive(Debug, Default)]
pub struct AirTrafficControl {
    reservations: Vec<Reservation>,
}

impl AirTrafficControl {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wipes every reservation; called once at the start of each turn.
    pub fn clear(&mut self) {
        self.reservations.clear();
    }

    /// Whether the proposed course stays clear of every current claim.
    ///
    /// The proposal's swept segment must keep more than the combined ship
    /// radii (plus [`RESERVATION_MARGIN`]) away from each reserved swept
    /// segment. The proposer's own claims are not held against it.
    #[must_use]
    pub fn path_is_free(&self, ship: &Ship, speed: i32, heading: i32) -> bool {
        let proposed = Reservation::for_course(ship, speed, heading);
        self.reservations
            .iter()
            .filter(|reservation| reservation.ship != ship.id)
            .all(|reservation| {
                dist_segment_to_segment(
                    proposed.start,
                    proposed.end,
                    reservation.start,
                    reservation.end,
                ) > SHIP_RADIUS + SHIP_RADIUS + RESERVATION_MARGIN
            })
    }

    /// Commits a reservation, valid until the next [`Self::clear`].
    pub fn restrict(&mut self, ship: &Ship, speed: i32, heading: i32) {
        self.reservations
            .push(Reservation::for_course(ship, speed, heading));
    }

    /// Removes one reservation matching the given course, if present.
    ///
    /// Pilots use this to vacate their provisional stationary claim before
    /// testing a new proposal, so their own uncommitted state cannot block
    /// them.
    pub fn unrestrict(&mut self, ship: &Ship, speed: i32, heading: i32) {
        let course = Reservation::for_course(ship, speed, heading);
        if let Some(index) = self
            .reservations
            .iter()
            .position(|reservation| *reservation == course)
        {
            let _ = self.reservations.remove(index);
        }
    }

    /// Number of active reservations this turn.
    #[must_use]
    pub fn reserved_count(&self) -> usize {
        self.reservations.len()
    }
}

#[cfg(test)]
mod tests {
    use armada_core::{DockedStatus, PlayerId};

    use super::*;

    fn ship_at(id: u32, x: f64, y: f64) -> Ship {
        Ship {
            id: ShipId::new(id),
            owner: PlayerId::new(0),
            position: DVec2::new(x, y),
            hp: 255,
            docked_status: DockedStatus::Undocked,
            docked_planet: None,
            docking_progress: 0,
            birth: 0,
        }
    }

    #[test]
    fn restricted_path_blocks_an_intersecting_proposal() {
        let mut atc = AirTrafficControl::new();
        let first = ship_at(0, 0.0, 0.0);
        let second = ship_at(1, 3.0, -3.0);

        atc.restrict(&first, 7, 0);
        // A northbound sweep crossing the first ship's eastbound claim.
        assert!(!atc.path_is_free(&second, 7, 90));

        atc.clear();
        assert!(atc.path_is_free(&second, 7, 90));
        assert_eq!(atc.reserved_count(), 0);
    }

    #[test]
    fn distant_paths_do_not_interfere() {
        let mut atc = AirTrafficControl::new();
        let first = ship_at(0, 0.0, 0.0);
        let second = ship_at(1, 0.0, 30.0);

        atc.restrict(&first, 7, 0);
        assert!(atc.path_is_free(&second, 7, 0));
    }

    #[test]
    fn a_ships_own_claim_never_blocks_it() {
        let mut atc = AirTrafficControl::new();
        let ship = ship_at(0, 0.0, 0.0);

        atc.restrict(&ship, 0, 0);
        assert!(atc.path_is_free(&ship, 7, 0));
    }

    #[test]
    fn unrestrict_removes_exactly_one_matching_claim() {
        let mut atc = AirTrafficControl::new();
        let parked = ship_at(0, 5.0, 0.0);
        let mover = ship_at(1, 0.0, 0.0);

        atc.restrict(&parked, 0, 0);
        assert!(!atc.path_is_free(&mover, 7, 0));

        atc.unrestrict(&parked, 0, 0);
        assert_eq!(atc.reserved_count(), 0);
        assert!(atc.path_is_free(&mover, 7, 0));
    }

    #[test]
    fn stationary_claims_occupy_their_disc() {
        let mut atc = AirTrafficControl::new();
        let parked = ship_at(0, 3.0, 0.5);
        let mover = ship_at(1, 0.0, 0.0);

        atc.restrict(&parked, 0, 0);
        // The eastbound sweep passes within the combined radii.
        assert!(!atc.path_is_free(&mover, 7, 0));
        // A southbound sweep stays clear.
        assert!(atc.path_is_free(&mover, 7, 270));
    }

    #[test]
    fn slower_sweep_can_clear_where_the_full_one_cannot() {
        let mut atc = AirTrafficControl::new();
        let parked = ship_at(0, 6.5, 0.0);
        let mover = ship_at(1, 0.0, 0.0);

        atc.restrict(&parked, 0, 0);
        assert!(!atc.path_is_free(&mover, 7, 0));
        assert!(atc.path_is_free(&mover, 5, 0));
    }
}
