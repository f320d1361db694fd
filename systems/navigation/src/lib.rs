#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure one-turn course-finding engine.
//!
//! Given a mover, a target, a stopping clearance and an obstacle set, the
//! engine produces a `(speed, heading)` pair that is safe for one
//! straight-line turn, or fails with a typed error. It plans exactly one
//! turn ahead; multi-turn trajectories are out of scope, and moving
//! own-fleet ships are arbitrated separately by the reservation ledger.

use armada_core::{
    angle_between, dist_point_to_segment, projection, Entity, Ship, Side, MAX_SPEED, SHIP_RADIUS,
};
use glam::DVec2;
use thiserror::Error;

/// Granularity of the heading walk, in degrees.
pub const ANGLE_STEP: i32 = 1;

/// Maximum deviation from the direct bearing searched on each side.
pub const MAX_DEVIATION: i32 = 90;

/// Obstacles farther than this from the mover are not considered.
pub const IGNORE_COLLISION_DIST: f64 = 100.0;

/// Safety pad added to swept-path radii during collision tests.
pub const PATH_MARGIN: f64 = 0.01;

/// A one-turn course: thrust magnitude and integer-degree heading.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Course {
    /// Thrust magnitude in `0..=7`.
    pub speed: i32,
    /// Heading in `0..360`.
    pub heading: i32,
}

/// Failure to find a safe one-turn course.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum NavigationError {
    /// Every heading within the search window sweeps through an obstacle,
    /// at the full required speed and at every slower speed down to 1.
    #[error("no safe heading within {deviation}° of bearing {bearing} at speeds 1..={speed}")]
    NoSafeHeading {
        /// Direct bearing toward the stopping point.
        bearing: i32,
        /// Full speed the search started from.
        speed: i32,
        /// Angular window searched on each side.
        deviation: i32,
    },
    /// The course requires no movement, but the mover's current position
    /// already overlaps an obstacle. Distinct from a blocked heading walk:
    /// a clean standstill is a success, not this error.
    #[error("stationary position overlaps {obstacle}")]
    UnsafeStandstill {
        /// Description of the overlapping obstacle.
        obstacle: String,
    },
}

/// Plans a course toward a bare point, stopping on it exactly.
pub fn course_to_point(
    ship: &Ship,
    point: DVec2,
    obstacles: &[Entity],
    side: Side,
) -> Result<Course, NavigationError> {
    let travel = ship.position.distance(point);
    seek(ship, point, travel, obstacles, side)
}

/// Plans a course toward `target`, stopping `clearance` short of its edge.
///
/// The travel distance is the centre-to-edge approach distance minus the
/// clearance; callers choose the clearance to suit the manoeuvre (a wide
/// pad for a cautious planet approach, a tight one for close combat, the
/// minimum legal pad for the final docking run).
///
/// # Panics
///
/// Panics if `target` is the no-target sentinel; validating the target
/// first is the caller's contract.
pub fn approach(
    ship: &Ship,
    target: &Entity,
    clearance: f64,
    obstacles: &[Entity],
    side: Side,
) -> Result<Course, NavigationError> {
    let stop_point = target.position();
    let travel = ship.position.distance(stop_point) - target.radius() - clearance;
    seek(ship, stop_point, travel, obstacles, side)
}

/// Nearest obstacle whose inflated disc intersects the straight path of
/// length `search_dist` along `heading`, if any.
pub fn first_collision(
    ship: &Ship,
    search_dist: f64,
    heading: i32,
    obstacles: &[Entity],
) -> Option<Entity> {
    let start = ship.position;
    let end = projection(start, search_dist, heading);
    obstacles
        .iter()
        .filter(|obstacle| !is_self(ship, obstacle))
        .filter(|obstacle| {
            dist_point_to_segment(obstacle.position(), start, end)
                <= obstacle.radius() + SHIP_RADIUS + PATH_MARGIN
        })
        .min_by(|a, b| {
            start
                .distance(a.position())
                .total_cmp(&start.distance(b.position()))
        })
        .cloned()
}

/// Picks the avoidance side that does not cross through `blocker`.
///
/// The blocker's side of the ship→target line decides: a blocker lying on
/// the positive-rotation side sends the ship the other way.
pub fn decide_side(ship: &Ship, target: &Entity, blocker: &Entity) -> Side {
    let to_target = target.position() - ship.position;
    let to_blocker = blocker.position() - ship.position;
    if to_target.perp_dot(to_blocker) > 0.0 {
        Side::Left
    } else {
        Side::Right
    }
}

fn seek(
    ship: &Ship,
    stop_point: DVec2,
    travel: f64,
    obstacles: &[Entity],
    side: Side,
) -> Result<Course, NavigationError> {
    let bearing = angle_between(ship.position, stop_point);
    let full_speed = if travel <= 0.0 {
        0
    } else {
        (travel.floor() as i32).min(MAX_SPEED)
    };

    if full_speed == 0 {
        // A stationary ship still occupies space; the standstill is only
        // safe if the current disc overlaps nothing.
        let me = Entity::Ship(*ship);
        return match obstacles
            .iter()
            .find(|obstacle| !is_self(ship, obstacle) && me.collides(obstacle))
        {
            None => Ok(Course {
                speed: 0,
                heading: bearing,
            }),
            Some(obstacle) => Err(NavigationError::UnsafeStandstill {
                obstacle: obstacle.to_string(),
            }),
        };
    }

    // A shorter sweep may clear where the full one cannot.
    for speed in (1..=full_speed).rev() {
        if let Some(heading) = clear_heading(ship, bearing, speed, obstacles, side) {
            return Ok(Course { speed, heading });
        }
    }

    Err(NavigationError::NoSafeHeading {
        bearing,
        speed: full_speed,
        deviation: MAX_DEVIATION,
    })
}

fn clear_heading(
    ship: &Ship,
    bearing: i32,
    speed: i32,
    obstacles: &[Entity],
    side: Side,
) -> Option<i32> {
    let mut deviation = 0;
    while deviation <= MAX_DEVIATION {
        for sign in [side.sign(), side.opposite().sign()] {
            let heading = (bearing + sign * deviation).rem_euclid(360);
            if path_is_clear(ship, f64::from(speed), heading, obstacles) {
                return Some(heading);
            }
            if deviation == 0 {
                break;
            }
        }
        deviation += ANGLE_STEP;
    }
    None
}

fn path_is_clear(ship: &Ship, distance: f64, heading: i32, obstacles: &[Entity]) -> bool {
    let start = ship.position;
    let end = projection(start, distance, heading);
    obstacles.iter().all(|obstacle| {
        if is_self(ship, obstacle) {
            return true;
        }
        if start.distance(obstacle.position()) > IGNORE_COLLISION_DIST {
            return true;
        }
        dist_point_to_segment(obstacle.position(), start, end)
            > obstacle.radius() + SHIP_RADIUS + PATH_MARGIN
    })
}

fn is_self(ship: &Ship, obstacle: &Entity) -> bool {
    matches!(obstacle, Entity::Ship(other) if other.id == ship.id)
}
