//! Planar geometry shared by the navigation engine and the reservation
//! ledger. Headings are integer compass degrees in `0..360`, measured by
//! the engine's fixed convention (`atan2` of the position delta, rounded).

use glam::DVec2;

use crate::ShipId;

/// Side of the direct bearing on which to route around an obstacle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// Deviations applied with a negative heading sign.
    Left,
    /// Deviations applied with a positive heading sign.
    Right,
}

impl Side {
    /// Sign applied to heading deviations routed on this side.
    #[must_use]
    pub const fn sign(self) -> i32 {
        match self {
            Self::Left => -1,
            Self::Right => 1,
        }
    }

    /// The opposite side.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Arbitrary but stable default used when no obstacle analysis applies.
    ///
    /// Even ship ids route right and odd ids route left, so unrelated ships
    /// do not converge on the same detour and re-collide.
    #[must_use]
    pub const fn default_for(ship: ShipId) -> Self {
        if ship.get() % 2 == 0 {
            Self::Right
        } else {
            Self::Left
        }
    }
}

/// Integer-degree bearing in `0..360` from `from` toward `to`.
#[must_use]
pub fn angle_between(from: DVec2, to: DVec2) -> i32 {
    let delta = to - from;
    let degrees = delta.y.atan2(delta.x).to_degrees().round() as i32;
    degrees.rem_euclid(360)
}

/// Point reached by travelling `distance` from `origin` along `heading_deg`.
#[must_use]
pub fn projection(origin: DVec2, distance: f64, heading_deg: i32) -> DVec2 {
    let radians = f64::from(heading_deg).to_radians();
    origin + DVec2::new(radians.cos(), radians.sin()) * distance
}

/// Minimum distance from `point` to the segment `[a, b]`.
#[must_use]
pub fn dist_point_to_segment(point: DVec2, a: DVec2, b: DVec2) -> f64 {
    let ab = b - a;
    let length_squared = ab.length_squared();
    if length_squared == 0.0 {
        return point.distance(a);
    }
    let t = ((point - a).dot(ab) / length_squared).clamp(0.0, 1.0);
    point.distance(a + ab * t)
}

/// Minimum distance between the segments `[a1, a2]` and `[b1, b2]`.
#[must_use]
pub fn dist_segment_to_segment(a1: DVec2, a2: DVec2, b1: DVec2, b2: DVec2) -> f64 {
    if segments_intersect(a1, a2, b1, b2) {
        return 0.0;
    }
    dist_point_to_segment(b1, a1, a2)
        .min(dist_point_to_segment(b2, a1, a2))
        .min(dist_point_to_segment(a1, b1, b2))
        .min(dist_point_to_segment(a2, b1, b2))
}

/// Whether the segments `[a1, a2]` and `[b1, b2]` cross.
///
/// Touching endpoints and collinear overlap both count as crossing.
#[must_use]
pub fn segments_intersect(a1: DVec2, a2: DVec2, b1: DVec2, b2: DVec2) -> bool {
    let d1 = orientation(b1, b2, a1);
    let d2 = orientation(b1, b2, a2);
    let d3 = orientation(a1, a2, b1);
    let d4 = orientation(a1, a2, b2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && on_segment(b1, b2, a1))
        || (d2 == 0.0 && on_segment(b1, b2, a2))
        || (d3 == 0.0 && on_segment(a1, a2, b1))
        || (d4 == 0.0 && on_segment(a1, a2, b2))
}

fn orientation(a: DVec2, b: DVec2, c: DVec2) -> f64 {
    (b - a).perp_dot(c - a)
}

fn on_segment(a: DVec2, b: DVec2, point: DVec2) -> bool {
    point.x >= a.x.min(b.x)
        && point.x <= a.x.max(b.x)
        && point.y >= a.y.min(b.y)
        && point.y <= a.y.max(b.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angle_between_follows_compass_convention() {
        let origin = DVec2::ZERO;
        assert_eq!(angle_between(origin, DVec2::new(10.0, 0.0)), 0);
        assert_eq!(angle_between(origin, DVec2::new(0.0, 10.0)), 90);
        assert_eq!(angle_between(origin, DVec2::new(-10.0, 0.0)), 180);
        assert_eq!(angle_between(origin, DVec2::new(0.0, -10.0)), 270);
    }

    #[test]
    fn projection_round_trips_through_angle() {
        let origin = DVec2::new(3.0, -2.0);
        for heading in [0, 45, 133, 270, 359] {
            let reached = projection(origin, 25.0, heading);
            assert_eq!(angle_between(origin, reached), heading);
            assert!((origin.distance(reached) - 25.0).abs() < 1e-9);
        }
    }

    #[test]
    fn point_to_segment_clamps_to_endpoints() {
        let a = DVec2::new(0.0, 0.0);
        let b = DVec2::new(10.0, 0.0);
        assert!((dist_point_to_segment(DVec2::new(5.0, 3.0), a, b) - 3.0).abs() < 1e-9);
        assert!((dist_point_to_segment(DVec2::new(-4.0, 3.0), a, b) - 5.0).abs() < 1e-9);
        assert!((dist_point_to_segment(DVec2::new(14.0, 3.0), a, b) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn segment_to_segment_is_zero_when_crossing() {
        let dist = dist_segment_to_segment(
            DVec2::new(0.0, 0.0),
            DVec2::new(10.0, 10.0),
            DVec2::new(0.0, 10.0),
            DVec2::new(10.0, 0.0),
        );
        assert_eq!(dist, 0.0);
    }

    #[test]
    fn segment_to_segment_matches_parallel_gap() {
        let dist = dist_segment_to_segment(
            DVec2::new(0.0, 0.0),
            DVec2::new(10.0, 0.0),
            DVec2::new(0.0, 4.0),
            DVec2::new(10.0, 4.0),
        );
        assert!((dist - 4.0).abs() < 1e-9);
    }

    #[test]
    fn segments_intersect_detects_shared_endpoint() {
        let shared = DVec2::new(5.0, 5.0);
        assert!(segments_intersect(
            DVec2::ZERO,
            shared,
            shared,
            DVec2::new(9.0, 1.0)
        ));
    }

    #[test]
    fn disjoint_segments_do_not_intersect() {
        assert!(!segments_intersect(
            DVec2::new(0.0, 0.0),
            DVec2::new(4.0, 0.0),
            DVec2::new(0.0, 1.0),
            DVec2::new(4.0, 1.0)
        ));
    }

    #[test]
    fn default_side_alternates_by_ship_parity() {
        assert_eq!(Side::default_for(ShipId::new(4)), Side::Right);
        assert_eq!(Side::default_for(ShipId::new(7)), Side::Left);
        assert_eq!(Side::Right.opposite(), Side::Left);
        assert_eq!(Side::Left.sign(), -Side::Right.sign());
    }
}
