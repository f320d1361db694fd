use armada_core::{
    DockedStatus, Entity, Planet, PlanetId, PlayerId, Point, Ship, ShipId, Side, MAX_SPEED,
};
use armada_system_navigation::{
    approach, course_to_point, decide_side, first_collision, NavigationError, ANGLE_STEP,
    IGNORE_COLLISION_DIST, MAX_DEVIATION,
};
use glam::DVec2;

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

fn planet_at(id: u32, x: f64, y: f64, radius: f64) -> Planet {
    Planet {
        id: PlanetId::new(id),
        position: DVec2::new(x, y),
        hp: 1500,
        radius,
        docking_spots: 2,
        current_production: 0,
        owner: None,
        docked_ships: Vec::new(),
    }
}

#[test]
fn tunable_constants_hold_their_documented_values() {
    assert_eq!(ANGLE_STEP, 1);
    assert_eq!(MAX_DEVIATION, 90);
    assert_eq!(IGNORE_COLLISION_DIST, 100.0);
}

#[test]
fn unobstructed_approach_takes_the_direct_bearing() {
    let mover = ship_at(0, 0.0, 0.0);
    let target = Entity::Planet(planet_at(0, 100.0, 0.0, 5.0));

    for clearance in [4.45, 5.45] {
        let course = approach(&mover, &target, clearance, &[], Side::Right)
            .expect("open space must yield a course");
        assert_eq!(course.heading, 0);
        // Remaining distance 100 - 5 - clearance exceeds max thrust.
        assert_eq!(course.speed, MAX_SPEED);
    }
}

#[test]
fn short_approach_clamps_speed_to_remaining_distance() {
    let mover = ship_at(0, 0.0, 0.0);
    let target = Entity::Planet(planet_at(0, 13.0, 0.0, 5.0));

    let course = approach(&mover, &target, 4.45, &[], Side::Right).expect("course");
    // Remaining distance 13 - 5 - 4.45 = 3.55 floors to 3.
    assert_eq!(course.speed, 3);
    assert_eq!(course.heading, 0);
}

#[test]
fn zero_remaining_distance_is_a_safe_standstill() {
    let mover = ship_at(0, 0.0, 0.0);
    let target = Entity::Planet(planet_at(0, 9.0, 0.0, 5.0));

    let course = approach(&mover, &target, 4.45, &[], Side::Right).expect("course");
    assert_eq!(course.speed, 0);
}

#[test]
fn standstill_over_an_overlapping_obstacle_fails_loudly() {
    let mover = ship_at(0, 0.0, 0.0);
    let target = Entity::Planet(planet_at(0, 9.0, 0.0, 5.0));
    let intruder = Entity::Ship(ship_at(7, 0.6, 0.0));

    let error = approach(&mover, &target, 4.45, &[intruder], Side::Right)
        .expect_err("overlap must not pass the standstill test");
    assert!(matches!(error, NavigationError::UnsafeStandstill { .. }));
}

#[test]
fn blocked_bearing_deviates_toward_the_preferred_side() {
    let mover = ship_at(0, 0.0, 0.0);
    let target = Entity::Point(Point::at(DVec2::new(20.0, 0.0)));
    let blocker = Entity::Planet(planet_at(0, 6.0, 0.0, 2.0));
    let obstacles = vec![blocker];

    let right = course_to_point(&mover, target.position(), &obstacles, Side::Right)
        .expect("right detour");
    assert!(right.heading > 0 && right.heading <= MAX_DEVIATION);

    let left =
        course_to_point(&mover, target.position(), &obstacles, Side::Left).expect("left detour");
    assert!(left.heading >= 360 - MAX_DEVIATION);

    // Mirrored walk, same deviation magnitude.
    assert_eq!(right.heading, 360 - left.heading);
}

#[test]
fn walled_in_mover_reports_no_safe_heading() {
    let mover = ship_at(0, 0.0, 0.0);
    let target = Entity::Point(Point::at(DVec2::new(30.0, 0.0)));
    // A planet ring tight enough that every heading sweep, at every speed,
    // passes through some disc.
    let obstacles: Vec<Entity> = (0..36)
        .map(|index| {
            let angle = f64::from(index * 10).to_radians();
            Entity::Planet(planet_at(
                index as u32,
                2.0 * angle.cos(),
                2.0 * angle.sin(),
                1.0,
            ))
        })
        .collect();

    let error = course_to_point(&mover, target.position(), &obstacles, Side::Right)
        .expect_err("ring must block every heading");
    assert!(matches!(error, NavigationError::NoSafeHeading { .. }));
}

#[test]
fn search_retries_at_lower_speed_when_full_sweep_is_blocked() {
    let mover = ship_at(0, 0.0, 0.0);
    let target = Entity::Point(Point::at(DVec2::new(7.5, 0.0)));
    // A ring of parked ships at radius 6.5: a speed-7 sweep must cross it
    // on every heading, while a speed-5 sweep stops comfortably inside.
    let obstacles: Vec<Entity> = (0..36)
        .map(|index| {
            let angle = f64::from(index * 10).to_radians();
            Entity::Ship(ship_at(100 + index as u32, 6.5 * angle.cos(), 6.5 * angle.sin()))
        })
        .collect();

    let course = course_to_point(&mover, target.position(), &obstacles, Side::Right)
        .expect("a shorter sweep clears the ring");
    assert!(course.speed < MAX_SPEED);
    assert!(course.speed >= 1);
}

#[test]
fn obstacles_beyond_the_ignore_cutoff_are_not_considered() {
    let mover = ship_at(0, 0.0, 0.0);
    let target = Entity::Point(Point::at(DVec2::new(7.0, 0.0)));
    // Centre distance 120 exceeds the cutoff even though the inflated disc
    // would graze the swept path.
    let looming = Entity::Planet(planet_at(0, 120.0, 0.0, 115.0));

    let course =
        course_to_point(&mover, target.position(), &[looming], Side::Right).expect("course");
    assert_eq!(course.heading, 0);
    assert_eq!(course.speed, MAX_SPEED);
}

#[test]
fn first_collision_returns_the_nearest_blocking_obstacle() {
    let mover = ship_at(0, 0.0, 0.0);
    let near = Entity::Planet(planet_at(0, 30.0, 0.0, 4.0));
    let far = Entity::Planet(planet_at(1, 60.0, 0.0, 4.0));
    let aside = Entity::Planet(planet_at(2, 30.0, 40.0, 4.0));
    let obstacles = vec![far.clone(), aside, near.clone()];

    let hit = first_collision(&mover, 1000.0, 0, &obstacles).expect("path is blocked");
    assert_eq!(hit, near);

    assert!(first_collision(&mover, 1000.0, 90, &obstacles).is_none());
}

#[test]
fn first_collision_ignores_the_mover_itself() {
    let mover = ship_at(0, 0.0, 0.0);
    let me = Entity::Ship(mover);
    assert!(first_collision(&mover, 50.0, 0, &[me]).is_none());
}

#[test]
fn decide_side_routes_away_from_the_blocker() {
    let mover = ship_at(0, 0.0, 0.0);
    let target = Entity::Point(Point::at(DVec2::new(20.0, 0.0)));

    let above = Entity::Planet(planet_at(0, 10.0, 2.0, 1.0));
    assert_eq!(decide_side(&mover, &target, &above), Side::Left);

    let below = Entity::Planet(planet_at(1, 10.0, -2.0, 1.0));
    assert_eq!(decide_side(&mover, &target, &below), Side::Right);
}
