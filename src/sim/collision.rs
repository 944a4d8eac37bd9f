//! Hit testing and wall reflection
//!
//! Entities are squares positioned by their top-left corner. They bounce off
//! the panel edges with a plain sign flip, and are clicked through the
//! circle inscribed in their square.

use glam::Vec2;

/// Whether `point` lies within the circle of diameter `size` centred at `center`
#[inline]
pub fn hit_test(point: Vec2, center: Vec2, size: f32) -> bool {
    point.distance(center) <= size / 2.0
}

/// Reflect velocity about a surface normal
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Integrate one step inside `[0, bounds - size]` on both axes.
///
/// A coordinate that leaves the range is clamped to the edge it crossed and
/// its velocity component is negated.
pub fn reflect_in_bounds(pos: Vec2, vel: Vec2, size: f32, bounds: Vec2) -> (Vec2, Vec2) {
    let max = (bounds - Vec2::splat(size)).max(Vec2::ZERO);
    let mut pos = pos + vel;
    let mut vel = vel;

    if pos.x < 0.0 {
        pos.x = 0.0;
        vel = reflect_velocity(vel, Vec2::X);
    } else if pos.x > max.x {
        pos.x = max.x;
        vel = reflect_velocity(vel, -Vec2::X);
    }

    if pos.y < 0.0 {
        pos.y = 0.0;
        vel = reflect_velocity(vel, Vec2::Y);
    } else if pos.y > max.y {
        pos.y = max.y;
        vel = reflect_velocity(vel, -Vec2::Y);
    }

    (pos, vel)
}

/// Clamp a top-left position so an entity of `size` stays inside `bounds`
pub fn clamp_to_bounds(pos: Vec2, size: f32, bounds: Vec2) -> Vec2 {
    let max = (bounds - Vec2::splat(size)).max(Vec2::ZERO);
    pos.clamp(Vec2::ZERO, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hit_test_edge_inclusive() {
        let center = Vec2::new(25.0, 25.0);
        assert!(hit_test(center, center, 50.0));
        assert!(hit_test(Vec2::new(50.0, 25.0), center, 50.0));
        assert!(!hit_test(Vec2::new(50.1, 25.0), center, 50.0));
        // Square corner is outside the inscribed circle
        assert!(!hit_test(Vec2::new(49.0, 49.0), center, 50.0));
    }

    #[test]
    fn test_reflect_velocity() {
        let reflected = reflect_velocity(Vec2::new(3.0, -2.0), Vec2::X);
        assert!((reflected.x + 3.0).abs() < 1e-5);
        assert!((reflected.y + 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_bounce_off_right_wall() {
        let bounds = Vec2::new(600.0, 400.0);
        let (pos, vel) = reflect_in_bounds(Vec2::new(548.0, 100.0), Vec2::new(4.0, 1.0), 50.0, bounds);
        assert_eq!(pos.x, 550.0);
        assert_eq!(vel.x, -4.0);
        assert_eq!(vel.y, 1.0);
    }

    #[test]
    fn test_bounce_off_top_left_corner() {
        let bounds = Vec2::new(600.0, 400.0);
        let (pos, vel) = reflect_in_bounds(Vec2::new(1.0, 1.0), Vec2::new(-2.0, -2.0), 50.0, bounds);
        assert_eq!(pos, Vec2::ZERO);
        assert_eq!(vel, Vec2::new(2.0, 2.0));
    }

    #[test]
    fn test_clamp_to_bounds() {
        let bounds = Vec2::new(300.0, 200.0);
        let pos = clamp_to_bounds(Vec2::new(400.0, -5.0), 100.0, bounds);
        assert_eq!(pos, Vec2::new(200.0, 0.0));
    }

    proptest! {
        #[test]
        fn prop_reflection_stays_in_bounds(
            x in 0.0f32..550.0,
            y in 0.0f32..350.0,
            dx in -3.0f32..3.0,
            dy in -3.0f32..3.0,
            steps in 1usize..400,
        ) {
            let bounds = Vec2::new(600.0, 400.0);
            let size = 50.0;
            let mut pos = Vec2::new(x, y);
            let mut vel = Vec2::new(dx, dy);
            for _ in 0..steps {
                (pos, vel) = reflect_in_bounds(pos, vel, size, bounds);
                prop_assert!(pos.x >= 0.0 && pos.x <= bounds.x - size);
                prop_assert!(pos.y >= 0.0 && pos.y <= bounds.y - size);
            }
            // Speed is preserved by sign flips
            prop_assert!((vel.length() - Vec2::new(dx, dy).length()).abs() < 1e-4);
        }
    }
}
