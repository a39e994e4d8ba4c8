//! Collision solver for the billiard boundaries
//!
//! Given the particle's position and velocity, find how long until it next
//! strikes the wall and the inward normal there. The rounded rectangle is
//! solved in closed form against its 4 walls and 4 corner arcs; the rippled
//! curves are ray-marched against their surface function.

use glam::DVec2;

use super::boundary::BoundaryConfig;
use super::sdf::{MarchParams, march_crossing, outward_normal};
use crate::consts::{EPS_TIME, MIN_SPEED, QUADRANT_TOL};
use crate::error::{Error, Result};

/// Result of a collision query
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CollisionResult {
    /// Next impact after `time`, with the unit normal pointing into the table
    Hit { time: f64, normal: DVec2 },
    /// No forward collision found
    Miss,
}

impl CollisionResult {
    pub fn is_hit(&self) -> bool {
        matches!(self, CollisionResult::Hit { .. })
    }

    pub fn time(&self) -> Option<f64> {
        match *self {
            CollisionResult::Hit { time, .. } => Some(time),
            CollisionResult::Miss => None,
        }
    }
}

/// Find the next boundary impact for a particle at `pos` moving with `vel`
///
/// Errors on zero or non-finite velocity and on a vanishing surface gradient
/// at the hit point; a `Miss` is not an error.
pub fn next_collision(boundary: &BoundaryConfig, pos: DVec2, vel: DVec2) -> Result<CollisionResult> {
    solve(boundary, pos, vel, boundary.march_params())
}

/// Same as `next_collision` but marching implicit tables with caller-supplied tuning
///
/// The rounded rectangle is analytic and ignores `march`.
pub fn next_collision_with(
    boundary: &BoundaryConfig,
    pos: DVec2,
    vel: DVec2,
    march: MarchParams,
) -> Result<CollisionResult> {
    let march = boundary.march_params().map(|_| march);
    solve(boundary, pos, vel, march)
}

fn solve(
    boundary: &BoundaryConfig,
    pos: DVec2,
    vel: DVec2,
    march: Option<MarchParams>,
) -> Result<CollisionResult> {
    if !pos.is_finite() || !vel.is_finite() {
        return Err(Error::Numerical(format!(
            "non-finite particle state: pos={pos:?} vel={vel:?}"
        )));
    }
    if vel.length() < MIN_SPEED {
        return Err(Error::Numerical(format!(
            "velocity too small to trace a ray: {vel:?}"
        )));
    }

    match march {
        None => Ok(rounded_rectangle_collision(boundary, pos, vel)),
        Some(params) => implicit_collision(boundary, pos, vel, params),
    }
}

/// Closed-form ray cast against straight walls and corner arcs; smallest t wins
fn rounded_rectangle_collision(boundary: &BoundaryConfig, pos: DVec2, vel: DVec2) -> CollisionResult {
    let mut best = CollisionResult::Miss;
    let mut t_min = f64::INFINITY;

    for wall in boundary.walls() {
        let v = vel[wall.axis];
        // Only the wall we are heading toward on this axis
        if v == 0.0 || wall.coord.signum() != v.signum() {
            continue;
        }
        let t = (wall.coord - pos[wall.axis]) / v;
        let across = pos[1 - wall.axis] + vel[1 - wall.axis] * t;
        if t > EPS_TIME && across.abs() <= wall.half_span && t < t_min {
            t_min = t;
            best = CollisionResult::Hit {
                time: t,
                normal: wall.normal,
            };
        }
    }

    for arc in boundary.corners() {
        let Some((t1, t2)) = arc.ray_roots(pos, vel) else {
            continue;
        };
        for t in [t1, t2] {
            if t > EPS_TIME && t < t_min {
                let hit = pos + vel * t;
                if arc.in_quadrant(hit, QUADRANT_TOL) {
                    t_min = t;
                    best = CollisionResult::Hit {
                        time: t,
                        normal: arc.inward_normal_at(hit),
                    };
                }
            }
        }
    }

    best
}

/// Ray-march the surface function, bisect the crossing, flip the gradient inward
fn implicit_collision(
    boundary: &BoundaryConfig,
    pos: DVec2,
    vel: DVec2,
    params: MarchParams,
) -> Result<CollisionResult> {
    let sdf = |p: DVec2| boundary.surface(p);
    let Some(t_hit) = march_crossing(pos, vel, params, sdf) else {
        return Ok(CollisionResult::Miss);
    };

    let hit = pos + vel * t_hit;
    let normal = -outward_normal(hit, sdf)?;
    Ok(CollisionResult::Hit {
        time: t_hit,
        normal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heading_velocity;

    fn table() -> BoundaryConfig {
        BoundaryConfig::rounded_rectangle(16.0, 7.0, 1.5).unwrap()
    }

    fn hit(result: CollisionResult) -> (f64, DVec2) {
        match result {
            CollisionResult::Hit { time, normal } => (time, normal),
            CollisionResult::Miss => panic!("expected a hit"),
        }
    }

    #[test]
    fn test_first_hit_top_wall_at_37_degrees() {
        // Right wall would be reached at y ~ 6.03, beyond its straight span of |y| <= 2
        let vel = heading_velocity(6.0, 37.0);
        let (t, n) = hit(next_collision(&table(), DVec2::ZERO, vel).unwrap());
        let expected = 3.5 / (6.0 * 37.0_f64.to_radians().sin());
        assert!((t - expected).abs() < 1e-12);
        assert_eq!(n, DVec2::new(0.0, -1.0));
    }

    #[test]
    fn test_first_hit_right_wall_at_10_degrees() {
        let vel = heading_velocity(6.0, 10.0);
        let (t, n) = hit(next_collision(&table(), DVec2::ZERO, vel).unwrap());
        let expected = 8.0 / (6.0 * 10.0_f64.to_radians().cos());
        assert!((t - expected).abs() < 1e-12);
        assert_eq!(n, DVec2::new(-1.0, 0.0));
        // Vertical hit point inside the straight span
        assert!((vel.y * t).abs() <= 2.0);
    }

    #[test]
    fn test_corner_hit() {
        let pos = DVec2::new(6.5, 2.0);
        let vel = DVec2::new(1.0, 1.0);
        let (t, n) = hit(next_collision(&table(), pos, vel).unwrap());
        assert!((t - 1.5 / 2.0_f64.sqrt()).abs() < 1e-12);
        let expected = -DVec2::new(1.0, 1.0).normalize();
        assert!((n - expected).length() < 1e-12);
    }

    #[test]
    fn test_sharp_corner_walls_cover_full_side() {
        let sharp = BoundaryConfig::rounded_rectangle(16.0, 7.0, 0.0).unwrap();
        // Would hit the 1.5 arc on the rounded table; here the right wall takes it
        let pos = DVec2::new(6.5, 2.0);
        let vel = DVec2::new(1.0, 0.9);
        let (t, n) = hit(next_collision(&sharp, pos, vel).unwrap());
        assert!((t - 1.5).abs() < 1e-12);
        assert_eq!(n, DVec2::new(-1.0, 0.0));
    }

    #[test]
    fn test_wall_just_left_is_ignored() {
        // Sitting on the right wall moving back in
        let pos = DVec2::new(8.0, 0.0);
        let vel = DVec2::new(-1.0, 0.0);
        let (t, n) = hit(next_collision(&table(), pos, vel).unwrap());
        assert!((t - 16.0).abs() < 1e-12);
        assert_eq!(n, DVec2::new(1.0, 0.0));
    }

    #[test]
    fn test_zero_velocity_rejected() {
        assert!(matches!(
            next_collision(&table(), DVec2::ZERO, DVec2::ZERO),
            Err(Error::Numerical(_))
        ));
        assert!(matches!(
            next_collision(&table(), DVec2::ZERO, DVec2::new(f64::NAN, 1.0)),
            Err(Error::Numerical(_))
        ));
    }

    #[test]
    fn test_implicit_circle_hit() {
        // eps = 0 and W = H turns the rippled curve into a unit circle
        let circle = BoundaryConfig::rippled_curve(2.0, 2.0, 3, 0.0).unwrap();
        let (t, n) = hit(next_collision(&circle, DVec2::ZERO, DVec2::new(2.0, 0.0)).unwrap());
        assert!((t - 0.5).abs() < 1e-10);
        assert!((n - DVec2::new(-1.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_implicit_hit_lands_on_wall() {
        let curve = BoundaryConfig::rippled_curve(22.0, 14.0, 5, 0.5).unwrap();
        let vel = heading_velocity(6.0, 37.0);
        let (t, n) = hit(next_collision(&curve, DVec2::ZERO, vel).unwrap());
        let p = vel * t;
        assert!(curve.surface(p).abs() < 1e-9);
        assert!((n.length() - 1.0).abs() < 1e-12);
        // Inward normal opposes the outgoing direction
        assert!(n.dot(vel) < 0.0);
    }

    #[test]
    fn test_hole_hit_from_start() {
        let holed = BoundaryConfig::rippled_curve_with_hole(22.0, 14.0, 4, 0.2).unwrap();
        let start = holed.start_position();

        // Straight at the hole: hits its left flank, normal points back out of the hole
        let (t, n) = hit(next_collision(&holed, start, DVec2::new(1.0, 0.0)).unwrap());
        let p = start + DVec2::new(t, 0.0);
        assert!(p.x < holed.hole_center().x);
        assert!(n.x < 0.0);
        assert!(holed.surface(p).abs() < 1e-9);

        // Away from the hole: hits the outer wall
        let (t, n) = hit(next_collision(&holed, start, DVec2::new(-1.0, 0.0)).unwrap());
        let p = start - DVec2::new(t, 0.0);
        assert!(p.x < -11.0);
        assert!(n.x > 0.0);
    }

    #[test]
    fn test_march_budget_exhausted_is_miss() {
        let curve = BoundaryConfig::rippled_curve(22.0, 14.0, 5, 0.5).unwrap();
        let params = MarchParams {
            step_length: 0.05,
            max_steps: 3,
        };
        let result = next_collision_with(&curve, DVec2::ZERO, DVec2::X, params).unwrap();
        assert_eq!(result, CollisionResult::Miss);
        assert!(!result.is_hit());
        assert_eq!(result.time(), None);
    }

    #[test]
    fn test_march_override_ignored_by_rectangle() {
        let params = MarchParams {
            step_length: 0.05,
            max_steps: 1,
        };
        let result = next_collision_with(&table(), DVec2::ZERO, DVec2::X, params).unwrap();
        assert_eq!(result.time(), Some(8.0));
    }
}
