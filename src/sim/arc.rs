//! Quarter-circle corner arcs of the rounded rectangle
//!
//! Each corner is described by its centre, radius and the quadrant it
//! occupies relative to that centre:
//! - sign_x, sign_y: +1 or -1, pointing from the centre toward the corner

use glam::DVec2;
use std::f64::consts::FRAC_PI_2;

use crate::polar_to_cartesian;

/// A quarter-circle corner arc
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerArc {
    pub center: DVec2,
    pub radius: f64,
    pub sign_x: f64,
    pub sign_y: f64,
}

impl CornerArc {
    pub fn new(center: DVec2, radius: f64, sign_x: f64, sign_y: f64) -> Self {
        Self {
            center,
            radius,
            sign_x,
            sign_y,
        }
    }

    /// The four corners of a W x H rectangle centred at the origin, counter-clockwise from top-right
    pub fn corners_of(width: f64, height: f64, radius: f64) -> [CornerArc; 4] {
        let cx = width / 2.0 - radius;
        let cy = height / 2.0 - radius;
        [
            CornerArc::new(DVec2::new(cx, cy), radius, 1.0, 1.0),
            CornerArc::new(DVec2::new(-cx, cy), radius, -1.0, 1.0),
            CornerArc::new(DVec2::new(-cx, -cy), radius, -1.0, -1.0),
            CornerArc::new(DVec2::new(cx, -cy), radius, 1.0, -1.0),
        ]
    }

    /// Check if a point lies in this corner's quadrant (with tolerance)
    pub fn in_quadrant(&self, point: DVec2, tol: f64) -> bool {
        let d = point - self.center;
        d.x * self.sign_x >= -tol && d.y * self.sign_y >= -tol
    }

    /// Both roots of |origin + vel·t - center|² = R², smallest first
    pub fn ray_roots(&self, origin: DVec2, vel: DVec2) -> Option<(f64, f64)> {
        let delta = origin - self.center;
        let a = vel.length_squared();
        if a == 0.0 {
            return None;
        }
        let b = 2.0 * vel.dot(delta);
        let c = delta.length_squared() - self.radius * self.radius;

        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            return None;
        }
        let sqrt_disc = disc.sqrt();
        Some(((-b - sqrt_disc) / (2.0 * a), (-b + sqrt_disc) / (2.0 * a)))
    }

    /// Normal at a point on the arc, pointing back toward the centre (into the table)
    pub fn inward_normal_at(&self, point: DVec2) -> DVec2 {
        ((self.center - point) / self.radius).normalize_or_zero()
    }

    /// Starting angle of the quarter arc (counter-clockwise sweep of PI/2)
    pub fn theta_start(&self) -> f64 {
        match (self.sign_x > 0.0, self.sign_y > 0.0) {
            (true, true) => 0.0,
            (false, true) => FRAC_PI_2,
            (false, false) => 2.0 * FRAC_PI_2,
            (true, false) => 3.0 * FRAC_PI_2,
        }
    }

    /// Sample points along the arc, counter-clockwise
    pub fn sample_edge(&self, num_points: usize) -> Vec<DVec2> {
        let start = self.theta_start();
        (0..num_points)
            .map(|i| {
                let t = i as f64 / (num_points - 1).max(1) as f64;
                self.center + polar_to_cartesian(self.radius, start + t * FRAC_PI_2)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corners_layout() {
        let corners = CornerArc::corners_of(16.0, 7.0, 1.5);
        assert_eq!(corners[0].center, DVec2::new(6.5, 2.0));
        assert_eq!(corners[2].center, DVec2::new(-6.5, -2.0));
        assert_eq!(corners[3].sign_x, 1.0);
        assert_eq!(corners[3].sign_y, -1.0);
    }

    #[test]
    fn test_in_quadrant() {
        let arc = CornerArc::new(DVec2::new(6.5, 2.0), 1.5, 1.0, 1.0);
        assert!(arc.in_quadrant(DVec2::new(7.5, 3.0), 1e-6));
        assert!(arc.in_quadrant(DVec2::new(6.5 - 1e-7, 3.5), 1e-6));
        assert!(!arc.in_quadrant(DVec2::new(5.0, 3.0), 1e-6));
        assert!(!arc.in_quadrant(DVec2::new(7.0, 1.0), 1e-6));
    }

    #[test]
    fn test_ray_roots_through_center() {
        let arc = CornerArc::new(DVec2::new(2.0, 0.0), 1.0, 1.0, 1.0);
        let (t1, t2) = arc.ray_roots(DVec2::ZERO, DVec2::new(2.0, 0.0)).unwrap();
        assert!((t1 - 0.5).abs() < 1e-12);
        assert!((t2 - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_ray_roots_miss() {
        let arc = CornerArc::new(DVec2::new(2.0, 5.0), 1.0, 1.0, 1.0);
        assert!(arc.ray_roots(DVec2::ZERO, DVec2::X).is_none());
    }

    #[test]
    fn test_inward_normal() {
        let arc = CornerArc::new(DVec2::new(6.5, 2.0), 1.5, 1.0, 1.0);
        let n = arc.inward_normal_at(DVec2::new(8.0, 2.0));
        assert!((n - DVec2::new(-1.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_sample_edge_endpoints() {
        let arc = CornerArc::new(DVec2::new(-6.5, 2.0), 1.5, -1.0, 1.0);
        let pts = arc.sample_edge(10);
        assert_eq!(pts.len(), 10);
        // Top-left corner sweeps from straight up to straight left
        assert!((pts[0] - DVec2::new(-6.5, 3.5)).length() < 1e-12);
        assert!((pts[9] - DVec2::new(-8.0, 2.0)).length() < 1e-12);
    }
}
