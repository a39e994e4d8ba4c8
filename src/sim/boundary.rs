//! Enclosure shapes
//!
//! A billiard table is one of three closed boundaries, all centred at the
//! origin. The rounded rectangle is handled analytically (walls + corner
//! arcs); the rippled curves only expose an implicit surface function and
//! are ray-marched by the collision solver.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use super::arc::CornerArc;
use super::sdf::{
    HARMONIC_AMPLITUDE, MarchParams, ellipse_radius, harmonic_factor, ripple_factor,
    sd_harmonic_curve, sd_rippled_curve, sd_subtract,
};
use crate::consts::*;
use crate::error::{Error, Result};
use crate::polar_to_cartesian;

/// Boundary family, without parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryKind {
    RoundedRectangle,
    RippledCurve,
    RippledCurveWithHole,
}

impl BoundaryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoundaryKind::RoundedRectangle => "rounded_rectangle",
            BoundaryKind::RippledCurve => "rippled_curve",
            BoundaryKind::RippledCurveWithHole => "rippled_curve_with_hole",
        }
    }
}

/// Immutable description of the enclosure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoundaryConfig {
    /// W x H rectangle with quarter-circle corners of radius R
    RoundedRectangle {
        width: f64,
        height: f64,
        corner_radius: f64,
    },
    /// Ellipse with half-axes (W/2, H/2) modulated by 1 + eps·cos(kθ)
    RippledCurve {
        width: f64,
        height: f64,
        ripples: u32,
        epsilon: f64,
    },
    /// Multi-harmonic rippled ellipse minus a 35% copy of itself centred at `hole_offset`
    RippledCurveWithHole {
        width: f64,
        height: f64,
        ripples: u32,
        epsilon: f64,
        /// Hole centre; defaults to (0.2·W/2, 0.1·H/2)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        hole_offset: Option<DVec2>,
    },
}

/// A straight wall segment of the rounded rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StraightWall {
    /// 0 for a wall at constant x, 1 for constant y
    pub axis: usize,
    /// Wall coordinate along `axis`
    pub coord: f64,
    /// Half-length of the straight part along the other axis
    pub half_span: f64,
    /// Unit normal pointing into the table
    pub normal: DVec2,
}

impl BoundaryConfig {
    /// Validated rounded rectangle
    pub fn rounded_rectangle(width: f64, height: f64, corner_radius: f64) -> Result<Self> {
        let cfg = BoundaryConfig::RoundedRectangle {
            width,
            height,
            corner_radius,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validated rippled ellipse
    pub fn rippled_curve(width: f64, height: f64, ripples: u32, epsilon: f64) -> Result<Self> {
        let cfg = BoundaryConfig::RippledCurve {
            width,
            height,
            ripples,
            epsilon,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validated rippled ellipse with hole (default hole placement)
    pub fn rippled_curve_with_hole(
        width: f64,
        height: f64,
        ripples: u32,
        epsilon: f64,
    ) -> Result<Self> {
        let cfg = BoundaryConfig::RippledCurveWithHole {
            width,
            height,
            ripples,
            epsilon,
            hole_offset: None,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Same as `rippled_curve_with_hole` but with an explicit hole centre
    pub fn with_hole_offset(self, offset: DVec2) -> Result<Self> {
        match self {
            BoundaryConfig::RippledCurveWithHole {
                width,
                height,
                ripples,
                epsilon,
                ..
            } => {
                let cfg = BoundaryConfig::RippledCurveWithHole {
                    width,
                    height,
                    ripples,
                    epsilon,
                    hole_offset: Some(offset),
                };
                cfg.validate()?;
                Ok(cfg)
            }
            _ => Err(Error::InvalidConfig(format!(
                "{} has no hole to offset",
                self.kind().as_str()
            ))),
        }
    }

    pub fn kind(&self) -> BoundaryKind {
        match self {
            BoundaryConfig::RoundedRectangle { .. } => BoundaryKind::RoundedRectangle,
            BoundaryConfig::RippledCurve { .. } => BoundaryKind::RippledCurve,
            BoundaryConfig::RippledCurveWithHole { .. } => BoundaryKind::RippledCurveWithHole,
        }
    }

    pub fn width(&self) -> f64 {
        match *self {
            BoundaryConfig::RoundedRectangle { width, .. }
            | BoundaryConfig::RippledCurve { width, .. }
            | BoundaryConfig::RippledCurveWithHole { width, .. } => width,
        }
    }

    pub fn height(&self) -> f64 {
        match *self {
            BoundaryConfig::RoundedRectangle { height, .. }
            | BoundaryConfig::RippledCurve { height, .. }
            | BoundaryConfig::RippledCurveWithHole { height, .. } => height,
        }
    }

    /// Reject shapes the engine cannot simulate
    pub fn validate(&self) -> Result<()> {
        let (w, h) = (self.width(), self.height());
        if !(w.is_finite() && w > 0.0 && h.is_finite() && h > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "width and height must be finite and > 0 (got {w} x {h})"
            )));
        }

        match *self {
            BoundaryConfig::RoundedRectangle { corner_radius, .. } => {
                let limit = w.min(h) / 2.0;
                if !corner_radius.is_finite() || corner_radius < 0.0 || corner_radius >= limit {
                    return Err(Error::InvalidConfig(format!(
                        "corner radius must satisfy 0 <= R < min(width, height)/2 = {limit} (got {corner_radius})"
                    )));
                }
            }
            BoundaryConfig::RippledCurve { epsilon, .. } => {
                if !epsilon.is_finite() || !(0.0..1.0).contains(&epsilon) {
                    return Err(Error::InvalidConfig(format!(
                        "ripple amplitude must lie in [0, 1) (got {epsilon})"
                    )));
                }
            }
            BoundaryConfig::RippledCurveWithHole { epsilon, .. } => {
                let limit = 1.0 / HARMONIC_AMPLITUDE;
                if !epsilon.is_finite() || !(0.0..limit).contains(&epsilon) {
                    return Err(Error::InvalidConfig(format!(
                        "ripple amplitude must lie in [0, {limit:.4}) for the holed table (got {epsilon})"
                    )));
                }
                let center = self.hole_center();
                if !center.is_finite() {
                    return Err(Error::InvalidConfig("hole offset must be finite".into()));
                }
                if let Some(outline) = self.hole_outline(720) {
                    if let Some(p) = outline.iter().find(|p| self.outer_surface(**p) >= 0.0) {
                        return Err(Error::InvalidConfig(format!(
                            "hole reaches the outer wall near ({:.3}, {:.3})",
                            p.x, p.y
                        )));
                    }
                }
            }
        }

        let start = self.start_position();
        if !self.contains(start, 0.0) || self.surface(start) >= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "start position ({:.3}, {:.3}) is not inside the playable region",
                start.x, start.y
            )));
        }
        Ok(())
    }

    /// Centre of the inner hole (origin for hole-free tables)
    pub fn hole_center(&self) -> DVec2 {
        match *self {
            BoundaryConfig::RippledCurveWithHole {
                width,
                height,
                hole_offset,
                ..
            } => hole_offset.unwrap_or(DVec2::new(0.2 * width / 2.0, 0.1 * height / 2.0)),
            _ => DVec2::ZERO,
        }
    }

    /// Fixed launch point: origin for convex tables, left of the hole otherwise
    pub fn start_position(&self) -> DVec2 {
        match *self {
            BoundaryConfig::RippledCurveWithHole { width, .. } => DVec2::new(-width / 4.0, 0.0),
            _ => DVec2::ZERO,
        }
    }

    /// Ray-march tuning (`None` for the analytic rectangle)
    pub fn march_params(&self) -> Option<MarchParams> {
        match self {
            BoundaryConfig::RoundedRectangle { .. } => None,
            BoundaryConfig::RippledCurve { .. } => Some(MarchParams {
                step_length: RIPPLED_MARCH_STEP,
                max_steps: RIPPLED_MAX_STEPS,
            }),
            BoundaryConfig::RippledCurveWithHole { .. } => Some(MarchParams {
                step_length: HOLE_MARCH_STEP,
                max_steps: HOLE_MAX_STEPS,
            }),
        }
    }

    /// Outer wall only, ignoring any hole
    fn outer_surface(&self, p: DVec2) -> f64 {
        match *self {
            BoundaryConfig::RoundedRectangle {
                width,
                height,
                corner_radius,
            } => {
                // Rounded box distance
                let inner = DVec2::new(width / 2.0, height / 2.0) - DVec2::splat(corner_radius);
                let q = p.abs() - inner;
                q.max(DVec2::ZERO).length() + q.x.max(q.y).min(0.0) - corner_radius
            }
            BoundaryConfig::RippledCurve {
                width,
                height,
                ripples,
                epsilon,
            } => sd_rippled_curve(p, width / 2.0, height / 2.0, ripples, epsilon),
            BoundaryConfig::RippledCurveWithHole {
                width,
                height,
                ripples,
                epsilon,
                ..
            } => sd_harmonic_curve(p, DVec2::ZERO, width / 2.0, height / 2.0, ripples, epsilon),
        }
    }

    /// Surface function of the hole alone (negative inside the hole)
    fn hole_surface(&self, p: DVec2) -> Option<f64> {
        match *self {
            BoundaryConfig::RippledCurveWithHole {
                width,
                height,
                ripples,
                epsilon,
                ..
            } => Some(sd_harmonic_curve(
                p,
                self.hole_center(),
                HOLE_SCALE * width / 2.0,
                HOLE_SCALE * height / 2.0,
                ripples,
                epsilon,
            )),
            _ => None,
        }
    }

    /// Playable-region surface function: < 0 inside, > 0 outside, 0 on the wall
    pub fn surface(&self, p: DVec2) -> f64 {
        let outer = self.outer_surface(p);
        match self.hole_surface(p) {
            Some(hole) => sd_subtract(outer, hole),
            None => outer,
        }
    }

    /// Membership test with tolerance; the rectangle is checked against its walls and arcs directly
    pub fn contains(&self, p: DVec2, tol: f64) -> bool {
        match *self {
            BoundaryConfig::RoundedRectangle {
                width,
                height,
                corner_radius,
            } => {
                let (hw, hh) = (width / 2.0, height / 2.0);
                if p.x.abs() > hw + tol || p.y.abs() > hh + tol {
                    return false;
                }
                // Inside the cross formed by the straight spans
                if p.x.abs() <= hw - corner_radius || p.y.abs() <= hh - corner_radius {
                    return true;
                }
                let corner = DVec2::new(
                    (hw - corner_radius).copysign(p.x),
                    (hh - corner_radius).copysign(p.y),
                );
                p.distance(corner) <= corner_radius + tol
            }
            _ => self.surface(p) <= tol,
        }
    }

    /// True when `p` lies inside the hole (always false for hole-free tables)
    pub fn in_hole(&self, p: DVec2, tol: f64) -> bool {
        self.hole_surface(p).is_some_and(|s| s < -tol)
    }

    /// The four straight walls of the rounded rectangle (empty for other tables)
    pub fn walls(&self) -> Vec<StraightWall> {
        match *self {
            BoundaryConfig::RoundedRectangle {
                width,
                height,
                corner_radius,
            } => {
                let (hw, hh) = (width / 2.0, height / 2.0);
                vec![
                    StraightWall {
                        axis: 0,
                        coord: hw,
                        half_span: hh - corner_radius,
                        normal: DVec2::new(-1.0, 0.0),
                    },
                    StraightWall {
                        axis: 0,
                        coord: -hw,
                        half_span: hh - corner_radius,
                        normal: DVec2::new(1.0, 0.0),
                    },
                    StraightWall {
                        axis: 1,
                        coord: hh,
                        half_span: hw - corner_radius,
                        normal: DVec2::new(0.0, -1.0),
                    },
                    StraightWall {
                        axis: 1,
                        coord: -hh,
                        half_span: hw - corner_radius,
                        normal: DVec2::new(0.0, 1.0),
                    },
                ]
            }
            _ => Vec::new(),
        }
    }

    /// The four corner arcs of the rounded rectangle
    ///
    /// Empty for other tables and for sharp corners (R = 0), where the walls
    /// span the full sides.
    pub fn corners(&self) -> Vec<CornerArc> {
        match *self {
            BoundaryConfig::RoundedRectangle {
                width,
                height,
                corner_radius,
            } if corner_radius > 0.0 => CornerArc::corners_of(width, height, corner_radius).to_vec(),
            _ => Vec::new(),
        }
    }

    /// Closed polyline of the outer wall for drawing
    pub fn outline(&self, samples: usize) -> Vec<DVec2> {
        let samples = samples.max(8);
        match *self {
            BoundaryConfig::RoundedRectangle {
                width,
                height,
                corner_radius,
            } => {
                // A sharp corner collapses to its single vertex
                let per_arc = if corner_radius > 0.0 {
                    (samples / 4).max(2)
                } else {
                    1
                };
                let mut pts: Vec<DVec2> = CornerArc::corners_of(width, height, corner_radius)
                    .iter()
                    .flat_map(|arc| arc.sample_edge(per_arc))
                    .collect();
                if let Some(first) = pts.first().copied() {
                    pts.push(first);
                }
                pts
            }
            BoundaryConfig::RippledCurve {
                width,
                height,
                ripples,
                epsilon,
            } => sample_polar(samples, DVec2::ZERO, |theta| {
                ellipse_radius(theta, width / 2.0, height / 2.0) * ripple_factor(theta, ripples, epsilon)
            }),
            BoundaryConfig::RippledCurveWithHole {
                width,
                height,
                ripples,
                epsilon,
                ..
            } => sample_polar(samples, DVec2::ZERO, |theta| {
                ellipse_radius(theta, width / 2.0, height / 2.0) * harmonic_factor(theta, ripples, epsilon)
            }),
        }
    }

    /// Closed polyline of the hole, if any
    pub fn hole_outline(&self, samples: usize) -> Option<Vec<DVec2>> {
        match *self {
            BoundaryConfig::RippledCurveWithHole {
                width,
                height,
                ripples,
                epsilon,
                ..
            } => {
                let (a, b) = (HOLE_SCALE * width / 2.0, HOLE_SCALE * height / 2.0);
                Some(sample_polar(samples.max(8), self.hole_center(), |theta| {
                    ellipse_radius(theta, a, b) * harmonic_factor(theta, ripples, epsilon)
                }))
            }
            _ => None,
        }
    }

    /// Half-extents of a view that fits the table, padded by the ripple margin W·eps
    pub fn view_extent(&self) -> DVec2 {
        let half = DVec2::new(self.width() / 2.0, self.height() / 2.0);
        match *self {
            BoundaryConfig::RoundedRectangle { .. } => half,
            BoundaryConfig::RippledCurve { width, epsilon, .. }
            | BoundaryConfig::RippledCurveWithHole { width, epsilon, .. } => {
                half + DVec2::splat(width * epsilon)
            }
        }
    }
}

/// Sample r(θ) over a full turn, first and last point coinciding
fn sample_polar<F>(samples: usize, center: DVec2, radius: F) -> Vec<DVec2>
where
    F: Fn(f64) -> f64,
{
    (0..samples)
        .map(|i| {
            let theta = TAU * i as f64 / (samples - 1) as f64;
            center + polar_to_cartesian(radius(theta), theta)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounded_rectangle_validation() {
        assert!(BoundaryConfig::rounded_rectangle(16.0, 7.0, 1.5).is_ok());
        // R must stay below half the shorter side
        assert!(BoundaryConfig::rounded_rectangle(16.0, 7.0, 3.5).is_err());
        // Sharp corners are allowed
        assert!(BoundaryConfig::rounded_rectangle(16.0, 7.0, 0.0).is_ok());
        assert!(BoundaryConfig::rounded_rectangle(16.0, 7.0, -0.1).is_err());
        assert!(BoundaryConfig::rounded_rectangle(-1.0, 7.0, 1.0).is_err());
        assert!(BoundaryConfig::rounded_rectangle(16.0, f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_rippled_validation() {
        assert!(BoundaryConfig::rippled_curve(22.0, 14.0, 5, 0.5).is_ok());
        assert!(BoundaryConfig::rippled_curve(22.0, 14.0, 5, 0.0).is_ok());
        assert!(BoundaryConfig::rippled_curve(22.0, 14.0, 5, 1.0).is_err());
        assert!(BoundaryConfig::rippled_curve(22.0, 14.0, 5, -0.1).is_err());
    }

    #[test]
    fn test_hole_validation() {
        assert!(BoundaryConfig::rippled_curve_with_hole(22.0, 14.0, 4, 0.2).is_ok());
        // Amplitude large enough to turn the radius negative
        assert!(BoundaryConfig::rippled_curve_with_hole(22.0, 14.0, 4, 0.5).is_err());
        // Hole pushed through the outer wall
        let far = BoundaryConfig::rippled_curve_with_hole(22.0, 14.0, 4, 0.2)
            .and_then(|b| b.with_hole_offset(DVec2::new(9.0, 0.0)));
        assert!(far.is_err());
        // Hole swallowing the start position
        let covering = BoundaryConfig::rippled_curve_with_hole(22.0, 14.0, 4, 0.2)
            .and_then(|b| b.with_hole_offset(DVec2::new(-5.5, 0.0)));
        assert!(covering.is_err());
    }

    #[test]
    fn test_offset_rejected_without_hole() {
        let b = BoundaryConfig::rippled_curve(22.0, 14.0, 5, 0.5).unwrap();
        assert!(b.with_hole_offset(DVec2::ONE).is_err());
    }

    #[test]
    fn test_rectangle_contains() {
        let b = BoundaryConfig::rounded_rectangle(16.0, 7.0, 1.5).unwrap();
        assert!(b.contains(DVec2::ZERO, 0.0));
        assert!(b.contains(DVec2::new(8.0, 0.0), 0.0));
        assert!(b.contains(DVec2::new(0.0, -3.5), 0.0));
        // Square corner is cut away by the arc
        assert!(!b.contains(DVec2::new(7.9, 3.4), 1e-6));
        assert!(!b.contains(DVec2::new(8.1, 0.0), 1e-6));
        // Point on the corner arc itself
        let on_arc = DVec2::new(6.5, 2.0) + DVec2::new(1.0, 1.0).normalize() * 1.5;
        assert!(b.contains(on_arc, 1e-9));
    }

    #[test]
    fn test_rectangle_surface_matches_contains() {
        let b = BoundaryConfig::rounded_rectangle(16.0, 7.0, 1.5).unwrap();
        for p in [
            DVec2::ZERO,
            DVec2::new(7.9, 3.4),
            DVec2::new(-7.0, 2.9),
            DVec2::new(3.0, -3.6),
            DVec2::new(-7.5, -2.0),
        ] {
            assert_eq!(b.surface(p) <= 0.0, b.contains(p, 0.0), "mismatch at {p:?}");
        }
    }

    #[test]
    fn test_hole_surface_sign() {
        let b = BoundaryConfig::rippled_curve_with_hole(22.0, 14.0, 4, 0.2).unwrap();
        assert!(b.surface(b.start_position()) < 0.0);
        assert!(b.surface(b.hole_center()) > 0.0);
        assert!(b.in_hole(b.hole_center(), 0.0));
        assert!(!b.in_hole(b.start_position(), 0.0));
        assert!(b.surface(DVec2::new(30.0, 0.0)) > 0.0);
    }

    #[test]
    fn test_walls_and_corners() {
        let b = BoundaryConfig::rounded_rectangle(16.0, 7.0, 1.5).unwrap();
        let walls = b.walls();
        assert_eq!(walls.len(), 4);
        assert_eq!(walls[0].half_span, 2.0);
        assert_eq!(walls[2].half_span, 6.5);
        assert_eq!(b.corners().len(), 4);

        let curve = BoundaryConfig::rippled_curve(22.0, 14.0, 5, 0.5).unwrap();
        assert!(curve.walls().is_empty());
        assert!(curve.corners().is_empty());
    }

    #[test]
    fn test_sharp_corners() {
        let b = BoundaryConfig::rounded_rectangle(16.0, 7.0, 0.0).unwrap();
        assert!(b.corners().is_empty());
        let walls = b.walls();
        assert_eq!(walls[0].half_span, 3.5);
        assert_eq!(walls[2].half_span, 8.0);
        assert!(b.contains(DVec2::new(8.0, 3.5), 0.0));
        assert!(!b.contains(DVec2::new(8.0, 3.6), 1e-6));
        assert_eq!(b.surface(DVec2::new(8.0, 3.5)), 0.0);

        let pts = b.outline(200);
        assert_eq!(
            pts,
            vec![
                DVec2::new(8.0, 3.5),
                DVec2::new(-8.0, 3.5),
                DVec2::new(-8.0, -3.5),
                DVec2::new(8.0, -3.5),
                DVec2::new(8.0, 3.5),
            ]
        );
    }

    #[test]
    fn test_outline_lies_on_wall() {
        for b in [
            BoundaryConfig::rounded_rectangle(16.0, 7.0, 1.5).unwrap(),
            BoundaryConfig::rippled_curve(22.0, 14.0, 5, 0.5).unwrap(),
            BoundaryConfig::rippled_curve_with_hole(22.0, 14.0, 4, 0.2).unwrap(),
        ] {
            let pts = b.outline(200);
            assert!((pts[0] - pts[pts.len() - 1]).length() < 1e-9);
            for p in &pts {
                assert!(b.outer_surface(*p).abs() < 1e-9, "{:?} off the wall at {p:?}", b.kind());
            }
        }
    }

    #[test]
    fn test_hole_outline() {
        let b = BoundaryConfig::rippled_curve_with_hole(22.0, 14.0, 4, 0.2).unwrap();
        let pts = b.hole_outline(100).unwrap();
        assert_eq!(pts.len(), 100);
        for p in &pts {
            assert!(b.hole_surface(*p).unwrap().abs() < 1e-9);
        }
        let rect = BoundaryConfig::rounded_rectangle(16.0, 7.0, 1.5).unwrap();
        assert!(rect.hole_outline(100).is_none());
    }

    #[test]
    fn test_view_extent() {
        let rect = BoundaryConfig::rounded_rectangle(16.0, 7.0, 1.5).unwrap();
        assert_eq!(rect.view_extent(), DVec2::new(8.0, 3.5));
        let curve = BoundaryConfig::rippled_curve(22.0, 14.0, 5, 0.5).unwrap();
        assert_eq!(curve.view_extent(), DVec2::new(22.0, 18.0));
    }

    #[test]
    fn test_serde_tagged() {
        let b = BoundaryConfig::rippled_curve(22.0, 14.0, 5, 0.5).unwrap();
        let json = serde_json::to_string(&b).unwrap();
        assert!(json.contains("\"kind\":\"rippled_curve\""));
        let parsed: BoundaryConfig = serde_json::from_str(
            r#"{"kind":"rippled_curve_with_hole","width":22.0,"height":14.0,"ripples":4,"epsilon":0.2}"#,
        )
        .unwrap();
        assert_eq!(parsed.kind(), BoundaryKind::RippledCurveWithHole);
        assert!((parsed.hole_center() - DVec2::new(2.2, 0.7)).length() < 1e-12);
    }
}
