//! Ripple Billiard - a point particle bouncing inside closed 2D enclosures
//!
//! Core modules:
//! - `sim`: Deterministic collision-event engine (boundaries, solver, event log, trajectory)
//! - `trail`: Fading-trail frame sampling for external renderers
//! - `settings`: Run configuration (JSON on disk)
//! - `error`: Crate-wide error type

pub mod error;
pub mod settings;
pub mod sim;
pub mod trail;

pub use error::{Error, Result};
pub use settings::RunSettings;
pub use sim::{BoundaryConfig, Event, EventLog, Halt, evaluate, generate_events};

use glam::DVec2;

/// Engine configuration constants
pub mod consts {
    /// Minimum accepted analytic hit time (avoids re-detecting the wall just left)
    pub const EPS_TIME: f64 = 1e-9;
    /// Quadrant membership tolerance for corner arc hits
    pub const QUADRANT_TOL: f64 = 1e-6;

    /// Offset along the ray before marching starts
    pub const MARCH_START_OFFSET: f64 = 1e-5;
    /// Bisection iterations once a crossing is bracketed
    pub const BISECTION_ITERS: u32 = 45;
    /// Central difference step for the surface gradient
    pub const GRADIENT_H: f64 = 1e-6;

    /// Rippled curve: march distance per step and step budget
    pub const RIPPLED_MARCH_STEP: f64 = 0.05;
    pub const RIPPLED_MAX_STEPS: u32 = 10_000;
    /// Holed curve: tighter geometry needs finer resolution
    pub const HOLE_MARCH_STEP: f64 = 0.01;
    pub const HOLE_MAX_STEPS: u32 = 30_000;

    /// Inner hole size relative to the outer curve
    pub const HOLE_SCALE: f64 = 0.35;

    /// Default launch heading (degrees from +x)
    pub const DEFAULT_HEADING_DEG: f64 = 37.0;
    /// Default particle speed (units per second)
    pub const DEFAULT_SPEED: f64 = 6.0;

    /// Speeds below this are treated as zero
    pub const MIN_SPEED: f64 = 1e-12;
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f64, theta: f64) -> DVec2 {
    DVec2::new(r * theta.cos(), r * theta.sin())
}

/// Convert cartesian (x, y) to polar (r, theta)
#[inline]
pub fn cartesian_to_polar(pos: DVec2) -> (f64, f64) {
    (pos.length(), pos.y.atan2(pos.x))
}

/// Velocity for a launch `heading_deg` degrees from +x at the given speed
#[inline]
pub fn heading_velocity(speed: f64, heading_deg: f64) -> DVec2 {
    polar_to_cartesian(speed, heading_deg.to_radians())
}
