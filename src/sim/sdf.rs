//! Implicit surface functions and ray-marching
//!
//! The rippled enclosures have no closed-form ray intersection, so they are
//! described by a scalar field that is negative inside, positive outside and
//! zero on the wall. Crossings are bracketed by fixed-step marching and then
//! refined by bisection.

use glam::DVec2;

use crate::cartesian_to_polar;
use crate::consts::{BISECTION_ITERS, GRADIENT_H, MARCH_START_OFFSET};
use crate::error::{Error, Result};

/// Radius of the axis-aligned ellipse with half-axes (a, b) at polar angle theta
#[inline]
pub fn ellipse_radius(theta: f64, a: f64, b: f64) -> f64 {
    let cx = theta.cos() / a;
    let sy = theta.sin() / b;
    1.0 / (cx * cx + sy * sy).sqrt()
}

/// Single k-lobed ripple: 1 + eps·cos(kθ)
#[inline]
pub fn ripple_factor(theta: f64, ripples: u32, epsilon: f64) -> f64 {
    1.0 + epsilon * (ripples as f64 * theta).cos()
}

/// Asymmetric multi-harmonic ripple used by the holed table
#[inline]
pub fn harmonic_factor(theta: f64, ripples: u32, epsilon: f64) -> f64 {
    let k = ripples as f64;
    let wobble = theta.sin() + 0.8 * (k * theta - 1.2).cos() - 0.5 * ((k + 1.0) * theta + 2.0).sin();
    1.0 + epsilon * wobble
}

/// Bound on |sinθ + 0.8cos(..) − 0.5sin(..)|; keeps `harmonic_factor` positive for eps below its inverse
pub const HARMONIC_AMPLITUDE: f64 = 2.3;

/// Signed surface value of a rippled ellipse centred at the origin
#[inline]
pub fn sd_rippled_curve(p: DVec2, a: f64, b: f64, ripples: u32, epsilon: f64) -> f64 {
    let (r, theta) = cartesian_to_polar(p);
    r - ellipse_radius(theta, a, b) * ripple_factor(theta, ripples, epsilon)
}

/// Signed surface value of a multi-harmonic curve centred at `center`
#[inline]
pub fn sd_harmonic_curve(p: DVec2, center: DVec2, a: f64, b: f64, ripples: u32, epsilon: f64) -> f64 {
    let (r, theta) = cartesian_to_polar(p - center);
    r - ellipse_radius(theta, a, b) * harmonic_factor(theta, ripples, epsilon)
}

/// CSG subtraction: inside `a` and outside `b`
#[inline]
pub fn sd_subtract(a: f64, b: f64) -> f64 {
    a.max(-b)
}

/// Gradient of the surface function by central differences
pub fn sdf_gradient<F>(p: DVec2, sdf: F) -> DVec2
where
    F: Fn(DVec2) -> f64,
{
    let h = GRADIENT_H;
    let dx = sdf(p + DVec2::new(h, 0.0)) - sdf(p - DVec2::new(h, 0.0));
    let dy = sdf(p + DVec2::new(0.0, h)) - sdf(p - DVec2::new(0.0, h));
    DVec2::new(dx, dy) / (2.0 * h)
}

/// Unit outward normal at a surface point
///
/// Errors when the gradient vanishes, which happens on cusps of the field.
pub fn outward_normal<F>(p: DVec2, sdf: F) -> Result<DVec2>
where
    F: Fn(DVec2) -> f64,
{
    let grad = sdf_gradient(p, sdf);
    let len = grad.length();
    if !len.is_finite() || len < 1e-12 {
        return Err(Error::Numerical(format!(
            "surface gradient vanishes at ({:.6}, {:.6})",
            p.x, p.y
        )));
    }
    Ok(grad / len)
}

/// Reflect velocity off a surface with given unit normal
#[inline]
pub fn reflect(vel: DVec2, normal: DVec2) -> DVec2 {
    vel - 2.0 * vel.dot(normal) * normal
}

/// Ray-march tuning for one boundary family
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarchParams {
    /// Distance travelled per march step
    pub step_length: f64,
    /// Steps before giving up
    pub max_steps: u32,
}

/// March along `origin + vel·t` until the surface turns positive, then bisect
///
/// Returns the crossing time, or `None` if no crossing is bracketed within
/// `max_steps`. `vel` must be non-zero.
pub fn march_crossing<F>(origin: DVec2, vel: DVec2, params: MarchParams, sdf: F) -> Option<f64>
where
    F: Fn(DVec2) -> f64,
{
    let t_step = params.step_length / vel.length();
    let mut t = MARCH_START_OFFSET;

    for _ in 0..params.max_steps {
        let t_next = t + t_step;
        if sdf(origin + vel * t_next) > 0.0 {
            return Some(bisect(origin, vel, t, t_next, &sdf));
        }
        t = t_next;
    }

    None
}

/// Shrink [lo, hi] around the sign change of the surface along the ray
fn bisect<F>(origin: DVec2, vel: DVec2, mut lo: f64, mut hi: f64, sdf: &F) -> f64
where
    F: Fn(DVec2) -> f64,
{
    for _ in 0..BISECTION_ITERS {
        let mid = 0.5 * (lo + hi);
        if sdf(origin + vel * mid) > 0.0 {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    0.5 * (lo + hi)
}
