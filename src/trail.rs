//! Fading-trail frame sampling
//!
//! Turns an event log into per-frame polylines for an external renderer:
//! the trail covers the last `trail_secs` seconds, each segment carries an
//! opacity that ramps quadratically from transparent (tail) to opaque (head).

use glam::DVec2;
use rayon::prelude::*;
use serde::Serialize;

use crate::settings::RunSettings;
use crate::sim::{EventLog, evaluate, linspace};

/// Trail colour (#5ba4f6)
pub const TRAIL_COLOR: [f32; 3] = [0.357, 0.643, 0.965];
/// Head marker colour (#8ec5ff)
pub const HEAD_COLOR: [f32; 3] = [0.557, 0.773, 1.0];
/// Boundary stroke colour (#d0d7de)
pub const BOUNDARY_COLOR: [f32; 3] = [0.816, 0.843, 0.871];

/// Samples per trail: two per frame covered by the trail, at least 2
pub fn trail_resolution(trail_secs: f64, fps: u32) -> usize {
    ((trail_secs * fps as f64 * 2.0) as usize).max(2)
}

/// Opacity per segment for a trail of `points` samples, oldest first
pub fn fade_alphas(points: usize) -> Vec<f32> {
    let segments = points.saturating_sub(1);
    linspace(0.0, 1.0, segments)
        .into_iter()
        .map(|a| (a * a) as f32)
        .collect()
}

/// One animation frame
#[derive(Debug, Clone, Serialize)]
pub struct TrailFrame {
    pub index: u32,
    pub time: f64,
    /// Trail samples, oldest first; the last one is the head
    pub points: Vec<DVec2>,
    /// Opacity of the segment from points[i] to points[i + 1]
    pub alphas: Vec<f32>,
}

impl TrailFrame {
    /// Current particle position
    pub fn head(&self) -> DVec2 {
        self.points.last().copied().unwrap_or(DVec2::ZERO)
    }

    /// Line segments with their opacity
    pub fn segments(&self) -> impl Iterator<Item = (DVec2, DVec2, f32)> + '_ {
        self.points
            .windows(2)
            .zip(&self.alphas)
            .map(|(w, &alpha)| (w[0], w[1], alpha))
    }
}

/// Trail sampler bound to one run
#[derive(Debug, Clone)]
pub struct TrailSampler {
    fps: u32,
    trail_secs: f64,
    resolution: usize,
    alphas: Vec<f32>,
}

impl TrailSampler {
    pub fn new(fps: u32, trail_secs: f64) -> Self {
        let resolution = trail_resolution(trail_secs, fps);
        Self {
            fps,
            trail_secs,
            resolution,
            alphas: fade_alphas(resolution),
        }
    }

    pub fn from_settings(settings: &RunSettings) -> Self {
        Self::new(settings.fps, settings.trail_secs)
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Sample the trail ending at frame `index`
    pub fn frame(&self, log: &EventLog, index: u32) -> TrailFrame {
        let time = index as f64 / self.fps as f64;
        let start = (time - self.trail_secs).max(0.0);
        let times = linspace(start, time, self.resolution);
        TrailFrame {
            index,
            time,
            points: evaluate(log, &times),
            alphas: self.alphas.clone(),
        }
    }

    /// Sample frames [0, count) in parallel; frames are independent reads of the log
    pub fn frames_par(&self, log: &EventLog, count: u32) -> Vec<TrailFrame> {
        (0..count)
            .into_par_iter()
            .map(|i| self.frame(log, i))
            .collect()
    }
}
