//! Trajectory evaluation from a frozen event log
//!
//! Between events the particle moves in a straight line, so the position at
//! any time is exact: find the latest event at or before `t` and extrapolate
//! along its velocity.

use glam::DVec2;
use rayon::prelude::*;

use super::events::{Event, EventLog};

/// Latest event with `time <= t`, clamped to the start event
fn event_before(log: &EventLog, t: f64) -> &Event {
    let events = log.events();
    let idx = events.partition_point(|e| e.time <= t).saturating_sub(1);
    &events[idx]
}

/// Position at time `t`
///
/// Past the last event the final velocity is extrapolated; the result is only
/// physical up to the log's horizon.
pub fn position_at(log: &EventLog, t: f64) -> DVec2 {
    event_before(log, t).position_at(t)
}

/// Velocity in effect at time `t`
pub fn velocity_at(log: &EventLog, t: f64) -> DVec2 {
    event_before(log, t).velocity
}

/// Positions for a batch of query times, in order
pub fn evaluate(log: &EventLog, times: &[f64]) -> Vec<DVec2> {
    times.iter().map(|&t| position_at(log, t)).collect()
}

/// Same as `evaluate`, spread across the rayon pool
pub fn evaluate_par(log: &EventLog, times: &[f64]) -> Vec<DVec2> {
    times.par_iter().map(|&t| position_at(log, t)).collect()
}

/// `count` evenly spaced times over [start, end], both ends included
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count)
                .map(|i| if i == count - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}
