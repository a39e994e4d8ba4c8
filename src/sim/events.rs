//! Event generation
//!
//! Walks the particle from collision to collision, recording one event at
//! the start and one per bounce. Motion between events is a straight line,
//! so the log alone reconstructs the full trajectory.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::boundary::BoundaryConfig;
use super::collision::{CollisionResult, next_collision, next_collision_with};
use super::sdf::{MarchParams, reflect};
use crate::consts::{DEFAULT_HEADING_DEG, MIN_SPEED};
use crate::error::{Error, Result};
use crate::heading_velocity;

/// Particle state at the start of the run or just after a bounce
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub time: f64,
    pub position: DVec2,
    /// Velocity after the bounce, held until the next event
    pub velocity: DVec2,
}

impl Event {
    /// Position at time `t` assuming no further collision
    #[inline]
    pub fn position_at(&self, t: f64) -> DVec2 {
        self.position + self.velocity * (t - self.time)
    }
}

/// Why generation stopped
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Halt {
    /// Accumulated time reached the requested horizon
    HorizonReached,
    /// The solver found no forward collision from this state; the log is truncated
    NoCollision {
        time: f64,
        position: DVec2,
        velocity: DVec2,
    },
}

/// Generator phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeneratorPhase {
    Running,
    Halted(Halt),
}

/// Ordered, non-empty record of a finished run
///
/// Only the generator builds one; afterwards it is read-only and can be
/// shared between threads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventLog {
    events: Vec<Event>,
    horizon: f64,
    halt: Halt,
}

impl EventLog {
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Always false: the start event is recorded before any collision
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn first(&self) -> &Event {
        &self.events[0]
    }

    pub fn last(&self) -> &Event {
        &self.events[self.events.len() - 1]
    }

    /// Number of bounces recorded
    pub fn collisions(&self) -> usize {
        self.events.len() - 1
    }

    /// Requested horizon
    pub fn horizon(&self) -> f64 {
        self.horizon
    }

    /// Time of the last recorded event
    pub fn end_time(&self) -> f64 {
        self.last().time
    }

    pub fn halt(&self) -> Halt {
        self.halt
    }

    /// True if the solver gave up before the horizon
    pub fn is_truncated(&self) -> bool {
        matches!(self.halt, Halt::NoCollision { .. })
    }

    /// Turn a truncated log into an error, pass a complete one through
    pub fn ensure_complete(self) -> Result<Self> {
        match self.halt {
            Halt::HorizonReached => Ok(self),
            Halt::NoCollision { time, position, .. } => {
                Err(Error::CollisionNotFound { time, position })
            }
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }
}

impl<'a> IntoIterator for &'a EventLog {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

/// Collision-to-collision stepper that owns the growing event buffer
#[derive(Debug)]
pub struct EventGenerator<'a> {
    boundary: &'a BoundaryConfig,
    march: Option<MarchParams>,
    horizon: f64,
    time: f64,
    pos: DVec2,
    vel: DVec2,
    events: Vec<Event>,
    phase: GeneratorPhase,
}

impl<'a> EventGenerator<'a> {
    /// Launch from the table's start position at the default heading
    pub fn new(boundary: &'a BoundaryConfig, speed: f64, horizon: f64) -> Result<Self> {
        Self::with_heading(boundary, speed, DEFAULT_HEADING_DEG, horizon)
    }

    /// Launch from the table's start position at `heading_deg` degrees from +x
    pub fn with_heading(
        boundary: &'a BoundaryConfig,
        speed: f64,
        heading_deg: f64,
        horizon: f64,
    ) -> Result<Self> {
        if !speed.is_finite() || speed <= MIN_SPEED {
            return Err(Error::InvalidConfig(format!(
                "initial speed must be finite and > 0 (got {speed})"
            )));
        }
        if !heading_deg.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "heading must be finite (got {heading_deg})"
            )));
        }
        let start = boundary.start_position();
        Self::from_state(boundary, start, heading_velocity(speed, heading_deg), horizon)
    }

    /// Launch from an arbitrary legal state
    pub fn from_state(
        boundary: &'a BoundaryConfig,
        position: DVec2,
        velocity: DVec2,
        horizon: f64,
    ) -> Result<Self> {
        boundary.validate()?;
        if !horizon.is_finite() || horizon < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "horizon must be finite and >= 0 (got {horizon})"
            )));
        }
        if !velocity.is_finite() || velocity.length() <= MIN_SPEED {
            return Err(Error::InvalidConfig(format!(
                "velocity must be finite and non-zero (got {velocity:?})"
            )));
        }
        if !position.is_finite() || boundary.surface(position) >= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "start position {position:?} is not inside the table"
            )));
        }

        let mut events = Vec::with_capacity(64);
        events.push(Event {
            time: 0.0,
            position,
            velocity,
        });

        Ok(Self {
            boundary,
            march: None,
            horizon,
            time: 0.0,
            pos: position,
            vel: velocity,
            events,
            phase: GeneratorPhase::Running,
        })
    }

    /// Override the ray-march tuning for implicit tables
    pub fn with_march(mut self, march: MarchParams) -> Self {
        self.march = Some(march);
        self
    }

    pub fn phase(&self) -> GeneratorPhase {
        self.phase
    }

    /// Events recorded so far
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Advance by one collision (or halt)
    pub fn step(&mut self) -> Result<GeneratorPhase> {
        if let GeneratorPhase::Halted(_) = self.phase {
            return Ok(self.phase);
        }
        if self.time >= self.horizon {
            self.phase = GeneratorPhase::Halted(Halt::HorizonReached);
            return Ok(self.phase);
        }

        let result = match self.march {
            Some(march) => next_collision_with(self.boundary, self.pos, self.vel, march)?,
            None => next_collision(self.boundary, self.pos, self.vel)?,
        };

        match result {
            CollisionResult::Miss => {
                log::warn!(
                    "no collision found from ({:.6}, {:.6}) at t={:.6}; stopping before horizon {}",
                    self.pos.x,
                    self.pos.y,
                    self.time,
                    self.horizon
                );
                self.phase = GeneratorPhase::Halted(Halt::NoCollision {
                    time: self.time,
                    position: self.pos,
                    velocity: self.vel,
                });
            }
            CollisionResult::Hit { time: dt, normal } => {
                self.pos += self.vel * dt;
                self.vel = reflect(self.vel, normal);
                self.time += dt;
                self.events.push(Event {
                    time: self.time,
                    position: self.pos,
                    velocity: self.vel,
                });
                log::trace!(
                    "bounce {} at t={:.6} ({:.6}, {:.6})",
                    self.events.len() - 1,
                    self.time,
                    self.pos.x,
                    self.pos.y
                );
                if self.time >= self.horizon {
                    self.phase = GeneratorPhase::Halted(Halt::HorizonReached);
                }
            }
        }

        Ok(self.phase)
    }

    /// Step until halted and freeze the log
    pub fn run(mut self) -> Result<EventLog> {
        log::info!(
            "generating events for {} up to t={}",
            self.boundary.kind().as_str(),
            self.horizon
        );
        let halt = loop {
            if let GeneratorPhase::Halted(halt) = self.step()? {
                break halt;
            }
        };

        let log = EventLog {
            events: self.events,
            horizon: self.horizon,
            halt,
        };
        log::debug!(
            "generated {} collisions up to t={:.6} ({:?})",
            log.collisions(),
            log.end_time(),
            log.halt
        );
        Ok(log)
    }
}

/// Generate the event log for a particle launched from the table's start position
///
/// A log that stops before `horizon` (see `EventLog::is_truncated`) is still
/// returned; call `ensure_complete` to treat that as an error.
pub fn generate_events(boundary: &BoundaryConfig, initial_speed: f64, horizon: f64) -> Result<EventLog> {
    EventGenerator::new(boundary, initial_speed, horizon)?.run()
}
