//! Deterministic billiard simulation
//!
//! Everything here is pure and deterministic:
//! - No randomness; identical inputs give bit-identical event logs
//! - Event generation is sequential, evaluation is a pure function of the log
//! - No rendering or platform dependencies

pub mod arc;
pub mod boundary;
pub mod collision;
pub mod events;
pub mod sdf;
pub mod trajectory;

pub use arc::CornerArc;
pub use boundary::{BoundaryConfig, BoundaryKind, StraightWall};
pub use collision::{CollisionResult, next_collision, next_collision_with};
pub use events::{Event, EventGenerator, EventLog, GeneratorPhase, Halt, generate_events};
pub use sdf::{MarchParams, reflect};
pub use trajectory::{evaluate, evaluate_par, linspace, position_at, velocity_at};
