use glam::DVec2;
use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the billiard engine and its run tooling.
///
/// Configuration problems are caught at construction time; a run that has
/// started can only fail on numerical degeneracy, or when the caller asks a
/// truncated event log to be complete.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid boundary, launch or run parameter.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Numerical degeneracy (zero velocity, vanishing surface gradient, non-finite hit).
    #[error("numerical error: {0}")]
    Numerical(String),

    /// The solver found no forward collision; the event log stops early.
    #[error(
        "no collision found after t={:.6} from ({:.6}, {:.6}); boundary may be too thin for the march step",
        .time,
        .position.x,
        .position.y
    )]
    CollisionNotFound { time: f64, position: DVec2 },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
