//! Run settings
//!
//! Persisted as JSON so a run can be reproduced exactly.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::consts::{DEFAULT_HEADING_DEG, DEFAULT_SPEED};
use crate::error::{Error, Result};
use crate::sim::{BoundaryConfig, BoundaryKind};

/// Everything needed to reproduce one animation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    /// Table shape
    pub boundary: BoundaryConfig,
    /// Particle speed (units per second)
    pub speed: f64,
    /// Launch heading (degrees from +x)
    pub heading_deg: f64,

    // === Animation ===
    /// Total number of frames
    pub frames: u32,
    /// Frames per second
    pub fps: u32,
    /// Trail length in seconds
    pub trail_secs: f64,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self::for_variant(BoundaryKind::RoundedRectangle)
    }
}

impl RunSettings {
    /// Defaults for each table family
    pub fn for_variant(kind: BoundaryKind) -> Self {
        let boundary = match kind {
            BoundaryKind::RoundedRectangle => BoundaryConfig::RoundedRectangle {
                width: 16.0,
                height: 7.0,
                corner_radius: 1.5,
            },
            BoundaryKind::RippledCurve => BoundaryConfig::RippledCurve {
                width: 22.0,
                height: 14.0,
                ripples: 5,
                epsilon: 0.5,
            },
            BoundaryKind::RippledCurveWithHole => BoundaryConfig::RippledCurveWithHole {
                width: 22.0,
                height: 14.0,
                ripples: 4,
                epsilon: 0.2,
                hole_offset: None,
            },
        };
        Self {
            boundary,
            speed: DEFAULT_SPEED,
            heading_deg: DEFAULT_HEADING_DEG,
            frames: 1500,
            fps: 30,
            trail_secs: 1.2,
        }
    }

    /// Seconds per frame
    pub fn frame_dt(&self) -> f64 {
        1.0 / self.fps as f64
    }

    /// Animated duration (frames / fps)
    pub fn duration(&self) -> f64 {
        self.frames as f64 * self.frame_dt()
    }

    /// Simulation horizon: the animation padded by one trail length
    pub fn horizon(&self) -> f64 {
        self.duration() + self.trail_secs
    }

    /// Check every field; the boundary is validated in full
    pub fn validate(&self) -> Result<()> {
        self.boundary.validate()?;
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "speed must be finite and > 0 (got {})",
                self.speed
            )));
        }
        if !self.heading_deg.is_finite() {
            return Err(Error::InvalidConfig("heading must be finite".into()));
        }
        if self.fps == 0 {
            return Err(Error::InvalidConfig("fps must be > 0".into()));
        }
        if !self.trail_secs.is_finite() || self.trail_secs <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "trail length must be finite and > 0 (got {})",
                self.trail_secs
            )));
        }
        Ok(())
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let settings: RunSettings = serde_json::from_str(&json)?;
        settings.validate()?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Save settings to a JSON file
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}
