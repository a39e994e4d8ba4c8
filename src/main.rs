//! Ripple Billiard entry point
//!
//! Simulates one run and writes the event log, boundary outlines and
//! (optionally) the trail frames as JSON for an external renderer.

use clap::{Parser, ValueEnum};
use glam::DVec2;
use serde::Serialize;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;

use ripple_billiard::sim::{BoundaryConfig, BoundaryKind, EventGenerator, Halt};
use ripple_billiard::trail::{BOUNDARY_COLOR, HEAD_COLOR, TRAIL_COLOR, TrailFrame, TrailSampler};
use ripple_billiard::{Event, Result, RunSettings};

/// Samples used for the exported boundary outlines
const OUTLINE_SAMPLES: usize = 500;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Variant {
    RoundedRectangle,
    Rippled,
    RippledHole,
}

impl From<Variant> for BoundaryKind {
    fn from(v: Variant) -> Self {
        match v {
            Variant::RoundedRectangle => BoundaryKind::RoundedRectangle,
            Variant::Rippled => BoundaryKind::RippledCurve,
            Variant::RippledHole => BoundaryKind::RippledCurveWithHole,
        }
    }
}

/// Simulate a 2D dynamical billiard with curved boundaries
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Table family (ignored when --config is given)
    #[arg(long, value_enum, default_value = "rounded-rectangle")]
    variant: Variant,
    /// JSON settings file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,
    /// Total number of frames
    #[arg(long)]
    frames: Option<u32>,
    /// Animation frames per second
    #[arg(long)]
    fps: Option<u32>,
    /// Particle speed in units per second
    #[arg(long)]
    speed: Option<f64>,
    /// Launch heading in degrees from +x
    #[arg(long)]
    heading: Option<f64>,
    /// Table base width
    #[arg(long)]
    width: Option<f64>,
    /// Table base height
    #[arg(long)]
    height: Option<f64>,
    /// Corner radius (rounded rectangle)
    #[arg(long)]
    radius: Option<f64>,
    /// Number of ripples along the perimeter
    #[arg(long)]
    ripples: Option<u32>,
    /// Ripple amplitude
    #[arg(long)]
    epsilon: Option<f64>,
    /// Tail length in seconds
    #[arg(long)]
    trail: Option<f64>,
    /// Output path
    #[arg(long, default_value = "out/billiard.json")]
    output: PathBuf,
    /// Include per-frame trail samples in the output
    #[arg(long)]
    with_frames: bool,
    /// Keep a log that stopped early instead of failing
    #[arg(long)]
    allow_truncated: bool,
    /// Write the effective settings to this path and continue
    #[arg(long)]
    save_config: Option<PathBuf>,
}

impl Cli {
    /// Start from --config or the variant defaults, then apply overrides
    fn settings(&self) -> Result<RunSettings> {
        let mut settings = match &self.config {
            Some(path) => RunSettings::load(path)?,
            None => RunSettings::for_variant(self.variant.into()),
        };

        if let Some(v) = self.frames {
            settings.frames = v;
        }
        if let Some(v) = self.fps {
            settings.fps = v;
        }
        if let Some(v) = self.speed {
            settings.speed = v;
        }
        if let Some(v) = self.heading {
            settings.heading_deg = v;
        }
        if let Some(v) = self.trail {
            settings.trail_secs = v;
        }

        for flag in self.ignored_flags(&settings.boundary) {
            log::warn!(
                "--{flag} does not apply to the {} table; ignoring it",
                settings.boundary.kind().as_str()
            );
        }

        match &mut settings.boundary {
            BoundaryConfig::RoundedRectangle {
                width,
                height,
                corner_radius,
            } => {
                override_f64(width, self.width);
                override_f64(height, self.height);
                override_f64(corner_radius, self.radius);
            }
            BoundaryConfig::RippledCurve {
                width,
                height,
                ripples,
                epsilon,
            }
            | BoundaryConfig::RippledCurveWithHole {
                width,
                height,
                ripples,
                epsilon,
                ..
            } => {
                override_f64(width, self.width);
                override_f64(height, self.height);
                override_f64(epsilon, self.epsilon);
                if let Some(k) = self.ripples {
                    *ripples = k;
                }
            }
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Shape overrides that the chosen table has no field for
    fn ignored_flags(&self, boundary: &BoundaryConfig) -> Vec<&'static str> {
        match boundary {
            BoundaryConfig::RoundedRectangle { .. } => [
                ("ripples", self.ripples.is_some()),
                ("epsilon", self.epsilon.is_some()),
            ]
            .into_iter()
            .filter_map(|(flag, set)| set.then_some(flag))
            .collect(),
            _ => self.radius.map(|_| "radius").into_iter().collect(),
        }
    }
}

fn override_f64(slot: &mut f64, value: Option<f64>) {
    if let Some(v) = value {
        *slot = v;
    }
}

#[derive(Serialize)]
struct Style {
    trail: [f32; 3],
    head: [f32; 3],
    boundary: [f32; 3],
    view_extent: DVec2,
}

/// JSON document handed to the renderer
#[derive(Serialize)]
struct RunExport<'a> {
    settings: &'a RunSettings,
    style: Style,
    boundary_outline: Vec<DVec2>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hole_outline: Option<Vec<DVec2>>,
    halt: Halt,
    events: &'a [Event],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    frames: Vec<TrailFrame>,
}

fn run(cli: &Cli) -> Result<()> {
    let settings = cli.settings()?;
    if let Some(path) = &cli.save_config {
        settings.save(path)?;
    }

    let boundary = &settings.boundary;
    let generator =
        EventGenerator::with_heading(boundary, settings.speed, settings.heading_deg, settings.horizon())?;
    let mut log = generator.run()?;
    if !cli.allow_truncated {
        log = log.ensure_complete()?;
    }
    log::info!(
        "{} collisions over {:.3}s ({} events)",
        log.collisions(),
        log.end_time(),
        log.len()
    );

    let frames = if cli.with_frames {
        log::info!("Sampling {} frames...", settings.frames);
        TrailSampler::from_settings(&settings).frames_par(&log, settings.frames)
    } else {
        Vec::new()
    };

    let export = RunExport {
        settings: &settings,
        style: Style {
            trail: TRAIL_COLOR,
            head: HEAD_COLOR,
            boundary: BOUNDARY_COLOR,
            view_extent: boundary.view_extent(),
        },
        boundary_outline: boundary.outline(OUTLINE_SAMPLES),
        hole_outline: boundary.hole_outline(OUTLINE_SAMPLES),
        halt: log.halt(),
        events: log.events(),
        frames,
    };

    if let Some(dir) = cli.output.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    log::info!("Writing {}...", cli.output.display());
    let writer = BufWriter::new(File::create(&cli.output)?);
    serde_json::to_writer(writer, &export)?;
    log::info!("Export complete.");
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
