//! Simulation configuration: defaults, validation and TOML loading.
//!
//! Every field carries a serde default, so a config file only needs the keys
//! it wants to override:
//!
//! ```toml
//! temperature_k = 450.0
//! particle_count = 60
//!
//! [radius_range]
//! min = 3.0
//! max = 9.0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::particle::DIM;
use crate::error::{Error, Result};

pub const DEFAULT_BOUNDS: [f64; DIM] = [800.0, 450.0];
pub const DEFAULT_TEMPERATURE_K: f64 = 298.0;
pub const DEFAULT_PARTICLE_COUNT: usize = 100;
pub const DEFAULT_MIN_RADIUS: f64 = 4.0;
pub const DEFAULT_MAX_RADIUS: f64 = 7.0;
pub const DEFAULT_PRESSURE_WINDOW_MS: u64 = 1000;

/// Closed interval radii are drawn from. Always satisfies `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRadiusRange")]
pub struct RadiusRange {
    min: f64,
    max: f64,
}

#[derive(Deserialize)]
struct RawRadiusRange {
    min: f64,
    max: f64,
}

impl TryFrom<RawRadiusRange> for RadiusRange {
    type Error = Error;

    fn try_from(raw: RawRadiusRange) -> Result<Self> {
        RadiusRange::new(raw.min, raw.max)
    }
}

impl RadiusRange {
    /// Build a range; if `min > max` the upper bound snaps up to `min`.
    ///
    /// Errors if either bound is non-finite or not strictly positive.
    pub fn new(min: f64, max: f64) -> Result<Self> {
        check_radius(min)?;
        check_radius(max)?;
        if min > max {
            warn!(min, max, "radius range inverted; raising max to min");
            return Ok(Self { min, max: min });
        }
        Ok(Self { min, max })
    }

    /// Move the lower bound; an upper bound below it is dragged up.
    pub fn with_min(self, min: f64) -> Result<Self> {
        check_radius(min)?;
        Ok(Self {
            min,
            max: self.max.max(min),
        })
    }

    /// Move the upper bound; a lower bound above it is dragged down.
    pub fn with_max(self, max: f64) -> Result<Self> {
        check_radius(max)?;
        Ok(Self {
            min: self.min.min(max),
            max,
        })
    }

    #[inline]
    pub fn min(&self) -> f64 {
        self.min
    }

    #[inline]
    pub fn max(&self) -> f64 {
        self.max
    }
}

impl Default for RadiusRange {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_RADIUS,
            max: DEFAULT_MAX_RADIUS,
        }
    }
}

fn check_radius(r: f64) -> Result<()> {
    if !r.is_finite() || r <= 0.0 {
        return Err(Error::InvalidParam(format!(
            "radius bound must be finite and > 0, got {r}"
        )));
    }
    Ok(())
}

/// Startup parameters and the values `reset()` restores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Container width and height at 100% volume.
    pub bounds: [f64; DIM],
    pub temperature_k: f64,
    pub particle_count: usize,
    pub radius_range: RadiusRange,
    /// Pressure averaging window in milliseconds.
    pub pressure_window_ms: u64,
    /// RNG seed; `None` draws one from the thread RNG.
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            bounds: DEFAULT_BOUNDS,
            temperature_k: DEFAULT_TEMPERATURE_K,
            particle_count: DEFAULT_PARTICLE_COUNT,
            radius_range: RadiusRange::default(),
            pressure_window_ms: DEFAULT_PRESSURE_WINDOW_MS,
            seed: None,
        }
    }
}

impl SimConfig {
    /// Parse a TOML document and validate it.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let cfg: SimConfig = toml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read and parse a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Check the invariants the simulation relies on.
    pub fn validate(&self) -> Result<()> {
        validate_bounds(&self.bounds, self.radius_range.max())?;
        if !self.temperature_k.is_finite() || self.temperature_k < 0.0 {
            return Err(Error::InvalidParam(
                "temperature_k must be finite and >= 0".into(),
            ));
        }
        if self.pressure_window_ms == 0 {
            return Err(Error::InvalidParam(
                "pressure_window_ms must be > 0".into(),
            ));
        }
        Ok(())
    }
}

/// Bounds must be finite, positive and fit at least one particle of `max_radius`.
pub(crate) fn validate_bounds(bounds: &[f64; DIM], max_radius: f64) -> Result<()> {
    if !bounds.iter().all(|&l| l.is_finite() && l > 0.0) {
        return Err(Error::InvalidParam(
            "bounds must be finite and > 0".into(),
        ));
    }
    if bounds.iter().any(|&l| l < 2.0 * max_radius) {
        return Err(Error::InvalidParam(format!(
            "bounds {bounds:?} cannot hold a particle of radius {max_radius}"
        )));
    }
    Ok(())
}
