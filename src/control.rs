//! Host-facing controller: the handlers a UI wires its widgets to, plus the
//! per-frame entry point.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::{RadiusRange, SimConfig};
use crate::core::particle::DIM;
use crate::core::render::snapshot;
use crate::core::{PressureEstimator, RenderParticle, Simulation, SpeedColorMapper, StepReport};
use crate::error::{Error, Result};

/// Output of one [`GasController::frame`] call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    /// The tick's collisions; `None` while paused.
    pub report: Option<StepReport>,
    /// New pressure readout when a window closed this frame.
    pub pressure: Option<u64>,
}

/// Owns the simulation and the state the UI layer would otherwise keep in
/// globals: pause flag, volume scale and the pressure window.
#[derive(Debug)]
pub struct GasController {
    sim: Simulation,
    pressure: PressureEstimator,
    colors: SpeedColorMapper,
    base_bounds: [f64; DIM],
    volume_scale: f64,
    paused: bool,
    last_report: StepReport,
}

impl GasController {
    pub fn new(config: SimConfig, now: Instant) -> Result<Self> {
        let window = Duration::from_millis(config.pressure_window_ms);
        let base_bounds = config.bounds;
        let sim = Simulation::new(config)?;
        Ok(Self {
            sim,
            pressure: PressureEstimator::new(window, now),
            colors: SpeedColorMapper::default(),
            base_bounds,
            volume_scale: 1.0,
            paused: false,
            last_report: StepReport::default(),
        })
    }

    /// Advance one frame: step the physics and poll the pressure window.
    /// Does nothing while paused.
    pub fn frame(&mut self, now: Instant) -> Frame {
        if self.paused {
            return Frame::default();
        }
        let report = self.sim.step();
        let pressure = self.pressure.poll(now, &mut self.sim);
        self.last_report = report.clone();
        Frame {
            report: Some(report),
            pressure,
        }
    }

    pub fn on_temperature_changed(&mut self, temperature_k: f64) -> Result<()> {
        self.sim.set_temperature(temperature_k)
    }

    pub fn on_count_changed(&mut self, count: usize) {
        self.sim.set_particle_count(count);
    }

    /// New radius bounds; rebuilds the particles unless paused.
    pub fn on_radius_range_changed(&mut self, min: f64, max: f64) -> Result<RadiusRange> {
        let range = self.sim.set_radius_range(min, max)?;
        self.reinit_if_running();
        Ok(range)
    }

    pub fn on_min_radius_changed(&mut self, min: f64) -> Result<RadiusRange> {
        let range = self.sim.set_min_radius(min)?;
        self.reinit_if_running();
        Ok(range)
    }

    pub fn on_max_radius_changed(&mut self, max: f64) -> Result<RadiusRange> {
        let range = self.sim.set_max_radius(max)?;
        self.reinit_if_running();
        Ok(range)
    }

    /// Scale the container relative to the base bounds (1.0 = 100%).
    pub fn on_volume_changed(&mut self, scale: f64) -> Result<()> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(Error::InvalidParam(format!(
                "volume scale must be finite and > 0, got {scale}"
            )));
        }
        self.sim.resize(scaled(&self.base_bounds, scale))?;
        self.volume_scale = scale;
        Ok(())
    }

    /// The host's drawing area changed; keep the current volume scale.
    pub fn on_base_resized(&mut self, base_bounds: [f64; DIM]) -> Result<()> {
        self.sim.resize(scaled(&base_bounds, self.volume_scale))?;
        self.base_bounds = base_bounds;
        Ok(())
    }

    /// Restore defaults at 100% volume of the current base size, unpause and
    /// restart the pressure window.
    pub fn on_reset(&mut self, now: Instant) {
        if let Err(e) = self.sim.reset_within(self.base_bounds) {
            warn!(error = %e, base = ?self.base_bounds, "base size too small; using configured bounds");
            self.sim.reset();
            self.base_bounds = self.sim.defaults().bounds;
        }
        self.volume_scale = 1.0;
        self.paused = false;
        self.last_report = StepReport::default();
        self.pressure.reset(now);
        info!("controller reset");
    }

    /// Toggle pause; returns the new paused state.
    pub fn on_pause_toggle(&mut self) -> bool {
        self.paused = !self.paused;
        if !self.paused {
            self.last_report = StepReport::default();
        }
        debug!(paused = self.paused, "pause toggled");
        self.paused
    }

    /// Draw list for the current state.
    pub fn render(&self) -> Vec<RenderParticle> {
        snapshot(&self.sim, &self.last_report, &self.colors)
    }

    /// Most recent pressure readout.
    pub fn pressure(&self) -> u64 {
        self.pressure.displayed()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn volume_scale(&self) -> f64 {
        self.volume_scale
    }

    pub fn last_report(&self) -> &StepReport {
        &self.last_report
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    pub fn simulation_mut(&mut self) -> &mut Simulation {
        &mut self.sim
    }

    fn reinit_if_running(&mut self) {
        if !self.paused {
            self.sim.reinitialize();
            self.last_report = StepReport::default();
        }
    }
}

fn scaled(bounds: &[f64; DIM], scale: f64) -> [f64; DIM] {
    [bounds[0] * scale, bounds[1] * scale]
}
