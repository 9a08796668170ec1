use std::time::Instant;

use numpy::ndarray::{Array1, Array2};
use numpy::{IntoPyArray, PyArray1, PyArray2};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::config::{RadiusRange, SimConfig, DEFAULT_PRESSURE_WINDOW_MS};
use crate::control::GasController;
use crate::core::particle::DIM;

fn py_err<E: ToString>(e: E) -> PyErr {
    PyValueError::new_err(e.to_string())
}

/// GasSim Python-facing wrapper around the Rust controller.
///
/// The host calls `frame()` once per rendered frame and wires its widgets to
/// the `on_*` handlers.
#[pyclass]
pub struct GasSim {
    ctl: GasController,
}

#[pymethods]
impl GasSim {
    /// Create a gas in a `width` x `height` box.
    ///
    /// Errors: raises ValueError on invalid parameters.
    #[new]
    #[pyo3(signature = (
        width=800.0,
        height=450.0,
        temperature_k=298.0,
        particle_count=100,
        min_radius=4.0,
        max_radius=7.0,
        pressure_window_ms=DEFAULT_PRESSURE_WINDOW_MS,
        seed=None
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        width: f64,
        height: f64,
        temperature_k: f64,
        particle_count: usize,
        min_radius: f64,
        max_radius: f64,
        pressure_window_ms: u64,
        seed: Option<u64>,
    ) -> PyResult<Self> {
        let config = SimConfig {
            bounds: [width, height],
            temperature_k,
            particle_count,
            radius_range: RadiusRange::new(min_radius, max_radius).map_err(py_err)?,
            pressure_window_ms,
            seed,
        };
        let ctl = GasController::new(config, Instant::now()).map_err(py_err)?;
        Ok(Self { ctl })
    }

    /// Advance one frame (releases the GIL during computation).
    ///
    /// Returns the new pressure readout if a window closed, else None.
    fn frame(&mut self, py: Python<'_>) -> Option<u64> {
        py.detach(|| self.ctl.frame(Instant::now()).pressure)
    }

    fn on_temperature_changed(&mut self, temperature_k: f64) -> PyResult<()> {
        self.ctl.on_temperature_changed(temperature_k).map_err(py_err)
    }

    /// Negative counts are treated as zero.
    fn on_count_changed(&mut self, count: i64) {
        self.ctl.on_count_changed(count.max(0) as usize);
    }

    /// Returns the normalised (min, max).
    fn on_radius_range_changed(&mut self, min: f64, max: f64) -> PyResult<(f64, f64)> {
        let r = self
            .ctl
            .on_radius_range_changed(min, max)
            .map_err(py_err)?;
        Ok((r.min(), r.max()))
    }

    fn on_volume_changed(&mut self, scale: f64) -> PyResult<()> {
        self.ctl.on_volume_changed(scale).map_err(py_err)
    }

    fn on_base_resized(&mut self, width: f64, height: f64) -> PyResult<()> {
        self.ctl.on_base_resized([width, height]).map_err(py_err)
    }

    fn on_reset(&mut self) {
        self.ctl.on_reset(Instant::now());
    }

    /// Returns True if now paused.
    fn on_pause_toggle(&mut self) -> bool {
        self.ctl.on_pause_toggle()
    }

    fn is_paused(&self) -> bool {
        self.ctl.is_paused()
    }

    fn get_pressure(&self) -> u64 {
        self.ctl.pressure()
    }

    /// Return positions as a NumPy array of shape (N, 2), dtype=float64.
    fn get_positions<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        let sim = self.ctl.simulation();
        let mut arr = Array2::<f64>::zeros((sim.num_particles(), DIM));
        for (i, p) in sim.particles.iter().enumerate() {
            for k in 0..DIM {
                arr[[i, k]] = p.r[k];
            }
        }
        arr.into_pyarray(py)
    }

    /// Return velocities as a NumPy array of shape (N, 2), dtype=float64.
    fn get_velocities<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        let sim = self.ctl.simulation();
        let mut arr = Array2::<f64>::zeros((sim.num_particles(), DIM));
        for (i, p) in sim.particles.iter().enumerate() {
            for k in 0..DIM {
                arr[[i, k]] = p.v[k];
            }
        }
        arr.into_pyarray(py)
    }

    fn get_radii<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        let radii: Array1<f64> = self
            .ctl
            .simulation()
            .particles
            .iter()
            .map(|p| p.radius())
            .collect();
        radii.into_pyarray(py)
    }

    fn get_speeds<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        let speeds: Array1<f64> = self
            .ctl
            .simulation()
            .particles
            .iter()
            .map(|p| p.speed())
            .collect();
        speeds.into_pyarray(py)
    }

    /// Boolean mask of particles that were in a pair collision during the last frame.
    fn get_highlighted<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<bool>> {
        let report = self.ctl.last_report();
        let mask: Array1<bool> = self
            .ctl
            .simulation()
            .particles
            .iter()
            .map(|p| report.is_highlighted(p.id))
            .collect();
        mask.into_pyarray(py)
    }
}

/// The gasbox Python module entry point.
#[pymodule]
fn gasbox(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<GasSim>()?;
    Ok(())
}
