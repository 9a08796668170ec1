//! gasbox: frame-driven 2D ideal-gas simulation core.
//!
//! Discs bounce off the container walls and off each other with damped
//! elastic collisions, relax toward a temperature-implied speed band, and
//! feed a coarse wall-collision "pressure" readout. A host UI drives it one
//! frame at a time through [`control::GasController`].
//!
//! ```
//! use std::time::Instant;
//! use gasbox::config::SimConfig;
//! use gasbox::control::GasController;
//!
//! # fn main() -> gasbox::error::Result<()> {
//! let mut gas = GasController::new(SimConfig { seed: Some(1), ..SimConfig::default() }, Instant::now())?;
//! gas.on_temperature_changed(400.0)?;
//! let frame = gas.frame(Instant::now());
//! assert!(frame.report.is_some());
//! assert_eq!(gas.render().len(), 100);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod control;
pub mod core;
pub mod error;

#[cfg(feature = "python")]
mod python;

pub use crate::config::{RadiusRange, SimConfig};
pub use crate::control::{Frame, GasController};
pub use crate::core::Simulation;
