//! Physics core: particles, the container world, collision events and the
//! pressure readout.

pub mod event;
pub mod particle;
pub mod pressure;
pub mod render;
pub mod sim;

pub use event::{CollisionEvent, StepReport};
pub use particle::Particle;
pub use pressure::PressureEstimator;
pub use render::{RenderParticle, Rgba, SpeedColorMapper};
pub use sim::Simulation;
