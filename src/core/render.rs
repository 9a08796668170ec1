//! Read-only view of the simulation for the host's draw call.

use crate::core::particle::{DIM, K_TEMP_SCALAR};
use crate::core::{Simulation, StepReport};

/// 8-bit RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Channel-wise linear interpolation, `t` clamped to [0, 1].
    pub fn lerp(self, other: Rgba, t: f64) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgba {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }
}

/// Maps particle speed onto a slow→fast gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedColorMapper {
    pub slow: Rgba,
    pub fast: Rgba,
    pub highlight: Rgba,
    /// Speed at (and above) which `fast` is used.
    pub max_speed: f64,
}

impl Default for SpeedColorMapper {
    fn default() -> Self {
        Self {
            slow: Rgba::new(0, 150, 255, 220),
            fast: Rgba::new(255, 50, 50, 220),
            highlight: Rgba::new(255, 255, 0, 255),
            // roughly the fast tail at 500 K
            max_speed: (500.0 * K_TEMP_SCALAR).sqrt() * 1.5,
        }
    }
}

impl SpeedColorMapper {
    pub fn color_for(&self, speed: f64, highlighted: bool) -> Rgba {
        if highlighted {
            return self.highlight;
        }
        let frac = if self.max_speed > 0.0 {
            speed / self.max_speed
        } else {
            1.0
        };
        self.slow.lerp(self.fast, frac)
    }
}

/// What the host needs to draw one particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderParticle {
    pub id: u32,
    pub position: [f64; DIM],
    pub radius: f64,
    pub speed: f64,
    pub highlighted: bool,
    pub color: Rgba,
}

/// Build the per-frame draw list. `report` is the step that produced the
/// current state; its pair collisions decide highlighting.
pub fn snapshot(
    sim: &Simulation,
    report: &StepReport,
    mapper: &SpeedColorMapper,
) -> Vec<RenderParticle> {
    let highlighted = report.highlighted();
    sim.particles
        .iter()
        .map(|p| {
            let speed = p.speed();
            let hl = highlighted.contains(&p.id);
            RenderParticle {
                id: p.id,
                position: p.r,
                radius: p.radius(),
                speed,
                highlighted: hl,
                color: mapper.color_for(speed, hl),
            }
        })
        .collect()
}
