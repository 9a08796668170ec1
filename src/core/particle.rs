use rand::Rng;
use std::f64::consts::TAU;

use crate::config::RadiusRange;
use crate::error::{Error, Result};

/// Fixed spatial dimension (2D).
pub const DIM: usize = 2;

/// Converts Kelvin into the frame-based velocity unit: `base = sqrt(T * K)`.
pub const K_TEMP_SCALAR: f64 = 0.05;
/// Base speed substituted when the temperature maps to exactly zero.
pub const MIN_BASE_SPEED: f64 = 0.01;
/// Multiplier applied to the reflected/exchanged normal velocity on every bounce.
pub const DAMPING_FACTOR: f64 = 0.99;
/// `mass = radius^2 * MASS_FACTOR`.
pub const MASS_FACTOR: f64 = 0.5;
/// Sampled speeds fall in `[SPEED_JITTER_LO * base, SPEED_JITTER_HI * base]`.
pub const SPEED_JITTER_LO: f64 = 0.7;
pub const SPEED_JITTER_HI: f64 = 1.3;
/// Weight of the current speed when nudging toward the thermal target.
pub const SPEED_BLEND: f64 = 0.95;

/// A gas particle (hard disc) in D=2.
///
/// Fields:
/// - `id`: stable identifier, reported in collision events
/// - `r`: position vector [x, y]
/// - `v`: velocity vector [vx, vy], in units per tick
/// - `radius`: disc radius (> 0), fixed for the particle's lifetime
/// - `mass`: derived from `radius`
#[derive(Debug, Clone)]
pub struct Particle {
    /// Stable particle identifier.
    pub id: u32,
    /// Position (x, y).
    pub r: [f64; DIM],
    /// Velocity (vx, vy).
    pub v: [f64; DIM],
    radius: f64,
    mass: f64,
}

impl Particle {
    /// Create a particle with explicit state after validating invariants.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if `radius` is non-positive or any component is NaN/inf.
    pub fn new(id: u32, r: [f64; DIM], v: [f64; DIM], radius: f64) -> Result<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(Error::InvalidParam("radius must be finite and > 0".into()));
        }
        if !r.iter().all(|x| x.is_finite()) {
            return Err(Error::InvalidParam("position must be finite".into()));
        }
        if !v.iter().all(|x| x.is_finite()) {
            return Err(Error::InvalidParam("velocity must be finite".into()));
        }
        Ok(Self {
            id,
            r,
            v,
            radius,
            mass: mass_for_radius(radius),
        })
    }

    /// Create a particle at `r` with a radius drawn from `radii` and a random
    /// velocity matching `temperature_k`.
    pub fn spawn<R: Rng + ?Sized>(
        id: u32,
        r: [f64; DIM],
        temperature_k: f64,
        radii: &RadiusRange,
        rng: &mut R,
    ) -> Self {
        let radius = if radii.min() < radii.max() {
            rng.random_range(radii.min()..=radii.max())
        } else {
            radii.min()
        };
        let speed = sample_speed(base_speed(temperature_k), rng);
        let dir = random_direction(rng);
        Self {
            id,
            r,
            v: [dir[0] * speed, dir[1] * speed],
            radius,
            mass: mass_for_radius(radius),
        }
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    #[inline]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Magnitude of the velocity.
    #[inline]
    pub fn speed(&self) -> f64 {
        dot(&self.v, &self.v).sqrt()
    }

    /// Returns the particle's kinetic energy: 1/2 m |v|^2.
    #[inline]
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * dot(&self.v, &self.v)
    }

    /// Linear momentum m v.
    #[inline]
    pub fn momentum(&self) -> [f64; DIM] {
        [self.mass * self.v[0], self.mass * self.v[1]]
    }

    /// Advance one tick: drift, then nudge the speed toward the temperature target.
    pub fn integrate<R: Rng + ?Sized>(&mut self, temperature_k: f64, rng: &mut R) {
        self.drift();
        self.thermalize(temperature_k, rng);
    }

    /// Explicit Euler position update; one tick is one frame, so `dt = 1`.
    #[inline]
    pub fn drift(&mut self) {
        for k in 0..DIM {
            self.r[k] += self.v[k];
        }
    }

    /// Rescale the speed toward a sample of the temperature's speed band,
    /// keeping the direction. A stationary particle gets a fresh random velocity.
    pub fn thermalize<R: Rng + ?Sized>(&mut self, temperature_k: f64, rng: &mut R) {
        let base = base_speed(temperature_k);
        let current = self.speed();
        if current == 0.0 {
            let speed = sample_speed(base, rng);
            let dir = random_direction(rng);
            self.v = [dir[0] * speed, dir[1] * speed];
            return;
        }
        let target = sample_speed(base, rng);
        let blended = SPEED_BLEND * current + (1.0 - SPEED_BLEND) * target;
        let scale = blended / current;
        for vk in &mut self.v {
            *vk *= scale;
        }
    }

    /// Reflect off any wall the disc has crossed, one axis at a time.
    ///
    /// Returns the wall id hit on each axis (`2k` = min wall, `2k+1` = max wall).
    /// Each `Some` is one wall collision.
    pub fn resolve_wall_collision(&mut self, bounds: &[f64; DIM]) -> [Option<u32>; DIM] {
        let mut hits = [None; DIM];
        for (k, hit) in hits.iter_mut().enumerate() {
            let lo = self.radius;
            let hi = bounds[k] - self.radius;
            if self.r[k] > hi {
                self.r[k] = hi;
                self.v[k] *= -DAMPING_FACTOR;
                *hit = Some((2 * k + 1) as u32);
            } else if self.r[k] < lo {
                self.r[k] = lo;
                self.v[k] *= -DAMPING_FACTOR;
                *hit = Some((2 * k) as u32);
            }
        }
        hits
    }

    /// Resolve a damped elastic collision with `other` if the discs overlap.
    ///
    /// Overlap is split evenly between the two, the normal velocity components
    /// follow the 1D elastic formula for unequal masses and are damped, and the
    /// tangential components pass through. Returns `true` if a collision occurred.
    pub fn resolve_pair_collision(&mut self, other: &mut Particle) -> bool {
        let mut d = [0.0_f64; DIM];
        for (k, dk) in d.iter_mut().enumerate() {
            *dk = other.r[k] - self.r[k];
        }
        let r_sum = self.radius + other.radius;
        let dist_sq = dot(&d, &d);
        if dist_sq >= r_sum * r_sum {
            return false;
        }

        // Unit normal from self -> other; coincident centres fall back to +x.
        let dist = dist_sq.sqrt();
        let n = if dist > 0.0 {
            [d[0] / dist, d[1] / dist]
        } else {
            [1.0, 0.0]
        };
        let t = [-n[1], n[0]];

        let half_overlap = 0.5 * (r_sum - dist);
        for k in 0..DIM {
            self.r[k] -= n[k] * half_overlap;
            other.r[k] += n[k] * half_overlap;
        }

        let (v1n, v1t) = (dot(&self.v, &n), dot(&self.v, &t));
        let (v2n, v2t) = (dot(&other.v, &n), dot(&other.v, &t));
        let (m1, m2) = (self.mass, other.mass);
        let m_sum = m1 + m2;

        let v1n_post = DAMPING_FACTOR * (v1n * (m1 - m2) + 2.0 * m2 * v2n) / m_sum;
        let v2n_post = DAMPING_FACTOR * (v2n * (m2 - m1) + 2.0 * m1 * v1n) / m_sum;

        for k in 0..DIM {
            self.v[k] = v1n_post * n[k] + v1t * t[k];
            other.v[k] = v2n_post * n[k] + v2t * t[k];
        }
        true
    }

    /// Clamp the position into `[radius, bound - radius]` on every axis without
    /// touching the velocity.
    pub fn clamp_into(&mut self, bounds: &[f64; DIM]) {
        for (rk, &l) in self.r.iter_mut().zip(bounds) {
            *rk = rk.clamp(self.radius, (l - self.radius).max(self.radius));
        }
    }
}

/// Temperature-implied base speed, never exactly zero.
pub fn base_speed(temperature_k: f64) -> f64 {
    let s = (temperature_k.max(0.0) * K_TEMP_SCALAR).sqrt();
    if s == 0.0 {
        MIN_BASE_SPEED
    } else {
        s
    }
}

#[inline]
pub fn mass_for_radius(radius: f64) -> f64 {
    radius * radius * MASS_FACTOR
}

/// Speed drawn uniformly from the jitter band around `base`.
pub fn sample_speed<R: Rng + ?Sized>(base: f64, rng: &mut R) -> f64 {
    rng.random_range(SPEED_JITTER_LO * base..=SPEED_JITTER_HI * base)
}

/// Uniformly random unit vector.
pub fn random_direction<R: Rng + ?Sized>(rng: &mut R) -> [f64; DIM] {
    let angle = rng.random_range(0.0..TAU);
    [angle.cos(), angle.sin()]
}

#[inline]
pub(crate) fn dot(a: &[f64; DIM], b: &[f64; DIM]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
