use crate::config::{validate_bounds, RadiusRange, SimConfig};
use crate::core::particle::DIM;
use crate::core::{CollisionEvent, Particle, StepReport};
use crate::error::{Error, Result};
use rand::{rng, rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, info, warn};

/// The gas container: an axis-aligned 2D box holding every particle.
///
/// Walls are implicitly represented by four lines:
/// - For axis k in {0,1}, wall_id = 2*k (min wall at x_k = 0), wall_id = 2*k+1 (max wall at x_k = L_k).
///
/// The simulation is frame-driven: each [`step`](Simulation::step) advances one tick.
#[derive(Debug)]
pub struct Simulation {
    bounds: [f64; DIM],
    temperature_k: f64,
    radius_range: RadiusRange,
    pub particles: Vec<Particle>,
    next_id: u32,
    ticks: u64,
    window_collisions: u64,
    wall_collisions_total: u64,
    pair_collisions_total: u64,
    defaults: SimConfig,
    rng: StdRng,
}

impl Simulation {
    /// Create a simulation from a validated config.
    ///
    /// Particles are placed uniformly at random without overlap rejection; any
    /// initial overlap is resolved by the first pair pass.
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => SeedableRng::seed_from_u64(rng().random()),
        };
        let mut sim = Self {
            bounds: config.bounds,
            temperature_k: config.temperature_k,
            radius_range: config.radius_range,
            particles: Vec::with_capacity(config.particle_count),
            next_id: 0,
            ticks: 0,
            window_collisions: 0,
            wall_collisions_total: 0,
            pair_collisions_total: 0,
            defaults: config,
            rng,
        };
        sim.spawn_particles(sim.defaults.particle_count);
        info!(
            count = sim.particles.len(),
            bounds = ?sim.bounds,
            temperature_k = sim.temperature_k,
            "simulation created"
        );
        Ok(sim)
    }

    /// Advance one tick at the current temperature.
    ///
    /// Every particle is integrated and checked against the walls in index
    /// order, then every unordered pair is checked for overlap (O(n^2)).
    /// A final containment pass clamps positions that pair separation pushed
    /// through a wall; it does not count as a wall collision.
    pub fn step(&mut self) -> StepReport {
        self.ticks += 1;
        let mut events = Vec::new();

        let temperature_k = self.temperature_k;
        for p in &mut self.particles {
            p.integrate(temperature_k, &mut self.rng);
            for wall_id in p.resolve_wall_collision(&self.bounds).into_iter().flatten() {
                events.push(CollisionEvent::Wall { i: p.id, wall_id });
            }
        }
        let wall_hits = events.len() as u64;
        self.window_collisions += wall_hits;
        self.wall_collisions_total += wall_hits;

        let n = self.particles.len();
        for i in 0..n {
            let (head, tail) = self.particles.split_at_mut(i + 1);
            let pi = &mut head[i];
            for pj in tail.iter_mut() {
                if pi.resolve_pair_collision(pj) {
                    events.push(CollisionEvent::Pair { i: pi.id, j: pj.id });
                    self.pair_collisions_total += 1;
                }
            }
        }

        for p in &mut self.particles {
            p.clamp_into(&self.bounds);
        }

        StepReport {
            tick: self.ticks,
            events,
        }
    }

    /// Set the temperature the next `step` relaxes toward.
    ///
    /// Negative values are clamped to 0 K; non-finite values are rejected.
    pub fn set_temperature(&mut self, temperature_k: f64) -> Result<()> {
        if !temperature_k.is_finite() {
            return Err(Error::InvalidParam("temperature must be finite".into()));
        }
        if temperature_k < 0.0 {
            warn!(temperature_k, "negative temperature clamped to 0 K");
        }
        self.temperature_k = temperature_k.max(0.0);
        Ok(())
    }

    /// Grow by spawning new particles or shrink by truncating the tail.
    pub fn set_particle_count(&mut self, target: usize) {
        let current = self.particles.len();
        if target > current {
            self.spawn_particles(target - current);
        } else if target < current {
            self.particles.truncate(target);
        }
        debug!(from = current, to = target, "particle count changed");
    }

    /// Replace the radius range used for future particles.
    ///
    /// Existing particles keep their radii until [`reinitialize`](Self::reinitialize).
    pub fn set_radius_range(&mut self, min: f64, max: f64) -> Result<RadiusRange> {
        let range = RadiusRange::new(min, max)?;
        self.apply_radius_range(range)
    }

    /// Move only the lower radius bound (drags the upper bound up if needed).
    pub fn set_min_radius(&mut self, min: f64) -> Result<RadiusRange> {
        let range = self.radius_range.with_min(min)?;
        self.apply_radius_range(range)
    }

    /// Move only the upper radius bound (drags the lower bound down if needed).
    pub fn set_max_radius(&mut self, max: f64) -> Result<RadiusRange> {
        let range = self.radius_range.with_max(max)?;
        self.apply_radius_range(range)
    }

    fn apply_radius_range(&mut self, range: RadiusRange) -> Result<RadiusRange> {
        validate_bounds(&self.bounds, range.max())?;
        self.radius_range = range;
        Ok(range)
    }

    /// Discard every particle and rebuild the same count at the current
    /// temperature and radius range. Ids restart at 0.
    pub fn reinitialize(&mut self) {
        let count = self.particles.len();
        self.particles.clear();
        self.next_id = 0;
        self.spawn_particles(count);
        info!(
            count,
            min_radius = self.radius_range.min(),
            max_radius = self.radius_range.max(),
            "particles reinitialized"
        );
    }

    /// Change the container size, scaling positions proportionally and then
    /// clamping every particle back inside.
    pub fn resize(&mut self, new_bounds: [f64; DIM]) -> Result<()> {
        let widest = self
            .particles
            .iter()
            .map(|p| p.radius())
            .fold(self.radius_range.max(), f64::max);
        validate_bounds(&new_bounds, widest)?;

        let scale = [
            new_bounds[0] / self.bounds[0],
            new_bounds[1] / self.bounds[1],
        ];
        for p in &mut self.particles {
            for k in 0..DIM {
                p.r[k] *= scale[k];
            }
            p.clamp_into(&new_bounds);
        }
        debug!(from = ?self.bounds, to = ?new_bounds, "container resized");
        self.bounds = new_bounds;
        Ok(())
    }

    /// Restore the configured defaults and rebuild the particle set.
    pub fn reset(&mut self) {
        self.reset_to(self.defaults.bounds);
    }

    /// Like [`reset`](Self::reset), but rebuild inside `bounds` instead of the
    /// configured container size.
    ///
    /// Errors (leaving the simulation untouched) if `bounds` cannot hold a
    /// particle of the default maximum radius.
    pub fn reset_within(&mut self, bounds: [f64; DIM]) -> Result<()> {
        validate_bounds(&bounds, self.defaults.radius_range.max())?;
        self.reset_to(bounds);
        Ok(())
    }

    fn reset_to(&mut self, bounds: [f64; DIM]) {
        self.bounds = bounds;
        self.temperature_k = self.defaults.temperature_k;
        self.radius_range = self.defaults.radius_range;
        self.window_collisions = 0;
        self.wall_collisions_total = 0;
        self.pair_collisions_total = 0;
        self.ticks = 0;
        self.particles.clear();
        self.next_id = 0;
        self.spawn_particles(self.defaults.particle_count);
        info!(
            count = self.particles.len(),
            bounds = ?self.bounds,
            "simulation reset to defaults"
        );
    }

    /// Wall collisions since the last [`take_window_collisions`](Self::take_window_collisions).
    pub fn window_collisions(&self) -> u64 {
        self.window_collisions
    }

    /// Drain the pressure-window collision counter.
    pub fn take_window_collisions(&mut self) -> u64 {
        std::mem::take(&mut self.window_collisions)
    }

    pub fn bounds(&self) -> [f64; DIM] {
        self.bounds
    }

    pub fn temperature(&self) -> f64 {
        self.temperature_k
    }

    pub fn radius_range(&self) -> RadiusRange {
        self.radius_range
    }

    /// The values `reset` restores.
    pub fn defaults(&self) -> &SimConfig {
        &self.defaults
    }

    /// Number of particles.
    pub fn num_particles(&self) -> usize {
        self.particles.len()
    }

    /// Ticks advanced since creation or the last reset.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn wall_collisions_total(&self) -> u64 {
        self.wall_collisions_total
    }

    pub fn pair_collisions_total(&self) -> u64 {
        self.pair_collisions_total
    }

    /// Positions as a Vec of fixed-size arrays.
    pub fn positions(&self) -> Vec<[f64; DIM]> {
        self.particles.iter().map(|p| p.r).collect()
    }

    /// Velocities as a Vec of fixed-size arrays.
    pub fn velocities(&self) -> Vec<[f64; DIM]> {
        self.particles.iter().map(|p| p.v).collect()
    }

    /// Compute total kinetic energy (diagnostic).
    pub fn kinetic_energy(&self) -> f64 {
        self.particles.iter().map(|p| p.kinetic_energy()).sum()
    }

    // ============ Internal helpers ============

    fn spawn_particles(&mut self, count: usize) {
        self.particles.reserve(count);
        let margin = self.radius_range.max();
        for _ in 0..count {
            let mut r = [0.0_f64; DIM];
            for (k, r_k) in r.iter_mut().enumerate() {
                let lo = margin;
                let hi = self.bounds[k] - margin;
                *r_k = if lo < hi {
                    self.rng.random_range(lo..=hi)
                } else {
                    0.5 * self.bounds[k]
                };
            }
            let p = Particle::spawn(
                self.next_id,
                r,
                self.temperature_k,
                &self.radius_range,
                &mut self.rng,
            );
            debug!(
                id = p.id,
                x = p.r[0],
                y = p.r[1],
                radius = p.radius(),
                speed = p.speed(),
                "particle spawned"
            );
            self.next_id = self.next_id.wrapping_add(1);
            self.particles.push(p);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(count: usize, seed: u64) -> SimConfig {
        SimConfig {
            particle_count: count,
            seed: Some(seed),
            ..SimConfig::default()
        }
    }

    #[test]
    fn make_small_sim_ok() -> Result<()> {
        let mut sim = Simulation::new(seeded(4, 1234))?;
        assert_eq!(sim.num_particles(), 4);
        assert!(sim.kinetic_energy().is_finite());
        let report = sim.step();
        assert_eq!(report.tick, 1);
        assert_eq!(sim.ticks(), 1);
        Ok(())
    }

    #[test]
    fn spawned_positions_respect_max_radius_margin() -> Result<()> {
        let sim = Simulation::new(seeded(200, 2))?;
        let bounds = sim.bounds();
        for p in &sim.particles {
            for k in 0..DIM {
                assert!(p.r[k] >= 7.0 && p.r[k] <= bounds[k] - 7.0);
            }
        }
        Ok(())
    }

    #[test]
    fn wall_events_feed_window_counter() -> Result<()> {
        let mut sim = Simulation::new(seeded(0, 3))?;
        sim.particles.push(Particle::new(42, [6.0, 200.0], [-3.0, 0.0], 5.0)?);
        let report = sim.step();
        assert_eq!(report.wall_collisions(), 1);
        assert_eq!(
            report.events[0],
            CollisionEvent::Wall { i: 42, wall_id: 0 }
        );
        assert_eq!(sim.window_collisions(), 1);
        assert_eq!(sim.take_window_collisions(), 1);
        assert_eq!(sim.window_collisions(), 0);
        assert_eq!(sim.wall_collisions_total(), 1);
        Ok(())
    }

    #[test]
    fn pair_events_carry_ids() -> Result<()> {
        let mut sim = Simulation::new(seeded(0, 4))?;
        sim.particles.push(Particle::new(10, [100.0, 100.0], [1.0, 0.0], 5.0)?);
        sim.particles.push(Particle::new(11, [109.0, 100.0], [-1.0, 0.0], 5.0)?);
        let report = sim.step();
        assert_eq!(report.events, vec![CollisionEvent::Pair { i: 10, j: 11 }]);
        assert_eq!(sim.pair_collisions_total(), 1);
        assert_eq!(sim.window_collisions(), 0);
        Ok(())
    }

    #[test]
    fn negative_temperature_clamped_nan_rejected() -> Result<()> {
        let mut sim = Simulation::new(seeded(1, 5))?;
        sim.set_temperature(-20.0)?;
        assert_eq!(sim.temperature(), 0.0);
        assert!(sim.set_temperature(f64::NAN).is_err());
        assert_eq!(sim.temperature(), 0.0);
        Ok(())
    }

    #[test]
    fn radius_range_too_large_for_box_rejected() -> Result<()> {
        let mut sim = Simulation::new(seeded(1, 6))?;
        assert!(sim.set_radius_range(4.0, 300.0).is_err());
        assert_eq!(sim.radius_range(), RadiusRange::default());
        Ok(())
    }

    #[test]
    fn reinitialize_applies_new_radii() -> Result<()> {
        let mut sim = Simulation::new(seeded(30, 7))?;
        sim.set_radius_range(2.0, 3.0)?;
        assert!(sim.particles.iter().any(|p| p.radius() > 3.0));
        sim.reinitialize();
        assert_eq!(sim.num_particles(), 30);
        assert!(sim
            .particles
            .iter()
            .all(|p| p.radius() >= 2.0 && p.radius() <= 3.0));
        assert_eq!(sim.particles[0].id, 0);
        Ok(())
    }

    #[test]
    fn reset_within_rebuilds_in_given_box() -> Result<()> {
        let mut sim = Simulation::new(seeded(40, 10))?;
        sim.set_particle_count(5);
        sim.reset_within([1000.0, 562.5])?;
        assert_eq!(sim.bounds(), [1000.0, 562.5]);
        assert_eq!(sim.num_particles(), 40);
        assert!(sim
            .particles
            .iter()
            .all(|p| p.r[0] <= 1000.0 - 7.0 && p.r[1] <= 562.5 - 7.0));
        assert!(sim.reset_within([12.0, 12.0]).is_err());
        assert_eq!(sim.bounds(), [1000.0, 562.5]);
        Ok(())
    }

    #[test]
    fn resize_rejects_box_smaller_than_a_particle() -> Result<()> {
        let mut sim = Simulation::new(seeded(5, 8))?;
        assert!(sim.resize([10.0, 10.0]).is_err());
        assert!(sim.resize([f64::INFINITY, 10.0]).is_err());
        assert_eq!(sim.bounds(), [800.0, 450.0]);
        Ok(())
    }
}
