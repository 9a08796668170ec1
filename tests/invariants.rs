use std::collections::HashSet;

use gasbox::config::SimConfig;
use gasbox::core::Simulation;
use gasbox::error::Result;

fn sim_with(count: usize, temperature_k: f64, seed: u64) -> Result<Simulation> {
    Simulation::new(SimConfig {
        particle_count: count,
        temperature_k,
        seed: Some(seed),
        ..SimConfig::default()
    })
}

fn assert_contained(sim: &Simulation) {
    let b = sim.bounds();
    for p in &sim.particles {
        for k in 0..2 {
            assert!(
                p.r[k] >= p.radius() && p.r[k] <= b[k] - p.radius(),
                "particle {} escaped on axis {k}: r={:?} radius={} bounds={:?}",
                p.id,
                p.r,
                p.radius(),
                b
            );
        }
    }
}

/// Hot, crowded gas: nobody ends a tick outside the container.
#[test]
fn particles_stay_inside_after_every_tick() -> Result<()> {
    let mut sim = sim_with(150, 2000.0, 2024)?;
    for _ in 0..300 {
        let report = sim.step();
        assert_contained(&sim);
        assert!(report.events.len() >= report.wall_collisions());
    }
    assert!(sim.pair_collisions_total() > 0);
    assert!(sim.wall_collisions_total() > 0);
    Ok(())
}

#[test]
fn containment_survives_shrinking_volume() -> Result<()> {
    let mut sim = sim_with(120, 800.0, 77)?;
    for _ in 0..20 {
        sim.step();
    }
    sim.resize([200.0, 112.5])?;
    assert_contained(&sim);
    for _ in 0..50 {
        sim.step();
        assert_contained(&sim);
    }
    Ok(())
}

/// Wall and pair responses only ever remove kinetic energy.
#[test]
fn collision_resolution_never_adds_energy() -> Result<()> {
    let mut sim = sim_with(200, 1500.0, 5)?;
    let bounds = sim.bounds();
    for _ in 0..20 {
        for p in &mut sim.particles {
            p.drift();
        }
        let e0 = sim.kinetic_energy();
        let mut hits = 0usize;
        for p in &mut sim.particles {
            hits += p.resolve_wall_collision(&bounds).iter().flatten().count();
        }
        let n = sim.particles.len();
        for i in 0..n {
            let (head, tail) = sim.particles.split_at_mut(i + 1);
            for other in tail.iter_mut() {
                if head[i].resolve_pair_collision(other) {
                    hits += 1;
                }
            }
        }
        let e1 = sim.kinetic_energy();
        assert!(e1 <= e0 + 1e-9 * e0.max(1.0), "energy rose: {e0} -> {e1}");
        if hits > 0 {
            assert!(e1 < e0);
        }
    }
    Ok(())
}

/// With the thermostat at 0 K the damped gas cools every tick.
#[test]
fn energy_decays_when_cooling() -> Result<()> {
    let mut sim = sim_with(100, 400.0, 99)?;
    sim.set_temperature(0.0)?;
    let mut prev = sim.kinetic_energy();
    for _ in 0..40 {
        sim.step();
        let e = sim.kinetic_energy();
        assert!(e <= prev, "kinetic energy increased from {prev} to {e}");
        prev = e;
    }
    Ok(())
}

#[test]
fn set_particle_count_is_idempotent() -> Result<()> {
    let mut sim = sim_with(30, 298.0, 8)?;
    sim.set_particle_count(55);
    let ids: Vec<u32> = sim.particles.iter().map(|p| p.id).collect();
    sim.set_particle_count(55);
    assert_eq!(sim.num_particles(), 55);
    let again: Vec<u32> = sim.particles.iter().map(|p| p.id).collect();
    assert_eq!(ids, again);

    sim.set_particle_count(12);
    sim.set_particle_count(12);
    assert_eq!(sim.num_particles(), 12);
    assert_eq!(sim.particles.last().map(|p| p.id), Some(11));
    Ok(())
}

#[test]
fn ids_stay_unique_across_grow_and_shrink() -> Result<()> {
    let mut sim = sim_with(10, 298.0, 12)?;
    sim.set_particle_count(50);
    sim.set_particle_count(20);
    sim.set_particle_count(40);
    let ids: HashSet<u32> = sim.particles.iter().map(|p| p.id).collect();
    assert_eq!(ids.len(), 40);
    assert!(ids.contains(&19) && !ids.contains(&20) && ids.contains(&50));
    sim.set_particle_count(0);
    assert_eq!(sim.num_particles(), 0);
    let report = sim.step();
    assert!(report.events.is_empty());
    Ok(())
}

#[test]
fn resize_preserves_relative_positions() -> Result<()> {
    let mut sim = sim_with(60, 298.0, 21)?;
    let before: Vec<([f64; 2], f64)> = sim.particles.iter().map(|p| (p.r, p.radius())).collect();
    let new_bounds = [1200.0, 675.0];
    sim.resize(new_bounds)?;
    assert_eq!(sim.bounds(), new_bounds);
    for (p, (r0, radius)) in sim.particles.iter().zip(before) {
        for k in 0..2 {
            let scaled = r0[k] * 1.5;
            let expected = scaled.clamp(radius, new_bounds[k] - radius);
            assert!((p.r[k] - expected).abs() < 1e-9);
        }
    }
    Ok(())
}

#[test]
fn seeded_runs_are_deterministic() -> Result<()> {
    let mut a = sim_with(40, 600.0, 4242)?;
    let mut b = sim_with(40, 600.0, 4242)?;
    for _ in 0..100 {
        assert_eq!(a.step(), b.step());
    }
    assert_eq!(a.positions(), b.positions());
    assert_eq!(a.velocities(), b.velocities());
    Ok(())
}

#[test]
fn reset_restores_defaults() -> Result<()> {
    let mut sim = sim_with(25, 298.0, 3)?;
    sim.set_temperature(1000.0)?;
    sim.set_particle_count(70);
    sim.set_radius_range(2.0, 3.0)?;
    sim.resize([400.0, 225.0])?;
    for _ in 0..10 {
        sim.step();
    }
    sim.reset();
    assert_eq!(sim.temperature(), 298.0);
    assert_eq!(sim.num_particles(), 25);
    assert_eq!(sim.bounds(), [800.0, 450.0]);
    assert_eq!((sim.radius_range().min(), sim.radius_range().max()), (4.0, 7.0));
    assert_eq!(sim.window_collisions(), 0);
    assert_eq!(sim.wall_collisions_total(), 0);
    assert_eq!(sim.ticks(), 0);
    assert!(sim.particles.iter().all(|p| p.radius() >= 4.0));
    Ok(())
}
