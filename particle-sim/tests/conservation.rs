// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Integration tests verifying energy and momentum behaviour of the stepper

use particle_sim::diagnostics::EnergyHistory;
use particle_sim::{ParticleId, ParticleSpec, Simulation, SimulationConfig, Vector3};

/// Two unit masses one unit apart joined by a spring of rest length 0.8
fn stretched_pair(config: SimulationConfig) -> Simulation {
    let mut sim = Simulation::from_config(config).unwrap();
    let a = sim.add_particle(ParticleSpec::new(1.0, [0.0, 0.0, 0.0])).unwrap();
    let b = sim.add_particle(ParticleSpec::new(1.0, [1.0, 0.0, 0.0])).unwrap();
    sim.add_spring_with_rest_length(a, b, 100.0, 0.8).unwrap();
    sim
}

/// Collinear chain of `n` unit masses, every spring stretched by 20%
fn stretched_chain(n: usize, config: SimulationConfig) -> Simulation {
    let mut sim = Simulation::from_config(config).unwrap();
    let ids: Vec<ParticleId> = (0..n)
        .map(|i| sim.add_particle(ParticleSpec::new(1.0, [i as f64 * 1.2, 0.0, 0.0])).unwrap())
        .collect();
    for pair in ids.windows(2) {
        sim.add_spring_with_rest_length(pair[0], pair[1], 100.0, 1.0).unwrap();
    }
    sim
}

/// Largest relative deviation of total energy over a run of `duration` seconds
fn max_relative_deviation(mut sim: Simulation, duration: f64) -> f64 {
    let initial = sim.energy().total();
    let steps = (duration / sim.time_step()).round() as usize;
    let mut worst: f64 = 0.0;
    for _ in 0..steps {
        sim.update().unwrap();
        worst = worst.max((sim.energy().total() - initial).abs() / initial);
    }
    worst
}

#[test]
fn test_undamped_pair_conserves_energy() {
    let deviation = max_relative_deviation(stretched_pair(SimulationConfig::new(1e-4)), 2.0);
    assert!(
        deviation < 5e-3,
        "Energy deviation {:.3e} exceeds tolerance",
        deviation
    );
}

#[test]
fn test_energy_error_shrinks_with_time_step() {
    let coarse = max_relative_deviation(stretched_pair(SimulationConfig::new(1e-3)), 1.0);
    let fine = max_relative_deviation(stretched_pair(SimulationConfig::new(1e-4)), 1.0);

    // Symplectic Euler energy error is first order in dt
    assert!(fine > 0.0);
    assert!(
        coarse > 3.0 * fine,
        "Expected error to shrink with dt: coarse = {:.3e}, fine = {:.3e}",
        coarse,
        fine
    );
}

#[test]
fn test_energy_stays_bounded_over_long_runs() {
    // Many oscillation periods; drift must not accumulate
    let mut sim = stretched_chain(4, SimulationConfig::new(1e-3));
    let initial = sim.energy().total();
    let mut history = EnergyHistory::new(100);
    for _ in 0..50 {
        sim.step_n(1000).unwrap();
        history.record(sim.time(), sim.energy());
    }
    let last = history.latest().unwrap().energy.total();
    assert!((last - initial).abs() / initial < 2e-2);
    assert!(history.max_drift() / initial < 4e-2);
}

#[test]
fn test_damped_pair_energy_is_non_increasing() {
    let mut sim = stretched_pair(SimulationConfig::new(1e-4).with_damping(0.5));
    let initial = sim.energy().total();
    let mut previous = initial;
    for step in 0..20_000 {
        sim.update().unwrap();
        let current = sim.energy().total();
        assert!(
            current <= previous + 1e-12 * initial,
            "Energy rose at step {}: {} -> {}",
            step,
            previous,
            current
        );
        previous = current;
    }
    assert!(previous < 0.5 * initial, "Damping removed too little energy");
}

#[test]
fn test_damped_chain_energy_is_non_increasing() {
    let mut sim = stretched_chain(5, SimulationConfig::new(1e-4).with_damping(0.8));
    let mut history = EnergyHistory::new(20_000);
    history.record(0.0, sim.energy());
    for _ in 0..10_000 {
        sim.update().unwrap();
        history.record(sim.time(), sim.energy());
    }
    let initial = history.samples().next().unwrap().energy.total();
    assert!(history.is_non_increasing(1e-12 * initial));
}

#[test]
fn test_zero_dissipation_matches_undamped_run() {
    let mut damped = stretched_pair(SimulationConfig::new(1e-4).with_damping(0.0));
    let mut undamped = stretched_pair(SimulationConfig::new(1e-4));
    damped.step_n(1000).unwrap();
    undamped.step_n(1000).unwrap();
    assert_eq!(damped.energy(), undamped.energy());
}

#[test]
fn test_springs_conserve_linear_momentum() {
    let mut sim: Simulation = Simulation::new(1e-3).unwrap();
    let a = sim
        .add_particle(ParticleSpec::new(1.0, [0.0, 0.0, 0.0]).velocity([0.3, 0.0, -0.1]))
        .unwrap();
    let b = sim
        .add_particle(ParticleSpec::new(2.5, [1.0, 0.5, 0.0]).velocity([0.0, 1.0, 0.0]))
        .unwrap();
    let c = sim
        .add_particle(ParticleSpec::new(0.7, [0.2, 1.3, 0.4]).velocity([-0.4, 0.0, 0.2]))
        .unwrap();
    sim.add_spring_with_rest_length(a, b, 80.0, 0.9).unwrap();
    sim.add_spring_with_rest_length(b, c, 40.0, 1.4).unwrap();
    sim.add_spring_with_rest_length(c, a, 60.0, 1.0).unwrap();

    let initial = sim.momentum();
    sim.step_n(5000).unwrap();
    assert!((sim.momentum() - initial).norm() < 1e-10);
}

#[test]
fn test_center_of_mass_moves_uniformly() {
    let mut sim = stretched_chain(3, SimulationConfig::new(1e-3));
    let ids: Vec<ParticleId> = sim.particles().iter().map(|p| p.id()).collect();
    sim.set_velocity(ids[0], [0.0, 3.0, 0.0]).unwrap();

    let start = sim.center_of_mass(&ids).unwrap();
    sim.step_n(1000).unwrap();
    let end = sim.center_of_mass(&ids).unwrap();

    assert!((end.velocity - start.velocity).norm() < 1e-10);
    let expected = start.position + start.velocity * sim.time();
    assert!((end.position - expected).norm() < 1e-8);
    assert_eq!(end.mass, 3.0);
    assert_eq!(start.velocity, Vector3::new(0.0, 1.0, 0.0));
}
