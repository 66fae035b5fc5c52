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
//! Charged Orbits Example
//!
//! A heavy positive charge holds two light negative charges in orbit. No
//! springs are involved; the motion comes entirely from the pairwise
//! Coulomb field, with each particle's charge carried as its payload.
//!
//! The two light particles start mirror-symmetric about the x axis, so the
//! trajectories stay mirror-symmetric while they repel each other.
//!
//! # Running
//!
//! ```bash
//! cargo run --example coulomb_orbits --release
//!
//! # Simulate longer
//! cargo run --example coulomb_orbits --release -- --steps 2000000
//! ```

use particle_sim::field::CoulombField;
use particle_sim::{ParticleSpec, Simulation, Vector3};

/// Integrator time step
const DT: f64 = 1e-5;
/// Scaled Coulomb constant (arbitrary units)
const K_COULOMB: f64 = 0.5;
/// Physics steps between printed samples
const REPORT_EVERY: usize = 50_000;

/// Electrostatic potential energy `Σ_{i<j} k q_i q_j / r_ij`
fn electric_potential(sim: &Simulation<f64>) -> f64 {
    let particles = sim.particles().as_slice();
    let mut energy = 0.0;
    for (i, a) in particles.iter().enumerate() {
        for b in &particles[i + 1..] {
            let r = a.position().distance(b.position());
            energy += K_COULOMB * a.payload() * b.payload() / r;
        }
    }
    energy
}

fn parse_steps() -> usize {
    let args: Vec<String> = std::env::args().collect();
    let mut steps = 500_000;
    let mut i = 1;
    while i < args.len() {
        if args[i] == "--steps" {
            match args.get(i + 1).and_then(|s| s.parse().ok()) {
                Some(n) => steps = n,
                None => eprintln!("Warning: --steps requires a positive integer, using {}", steps),
            }
            i += 1;
        }
        i += 1;
    }
    steps
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let steps = parse_steps();

    println!("==========================================================");
    println!("       Charged Particle Orbits");
    println!("==========================================================");
    println!("  dt = {:e}, k = {}, steps = {}", DT, K_COULOMB, steps);
    println!();

    let mut sim: Simulation<f64> = Simulation::new(DT)?;
    sim.add_field(CoulombField::new(K_COULOMB));

    let nucleus = sim.add_particle(ParticleSpec::with_payload(5.0, Vector3::ZERO, 10.0))?;
    let upper = sim.add_particle(
        ParticleSpec::with_payload(1.0, [3.0, -1.0, 0.0], -0.5).velocity([-0.5, 1.0, 0.0]),
    )?;
    let lower = sim.add_particle(
        ParticleSpec::with_payload(1.0, [3.0, 1.0, 0.0], -0.5).velocity([-0.5, -1.0, 0.0]),
    )?;

    let initial = sim.energy().kinetic + electric_potential(&sim);
    println!("{:>8}  {:>28}  {:>28}  {:>12}", "t", "upper", "lower", "E drift");

    for step in 0..steps {
        sim.update()?;
        if (step + 1) % REPORT_EVERY == 0 {
            let total = sim.energy().kinetic + electric_potential(&sim);
            let a = sim.particle(upper).map(|p| p.position()).unwrap_or_default();
            let b = sim.particle(lower).map(|p| p.position()).unwrap_or_default();
            println!(
                "{:>8.3}  {:>28}  {:>28}  {:>12.3e}",
                sim.time(),
                format!("{:.3}", a),
                format!("{:.3}", b),
                (total - initial) / initial.abs()
            );
        }
    }

    if let Some(p) = sim.particle(nucleus) {
        println!();
        println!("Nucleus drifted to {:.4}", p.position());
    }
    println!("Total momentum: {:.3e}", sim.momentum().norm());
    Ok(())
}
