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
//! Gyroscope Precession Example
//!
//! A spinning wheel of four masses sits at the end of an axle of length L1
//! whose far end is pinned to a fixed pivot. Under gravity the spinning
//! wheel does not fall but precesses around the pivot.
//!
//! Alongside the particle model, a two-angle rigid-body model of the same
//! gyroscope is integrated with the same time step. The example prints the
//! particle model's centre of mass next to the rigid-body prediction.
//!
//! # Running
//!
//! ```bash
//! cargo run --example gyroscope --release
//! ```

use particle_sim::field::{UniformField, STANDARD_GRAVITY};
use particle_sim::{ParticleSpec, Simulation, Vector3};

const DT: f64 = 1e-5;
const K: f64 = 1e6;
/// Rim speed of the wheel masses
const V_ROT: f64 = 30.0;
const MASS: f64 = 1.0;
/// Axle length
const L1: f64 = 3.0;
/// Wheel radius
const L2: f64 = 1.0;
const STEPS: usize = 300_000;
const REPORT_EVERY: usize = 25_000;

/// Rigid-body gyroscope described by precession angle θ and elevation φ
struct Precession {
    theta: f64,
    theta_rate: f64,
    phi: f64,
    phi_rate: f64,
    /// Spin rate about the axle
    spin: f64,
    /// Moment of inertia about the axle
    i3: f64,
    /// Moment of inertia about the pivot, perpendicular to the axle
    i1: f64,
    /// Mass carried by the axle
    mass: f64,
}

impl Precession {
    fn new() -> Self {
        let mass = 5.0 * MASS;
        let i3 = 4.0 * MASS * L2 * L2;
        Precession {
            theta: 0.0,
            theta_rate: 0.0,
            phi: 0.0,
            phi_rate: 0.0,
            spin: V_ROT / L2,
            i3,
            i1: i3 / 2.0 + mass * L1 * L1,
            mass,
        }
    }

    fn step(&mut self, dt: f64) {
        let ratio = self.i3 / self.i1;
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let theta_acc = self.phi_rate / cos_phi * (2.0 * self.theta_rate * sin_phi - ratio * self.spin);
        let phi_acc = self.theta_rate * cos_phi * (-self.theta_rate * sin_phi + ratio * self.spin)
            - self.mass * STANDARD_GRAVITY * L1 / self.i1 * cos_phi;

        self.phi_rate += phi_acc * dt;
        self.phi += self.phi_rate * dt;
        self.theta_rate += theta_acc * dt;
        self.theta += self.theta_rate * dt;
    }

    /// Wheel centre in the particle model's frame (z up)
    fn wheel_centre(&self) -> Vector3 {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        Vector3::new(L1 * cos_phi * cos_theta, L1 * cos_phi * sin_theta, L1 * sin_phi)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut sim: Simulation = Simulation::new(DT)?;
    sim.add_field(UniformField::gravity(STANDARD_GRAVITY));

    let pivot = sim.add_particle(ParticleSpec::new(MASS, [0.0, 0.0, 0.0]).fixed())?;
    let hub = sim.add_particle(ParticleSpec::new(MASS, [L1, 0.0, 0.0]))?;
    let rim = [
        sim.add_particle(ParticleSpec::new(MASS, [L1, L2, 0.0]).velocity([0.0, 0.0, V_ROT]))?,
        sim.add_particle(ParticleSpec::new(MASS, [L1, 0.0, L2]).velocity([0.0, -V_ROT, 0.0]))?,
        sim.add_particle(ParticleSpec::new(MASS, [L1, -L2, 0.0]).velocity([0.0, 0.0, -V_ROT]))?,
        sim.add_particle(ParticleSpec::new(MASS, [L1, 0.0, -L2]).velocity([0.0, V_ROT, 0.0]))?,
    ];

    sim.add_spring(pivot, hub, K)?;
    for (i, &p) in rim.iter().enumerate() {
        sim.add_spring(hub, p, K)?;
        sim.add_spring(p, rim[(i + 1) % rim.len()], K)?;
        sim.add_spring(pivot, p, K)?;
    }

    let wheel = [hub, rim[0], rim[1], rim[2], rim[3]];
    let mut model = Precession::new();

    println!("Gyroscope: {} springs, spin rate {} rad/s", sim.springs().len(), model.spin);
    println!();
    println!("{:>7}  {:>30}  {:>30}  {:>8}", "t", "centre of mass", "rigid-body prediction", "gap");

    for step in 0..STEPS {
        sim.update()?;
        model.step(DT);
        if (step + 1) % REPORT_EVERY == 0 {
            let Some(com) = sim.center_of_mass(&wheel) else {
                break;
            };
            let predicted = model.wheel_centre();
            println!(
                "{:>7.3}  {:>30}  {:>30}  {:>8.4}",
                sim.time(),
                format!("{:.4}", com.position),
                format!("{:.4}", predicted),
                com.position.distance(predicted)
            );
        }
    }
    Ok(())
}
