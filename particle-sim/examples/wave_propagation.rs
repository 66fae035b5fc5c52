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
//! Membrane Wave Example
//!
//! A square membrane of 30×30 particles with a clamped border. Springs to
//! the right and upper neighbours have a rest length of a tenth of the grid
//! spacing, which puts the membrane under tension. The centre node is driven
//! sinusoidally along z between steps; the resulting transverse waves spread
//! outward and reflect off the clamped edge.
//!
//! # Running
//!
//! ```bash
//! cargo run --example wave_propagation --release
//! ```

use particle_sim::{ParticleId, ParticleSpec, Simulation};
use std::f64::consts::PI;

const DT: f64 = 0.005;
const NX: usize = 30;
const NY: usize = 30;
/// Physical width and height
const LX: f64 = 3.0;
const LY: f64 = 3.0;
const K: f64 = 100.0;
const MASS: f64 = 1.0;
const DRIVE_PERIOD: f64 = 1.0;
const DRIVE_AMPLITUDE: f64 = 0.1;
const STEPS: usize = 2000;

const DX: f64 = LX / NX as f64;
const DY: f64 = LY / NY as f64;

/// Row-major grid index
fn idx(i: usize, j: usize) -> usize {
    NY * i + j
}

/// Distance from the centre to the wavefront
fn wavefront_radius(sim: &Simulation, threshold: f64) -> f64 {
    sim.particles()
        .iter()
        .filter(|p| p.position().z.abs() > threshold)
        .map(|p| (p.position().x.powi(2) + p.position().y.powi(2)).sqrt())
        .fold(0.0, f64::max)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut sim: Simulation = Simulation::new(DT)?;

    let mut grid: Vec<ParticleId> = Vec::with_capacity(NX * NY);
    for i in 0..NX {
        for j in 0..NY {
            let border = i == 0 || j == 0 || i == NX - 1 || j == NY - 1;
            let position = [-LX / 2.0 + i as f64 * DX, -LY / 2.0 + j as f64 * DY, 0.0];
            grid.push(sim.add_particle(ParticleSpec::new(MASS, position).movable(!border))?);
        }
    }

    for i in 0..NX - 1 {
        for j in 0..NY - 1 {
            let p = grid[idx(i, j)];
            sim.add_spring_with_rest_length(p, grid[idx(i + 1, j)], K, DX * 0.1)?;
            sim.add_spring_with_rest_length(p, grid[idx(i, j + 1)], K, DY * 0.1)?;
        }
    }
    let middle = grid[idx(NX / 2, NY / 2)];

    println!(
        "Membrane: {} particles ({} movable), {} springs",
        sim.particle_count(),
        sim.movable_particles().count(),
        sim.springs().len()
    );
    println!();
    println!("{:>7}  {:>9}  {:>10}  {:>10}", "t", "drive z", "front r", "energy");

    for step in 0..STEPS {
        let z = DRIVE_AMPLITUDE * (2.0 * PI / DRIVE_PERIOD * sim.time()).sin();
        let mut driven = sim.particles()[middle].position();
        driven.z = z;
        sim.set_position(middle, driven)?;
        sim.update()?;

        if (step + 1) % 200 == 0 {
            println!(
                "{:>7.2}  {:>+9.4}  {:>10.3}  {:>10.4}",
                sim.time(),
                z,
                wavefront_radius(&sim, 1e-3),
                sim.energy().total()
            );
        }
    }
    Ok(())
}
