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
//! Intermediate Axis Theorem Example
//!
//! Five point masses held together by very stiff springs form a nearly rigid
//! body: a centre particle, two light side particles along ±x and two heavy
//! particles along ±y. Spinning the heavy pair about the intermediate axis
//! with a tiny perturbation produces the periodic flips known as the
//! Dzhanibekov effect.
//!
//! The flips show up as sign changes of the side particle's x coordinate.
//!
//! # Running
//!
//! ```bash
//! cargo run --example dzhanibekov --release
//! ```

use particle_sim::{ParticleSpec, Simulation};

const DT: f64 = 5e-5;
/// ±x offset of the light side masses
const D1: f64 = 1.0;
/// ±y offset of the heavy masses
const D2: f64 = 1.0;
const M1: f64 = 1.0;
const M2: f64 = 2.0;
const K_SPRING: f64 = 1e6;
/// Initial z velocity of the upper heavy mass (the lower one gets −V_Z)
const V_Z: f64 = 10.0;
/// Perturbation of the x and y velocity components
const DV_XY: f64 = 0.001;
const STEPS: usize = 400_000;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut sim: Simulation = Simulation::new(DT)?;

    let centre = sim.add_particle(ParticleSpec::new(M1, [0.0, 0.0, 0.0]))?;
    let right = sim.add_particle(ParticleSpec::new(M1, [D1, 0.0, 0.0]))?;
    let left = sim.add_particle(ParticleSpec::new(M1, [-D1, 0.0, 0.0]))?;
    let top = sim.add_particle(ParticleSpec::new(M2, [0.0, D2, 0.0]).velocity([DV_XY, DV_XY, V_Z]))?;
    let bottom =
        sim.add_particle(ParticleSpec::new(M2, [0.0, -D2, 0.0]).velocity([-DV_XY, -DV_XY, -V_Z]))?;

    for (a, b) in [
        (centre, right),
        (centre, left),
        (centre, top),
        (centre, bottom),
        (right, top),
        (left, top),
        (right, bottom),
        (left, bottom),
        (right, left),
        (top, bottom),
    ] {
        sim.add_spring(a, b, K_SPRING)?;
    }

    let initial = sim.energy().total();
    println!("Spinning body: {} particles, {} springs, E0 = {:.4}", sim.particle_count(), sim.springs().len(), initial);

    let mut last_sign = 1.0_f64;
    let mut flips = 0;
    for step in 0..STEPS {
        sim.update()?;
        let x = sim.particles()[right].position().x;
        if x.signum() != last_sign {
            flips += 1;
            last_sign = x.signum();
            println!("t = {:>8.4}: side mass flipped to x = {:+.3}", sim.time(), x);
        }
        if (step + 1) % 100_000 == 0 {
            let drift = (sim.energy().total() - initial) / initial;
            log::info!("t = {:.3}, relative energy drift {:.2e}", sim.time(), drift);
        }
    }

    println!();
    println!("{} sign changes in {:.1} s", flips, sim.time());
    Ok(())
}
