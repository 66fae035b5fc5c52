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
//! Scenario tests: hand-checked single steps and the demo configurations

use particle_sim::field::{CoulombField, UniformField};
use particle_sim::{
    Attributes, Particle, ParticleId, ParticleSpec, Particles, Simulation, Vector3,
};

const EPSILON: f64 = 1e-12;

#[test]
fn test_stretched_pair_first_step() {
    let dt = 1e-4;
    let mut sim: Simulation = Simulation::new(dt).unwrap();
    let a = sim.add_particle(ParticleSpec::new(1.0, [0.0, 0.0, 0.0])).unwrap();
    let b = sim.add_particle(ParticleSpec::new(1.0, [1.0, 0.0, 0.0])).unwrap();
    let s = sim.add_spring_with_rest_length(a, b, 100.0, 0.5).unwrap();

    let initial = sim.energy();
    assert_eq!(initial.kinetic, 0.0);
    assert_eq!(initial.potential, 12.5);

    sim.update().unwrap();

    // |F| = 100 * (1 - 0.5 / 1) = 50 on unit masses
    let va = sim.particles()[a].velocity();
    let vb = sim.particles()[b].velocity();
    assert!((va - Vector3::new(50.0 * dt, 0.0, 0.0)).norm() < EPSILON);
    assert!((vb - Vector3::new(-50.0 * dt, 0.0, 0.0)).norm() < EPSILON);
    assert!((sim.particles()[a].position().x - 50.0 * dt * dt).abs() < EPSILON);
    assert!(sim.spring_length(s).unwrap() < 1.0);

    // A tenth of a second later the pair is still closing and energy is conserved
    sim.step_n(999).unwrap();
    assert!(sim.spring_length(s).unwrap() < 0.7);
    assert!(sim.particles()[a].velocity().x > 0.0);
    let drift = (sim.energy().total() - initial.total()).abs() / initial.total();
    assert!(drift < 1e-3, "relative drift {:.3e}", drift);
}

#[test]
fn test_uniform_gravity_follows_symplectic_recurrence() {
    let dt = 0.01;
    let mut sim: Simulation = Simulation::new(dt).unwrap();
    let p = sim.add_particle(ParticleSpec::new(1.0, [0.0, 0.0, 0.0])).unwrap();
    sim.add_field(UniformField::gravity(9.8));

    for n in 1..=100u32 {
        sim.update().unwrap();
        let n = f64::from(n);
        let particle = &sim.particles()[p];

        let vz = -9.8 * n * dt;
        // Velocity is updated before position, so z_n = -g dt² n(n+1)/2
        let z = -9.8 * dt * dt * n * (n + 1.0) / 2.0;
        assert!((particle.velocity().z - vz).abs() < 1e-9);
        assert!((particle.position().z - z).abs() < 1e-9);
        assert_eq!(particle.position().x, 0.0);
        assert_eq!(particle.position().y, 0.0);
    }

    // Differs from the closed-form kinematics by g dt t / 2
    let t = sim.time();
    let closed_form = -0.5 * 9.8 * t * t;
    let z = sim.particles()[p].position().z;
    assert!((closed_form - z - 0.5 * 9.8 * dt * t).abs() < 1e-9);
}

#[test]
fn test_gravity_is_independent_of_mass() {
    let mut sim: Simulation = Simulation::new(0.01).unwrap();
    let light = sim.add_particle(ParticleSpec::new(0.1, [0.0; 3])).unwrap();
    let heavy = sim.add_particle(ParticleSpec::new(100.0, [1.0, 0.0, 0.0])).unwrap();
    sim.add_field(UniformField::gravity(9.8));
    sim.step_n(50).unwrap();
    assert_eq!(
        sim.particles()[light].position().z,
        sim.particles()[heavy].position().z
    );
}

#[test]
fn test_newtons_third_law_for_unequal_masses() {
    let mut sim: Simulation = Simulation::new(1e-3).unwrap();
    let a = sim.add_particle(ParticleSpec::new(0.3, [0.2, -0.1, 0.5])).unwrap();
    let b = sim.add_particle(ParticleSpec::new(7.0, [-1.0, 0.4, 1.1])).unwrap();
    sim.add_spring_with_rest_length(a, b, 250.0, 0.4).unwrap();

    sim.update().unwrap();
    let pa = sim.particles()[a].momentum();
    let pb = sim.particles()[b].momentum();
    assert!(pa.norm() > 0.0);
    assert!((pa + pb).norm() < EPSILON);

    // Forces act along the connecting axis
    let axis = Vector3::new(-1.2, 0.5, 0.6);
    let cross = Vector3::new(
        pa.y * axis.z - pa.z * axis.y,
        pa.z * axis.x - pa.x * axis.z,
        pa.x * axis.y - pa.y * axis.x,
    );
    assert!(cross.norm() < EPSILON);
}

#[test]
fn test_fixed_anchor_holds_pendulum() {
    let mut sim: Simulation = Simulation::new(1e-3).unwrap();
    let anchor = sim
        .add_particle(ParticleSpec::new(1.0, [0.0, 0.0, 0.0]).fixed())
        .unwrap();
    let bob = sim.add_particle(ParticleSpec::new(1.0, [1.0, 0.0, 0.0])).unwrap();
    let s = sim.add_spring(anchor, bob, 1e4).unwrap();
    sim.add_field(UniformField::gravity(9.8));

    // Roughly a quarter period of a pendulum released from horizontal
    sim.step_n(590).unwrap();
    assert_eq!(sim.particles()[anchor].position(), Vector3::ZERO);
    assert_eq!(sim.particles()[anchor].velocity(), Vector3::ZERO);

    let bob = &sim.particles()[bob];
    assert!(bob.position().z < -0.5, "bob should have swung down");
    // Stiff spring: length stays close to rest
    assert!((sim.spring_length(s).unwrap() - 1.0).abs() < 1e-2);
}

#[test]
fn test_energy_query_is_idempotent() {
    let mut sim: Simulation = Simulation::new(1e-3).unwrap();
    let a = sim
        .add_particle(ParticleSpec::new(1.0, [0.0; 3]).velocity([0.1, 0.2, 0.3]))
        .unwrap();
    let b = sim.add_particle(ParticleSpec::new(2.0, [1.5, 0.0, 0.0])).unwrap();
    sim.add_spring_with_rest_length(a, b, 10.0, 1.0).unwrap();
    sim.step_n(10).unwrap();

    let first = sim.energy();
    let snapshot = sim.snapshot();
    assert_eq!(sim.energy(), first);
    assert_eq!(sim.energy(), first);
    assert_eq!(sim.snapshot(), snapshot);
    assert_eq!(sim.step_count(), 10);

    let (kinetic, potential): (f64, f64) = first.into();
    assert!(kinetic > 0.0 && potential > 0.0);
}

#[test]
fn test_fields_see_earlier_particles_already_advanced() {
    let dt = 0.5;
    let mut sim: Simulation = Simulation::new(dt).unwrap();
    let leader = sim
        .add_particle(ParticleSpec::new(1.0, [0.0; 3]).velocity([1.0, 0.0, 0.0]))
        .unwrap();
    let follower = sim.add_particle(ParticleSpec::new(1.0, [0.0, 5.0, 0.0])).unwrap();
    // The follower accelerates by the leader's current x coordinate
    sim.add_field_fn("follow", move |p: &Particle, all: Particles<'_, ()>| {
        if p.id() == follower {
            Vector3::new(all[leader].position().x, 0.0, 0.0)
        } else {
            Vector3::ZERO
        }
    });

    sim.update().unwrap();
    // The leader moved to x = 0.5 before the follower was evaluated
    assert_eq!(sim.particles()[leader].position().x, 0.5);
    assert_eq!(sim.particles()[follower].velocity().x, 0.25);
}

#[test]
fn test_driven_node_excites_membrane() {
    const N: usize = 7;
    let mut sim: Simulation = Simulation::new(0.005).unwrap();
    let mut grid = Vec::new();
    for i in 0..N {
        for j in 0..N {
            let border = i == 0 || j == 0 || i == N - 1 || j == N - 1;
            let spec = ParticleSpec::new(1.0, [i as f64 * 0.1, j as f64 * 0.1, 0.0]).movable(!border);
            grid.push(sim.add_particle(spec).unwrap());
        }
    }
    for i in 0..N - 1 {
        for j in 0..N - 1 {
            let p = grid[N * i + j];
            sim.add_spring_with_rest_length(p, grid[N * (i + 1) + j], 100.0, 0.01).unwrap();
            sim.add_spring_with_rest_length(p, grid[N * i + j + 1], 100.0, 0.01).unwrap();
        }
    }
    let centre = grid[N * (N / 2) + N / 2];
    let corner = grid[0];

    for _ in 0..100 {
        let mut driven = sim.particles()[centre].position();
        driven.z = 0.1 * (2.0 * std::f64::consts::PI * sim.time()).sin();
        sim.set_position(centre, driven).unwrap();
        sim.update().unwrap();
    }

    let neighbour = grid[N * (N / 2) + N / 2 + 1];
    assert!(sim.particles()[neighbour].position().z.abs() > 1e-4);
    assert_eq!(sim.particles()[corner].position(), Vector3::ZERO);
    assert!(sim.energy().total() > 0.0);
}

#[test]
fn test_charged_satellites_stay_mirror_symmetric() {
    let mut sim: Simulation<Attributes> = Simulation::new(1e-5).unwrap();
    sim.add_field(CoulombField::new(0.5));
    let charged = |q: f64| Attributes::new().with("charge", q);

    sim.add_particle(ParticleSpec::with_payload(5.0, [0.0; 3], charged(10.0)))
        .unwrap();
    let upper = sim
        .add_particle(
            ParticleSpec::with_payload(1.0, [3.0, -1.0, 0.0], charged(-0.5)).velocity([-0.5, 1.0, 0.0]),
        )
        .unwrap();
    let lower = sim
        .add_particle(
            ParticleSpec::with_payload(1.0, [3.0, 1.0, 0.0], charged(-0.5)).velocity([-0.5, -1.0, 0.0]),
        )
        .unwrap();

    sim.step_n(10_000).unwrap();
    let pu = sim.particles()[upper].position();
    let pl = sim.particles()[lower].position();
    assert!((pu.x - pl.x).abs() < 1e-6);
    assert!((pu.y + pl.y).abs() < 1e-6);
    // Attracted towards the nucleus on top of the initial inward drift
    assert!(pu.x < 3.0 - 0.5 * sim.time());
}

#[test]
fn test_uncharged_particles_ignore_coulomb_field() {
    let mut sim: Simulation<f64> = Simulation::new(1e-3).unwrap();
    sim.add_field(CoulombField::new(1.0));
    let neutral = sim.add_particle(ParticleSpec::with_payload(1.0, [1.0, 0.0, 0.0], 0.0)).unwrap();
    sim.add_particle(ParticleSpec::with_payload(1.0, [0.0; 3], 3.0)).unwrap();
    sim.step_n(100).unwrap();
    assert_eq!(sim.particles()[neutral].position(), Vector3::new(1.0, 0.0, 0.0));
}

#[test]
fn test_spinning_rigid_body_stays_rigid() {
    let mut sim: Simulation = Simulation::new(5e-5).unwrap();
    let centre = sim.add_particle(ParticleSpec::new(1.0, [0.0, 0.0, 0.0])).unwrap();
    let right = sim.add_particle(ParticleSpec::new(1.0, [1.0, 0.0, 0.0])).unwrap();
    let left = sim.add_particle(ParticleSpec::new(1.0, [-1.0, 0.0, 0.0])).unwrap();
    let top = sim
        .add_particle(ParticleSpec::new(2.0, [0.0, 1.0, 0.0]).velocity([0.001, 0.001, 10.0]))
        .unwrap();
    let bottom = sim
        .add_particle(ParticleSpec::new(2.0, [0.0, -1.0, 0.0]).velocity([-0.001, -0.001, -10.0]))
        .unwrap();
    let pairs = [
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
    ];
    for (a, b) in pairs {
        sim.add_spring(a, b, 1e6).unwrap();
    }

    let initial = sim.energy().total();
    sim.step_n(4000).unwrap();

    for spring in sim.springs() {
        let length = sim.spring_length(spring.id()).unwrap();
        assert!((length - spring.rest_length()).abs() / spring.rest_length() < 1e-2);
    }
    assert!((sim.energy().total() - initial).abs() / initial < 2e-2);
    assert!(sim.momentum().norm() < 1e-9);
    let ids: Vec<ParticleId> = sim.particles().iter().map(|p| p.id()).collect();
    let com = sim.center_of_mass(&ids).unwrap();
    assert!(com.position.norm() < 1e-9);
}
