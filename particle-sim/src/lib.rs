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
//! # Particle Sim
//!
//! A discrete-time mechanics simulator for point masses joined by springs
//! and driven by force fields.
//!
//! ## Features
//!
//! - **Particles**: point masses with an optional fixed (anchor) flag and a
//!   generic payload for domain data such as charge
//! - **Springs**: Hooke's-law bonds with optional velocity damping
//! - **Fields**: pluggable accelerations (uniform gravity, Coulomb,
//!   Newtonian gravity, or any closure)
//! - **Symplectic Euler**: fixed-step integration with good long-run energy
//!   behaviour
//! - **Diagnostics**: energy, momentum and centre-of-mass readouts
//! - **Parallelization**: optional Rayon-backed ensembles of independent runs
//!
//! ## Example
//!
//! ```rust
//! use particle_sim::field::UniformField;
//! use particle_sim::{ParticleSpec, Simulation};
//!
//! let mut sim: Simulation = Simulation::new(1e-3)?;
//! let anchor = sim.add_particle(ParticleSpec::new(1.0, [0.0, 0.0, 0.0]).fixed())?;
//! let bob = sim.add_particle(ParticleSpec::new(0.5, [0.0, 0.0, -1.0]))?;
//! sim.add_spring(anchor, bob, 200.0)?;
//! sim.add_field(UniformField::gravity(9.8));
//!
//! sim.step_n(100)?;
//! assert!(sim.particle(bob).unwrap().position().z < -1.0);
//! # Ok::<(), particle_sim::SimulationError>(())
//! ```

#![warn(missing_docs)]

/// Three-component vectors
pub mod vector;

/// Point masses and their registration parameters
pub mod particle;

/// Hooke's-law springs
pub mod spring;

/// Acceleration fields
pub mod field;

/// The simulation container and step algorithm
pub mod simulation;

/// Integration settings
pub mod config;

/// Error types
pub mod error;

/// Energy and momentum readouts
pub mod diagnostics;

/// Owned state copies for rendering
pub mod snapshot;

/// Independent simulations run side by side
pub mod ensemble;

pub use config::SimulationConfig;
pub use diagnostics::Energy;
pub use error::{Result, SimulationError};
pub use field::{field_fn, Field, Particles};
pub use particle::{Attributes, Particle, ParticleId, ParticleSpec};
pub use simulation::Simulation;
pub use snapshot::Snapshot;
pub use spring::{Spring, SpringId};
pub use vector::Vector3;
