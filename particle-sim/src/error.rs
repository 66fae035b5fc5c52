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
//! Error types for model construction and stepping
//!
//! Two families of errors exist. Registration errors reject a malformed
//! model before it is accepted. Stepping errors report a numerical
//! singularity discovered while advancing time; after one of those the
//! simulation is faulted and refuses further steps.

use crate::particle::ParticleId;
use crate::spring::SpringId;
use thiserror::Error;

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, SimulationError>;

/// Unified error type for all simulation operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// Time step is not positive and finite
    #[error("Invalid time step {0}: must be positive and finite")]
    InvalidTimeStep(f64),

    /// Dissipation coefficient is negative or not finite
    #[error("Invalid dissipation coefficient {0}: must be non-negative and finite")]
    InvalidDissipation(f64),

    /// Particle mass is not positive and finite
    #[error("Invalid particle mass {mass}: must be positive and finite")]
    InvalidMass {
        /// The rejected mass
        mass: f64,
    },

    /// Initial position or velocity contains NaN or infinity
    #[error("Particle {what} must be finite")]
    NonFiniteInitialState {
        /// Which quantity was rejected ("position" or "velocity")
        what: &'static str,
    },

    /// A handle does not refer to a registered particle
    #[error("{particle} is not registered in this simulation")]
    UnknownParticle {
        /// The unknown handle
        particle: ParticleId,
    },

    /// Both spring endpoints are the same particle
    #[error("Spring endpoints must be distinct particles, got {particle} twice")]
    SelfSpring {
        /// The particle given for both ends
        particle: ParticleId,
    },

    /// Spring stiffness is not positive and finite
    #[error("Invalid spring stiffness {stiffness}: must be positive and finite")]
    InvalidStiffness {
        /// The rejected stiffness
        stiffness: f64,
    },

    /// Spring rest length is negative or not finite
    #[error("Invalid spring rest length {rest_length}: must be non-negative and finite")]
    InvalidRestLength {
        /// The rejected rest length
        rest_length: f64,
    },

    /// A built-in field was given an unusable parameter
    #[error("Invalid {field} field: {reason}")]
    InvalidFieldParameter {
        /// Name of the field
        field: &'static str,
        /// What was wrong
        reason: &'static str,
    },

    /// A spring's endpoints coincide, so its axis has no direction
    #[error("{spring} has coincident endpoints at t = {time}")]
    DegenerateSpring {
        /// The degenerate spring
        spring: SpringId,
        /// Simulation time of the failing step
        time: f64,
    },

    /// A spring produced a NaN or infinite force
    #[error("{spring} produced a non-finite force at t = {time}")]
    NonFiniteSpringForce {
        /// The offending spring
        spring: SpringId,
        /// Simulation time of the failing step
        time: f64,
    },

    /// A field returned NaN or infinity for a particle
    #[error("Field '{field}' returned a non-finite acceleration for {particle} at t = {time}")]
    NonFiniteFieldAcceleration {
        /// Name of the field
        field: String,
        /// The particle being evaluated
        particle: ParticleId,
        /// Simulation time of the failing step
        time: f64,
    },

    /// Integration left a particle with NaN or infinite state
    #[error("{particle} reached a non-finite state at t = {time}")]
    NonFiniteState {
        /// The diverged particle
        particle: ParticleId,
        /// Simulation time of the failing step
        time: f64,
    },

    /// An earlier step failed; the simulation no longer advances
    #[error("Simulation halted after an earlier failure: {cause}")]
    Faulted {
        /// The error that halted the simulation
        cause: Box<SimulationError>,
    },

    /// A configuration value could not be parsed
    #[error("Configuration error: {key} = '{value}' is not valid")]
    InvalidConfig {
        /// Setting name
        key: String,
        /// Raw value that was rejected
        value: String,
    },
}

impl SimulationError {
    /// Whether this error arose while advancing time (as opposed to building the model)
    pub fn is_step_failure(&self) -> bool {
        matches!(
            self,
            SimulationError::DegenerateSpring { .. }
                | SimulationError::NonFiniteSpringForce { .. }
                | SimulationError::NonFiniteFieldAcceleration { .. }
                | SimulationError::NonFiniteState { .. }
                | SimulationError::Faulted { .. }
        )
    }
}
