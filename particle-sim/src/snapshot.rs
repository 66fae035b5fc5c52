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
//! Owned copies of simulation state for renderers and loggers

use crate::particle::ParticleId;
use crate::spring::SpringId;
use crate::vector::Vector3;

/// State of one particle at snapshot time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleState {
    /// Particle handle
    pub id: ParticleId,
    /// Mass
    pub mass: f64,
    /// Position
    pub position: Vector3,
    /// Velocity
    pub velocity: Vector3,
    /// Whether the particle is integrated
    pub movable: bool,
}

/// Geometry of one spring at snapshot time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringState {
    /// Spring handle
    pub id: SpringId,
    /// Endpoint handles `(a, b)`
    pub endpoints: (ParticleId, ParticleId),
    /// Position of endpoint a
    pub start: Vector3,
    /// Position of endpoint b
    pub end: Vector3,
}

impl SpringState {
    /// Displacement from endpoint a to endpoint b
    pub fn axis(&self) -> Vector3 {
        self.end - self.start
    }
}

/// Everything a renderer needs to draw one frame
///
/// Particles and springs are in registration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Elapsed simulation time
    pub time: f64,
    /// Particle states
    pub particles: Vec<ParticleState>,
    /// Spring geometry
    pub springs: Vec<SpringState>,
}
