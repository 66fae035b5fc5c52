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
//! Hookean springs between particle pairs
//!
//! # Physics Background
//!
//! A spring of stiffness k and rest length L₀ joining endpoints a and b,
//! with axis **d** = x_b − x_a, exerts on endpoint a the force
//!
//! **F = k (1 − L₀/|d|) d**
//!
//! and −**F** on endpoint b. When stretched (|d| > L₀) the factor is
//! positive and a is pulled toward b; when compressed it changes sign and the
//! endpoints are pushed apart. The stored elastic energy is
//! ½ k (|d| − L₀)².
//!
//! Optional damping adds b_d (v_rel · n) n with n = d/|d| and
//! v_rel = v_b − v_a, which opposes the rate of elongation.
//!
//! ## Numerical Stability
//!
//! Both force terms divide by |d|. Coincident endpoints have no axis, so
//! the force operations return `None` instead of producing NaN.

use crate::particle::{Particle, ParticleId};
use crate::error::{Result, SimulationError};
use crate::vector::Vector3;
use std::fmt;

/// Stable handle to a registered spring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpringId(usize);

impl SpringId {
    /// Create a handle from a raw registration index
    pub fn new(index: usize) -> Self {
        SpringId(index)
    }

    /// Get the registration index
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for SpringId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Spring({})", self.0)
    }
}

/// A Hooke's-law bond between two distinct particles
///
/// The structure is immutable once registered: endpoints, stiffness and
/// rest length never change. Only the endpoints' positions evolve.
#[derive(Debug, Clone, PartialEq)]
pub struct Spring {
    id: SpringId,
    a: ParticleId,
    b: ParticleId,
    stiffness: f64,
    rest_length: f64,
}

impl Spring {
    pub(crate) fn new(
        id: SpringId,
        a: ParticleId,
        b: ParticleId,
        stiffness: f64,
        rest_length: f64,
    ) -> Result<Self> {
        if a == b {
            return Err(SimulationError::SelfSpring { particle: a });
        }
        if !(stiffness > 0.0 && stiffness.is_finite()) {
            return Err(SimulationError::InvalidStiffness { stiffness });
        }
        if !(rest_length >= 0.0 && rest_length.is_finite()) {
            return Err(SimulationError::InvalidRestLength { rest_length });
        }
        Ok(Spring {
            id,
            a,
            b,
            stiffness,
            rest_length,
        })
    }

    /// Handle of this spring
    pub fn id(&self) -> SpringId {
        self.id
    }

    /// First endpoint
    pub fn endpoint_a(&self) -> ParticleId {
        self.a
    }

    /// Second endpoint
    pub fn endpoint_b(&self) -> ParticleId {
        self.b
    }

    /// Both endpoints as `(a, b)`
    pub fn endpoints(&self) -> (ParticleId, ParticleId) {
        (self.a, self.b)
    }

    /// Stiffness k
    pub fn stiffness(&self) -> f64 {
        self.stiffness
    }

    /// Rest length L₀
    pub fn rest_length(&self) -> f64 {
        self.rest_length
    }

    /// Displacement from endpoint a to endpoint b
    pub fn axis<P>(&self, a: &Particle<P>, b: &Particle<P>) -> Vector3 {
        b.position() - a.position()
    }

    /// Current distance between the endpoints
    pub fn current_length<P>(&self, a: &Particle<P>, b: &Particle<P>) -> f64 {
        self.axis(a, b).norm()
    }

    /// Hooke restoring force on endpoint a for the given axis
    ///
    /// Endpoint b receives the negation. Returns `None` when the axis has
    /// zero length.
    pub fn restoring_force(&self, axis: Vector3) -> Option<Vector3> {
        let length = axis.norm();
        if length == 0.0 {
            return None;
        }
        Some(axis * (self.stiffness * (1.0 - self.rest_length / length)))
    }

    /// Velocity damping force on endpoint a
    ///
    /// Projects the relative velocity of b with respect to a onto the unit
    /// axis and scales by `coefficient`. Returns `None` when the axis has
    /// zero length.
    pub fn damping_force<P>(
        &self,
        axis: Vector3,
        a: &Particle<P>,
        b: &Particle<P>,
        coefficient: f64,
    ) -> Option<Vector3> {
        let n = axis.normalized()?;
        let elongation_rate = (b.velocity() - a.velocity()).dot(n);
        Some(n * (coefficient * elongation_rate))
    }

    /// Total force on endpoint a, with damping when `damping` is given
    pub fn force<P>(
        &self,
        a: &Particle<P>,
        b: &Particle<P>,
        damping: Option<f64>,
    ) -> Option<Vector3> {
        let axis = self.axis(a, b);
        let mut force = self.restoring_force(axis)?;
        if let Some(coefficient) = damping {
            force += self.damping_force(axis, a, b, coefficient)?;
        }
        Some(force)
    }

    /// Elastic energy `0.5 k (|d| − L₀)²`
    pub fn potential_energy<P>(&self, a: &Particle<P>, b: &Particle<P>) -> f64 {
        let stretch = self.current_length(a, b) - self.rest_length;
        0.5 * self.stiffness * stretch * stretch
    }
}
