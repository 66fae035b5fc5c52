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
//! Point-mass particles
//!
//! A [`Particle`] owns its mass, position, velocity and a transient
//! acceleration accumulator. Particles are created only through
//! [`Simulation::add_particle`](crate::Simulation::add_particle), which
//! hands back a [`ParticleId`] handle for use when wiring springs.
//!
//! Domain-specific state (an electric charge, a material tag, ...) travels
//! in the generic payload `P`. Use a dedicated struct for strong typing, or
//! [`Attributes`] for an open set of named scalars.

use crate::error::{Result, SimulationError};
use crate::vector::Vector3;
use std::collections::BTreeMap;
use std::fmt;

/// Stable handle to a registered particle
///
/// The raw value is the particle's registration index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleId(usize);

impl ParticleId {
    /// Create a handle from a raw registration index
    pub fn new(index: usize) -> Self {
        ParticleId(index)
    }

    /// Get the registration index
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Particle({})", self.0)
    }
}

/// A point mass with position, velocity and an acceleration accumulator
///
/// The accumulator is zero between steps. During a step, springs and
/// fields add into it and it is cleared again after integration.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle<P = ()> {
    id: ParticleId,
    mass: f64,
    position: Vector3,
    velocity: Vector3,
    acceleration: Vector3,
    movable: bool,
    payload: P,
}

impl<P> Particle<P> {
    pub(crate) fn from_spec(id: ParticleId, spec: ParticleSpec<P>) -> Result<Self> {
        spec.validate()?;
        Ok(Particle {
            id,
            mass: spec.mass,
            position: spec.position,
            velocity: spec.velocity,
            acceleration: Vector3::ZERO,
            movable: spec.movable,
            payload: spec.payload,
        })
    }

    /// Handle of this particle
    pub fn id(&self) -> ParticleId {
        self.id
    }

    /// Mass
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Current position
    pub fn position(&self) -> Vector3 {
        self.position
    }

    /// Current velocity
    pub fn velocity(&self) -> Vector3 {
        self.velocity
    }

    /// Acceleration accumulated so far in the current step
    ///
    /// Always zero when observed between steps.
    pub fn acceleration(&self) -> Vector3 {
        self.acceleration
    }

    /// Whether integration advances this particle
    pub fn is_movable(&self) -> bool {
        self.movable
    }

    /// Extra per-particle state
    pub fn payload(&self) -> &P {
        &self.payload
    }

    pub(crate) fn payload_mut(&mut self) -> &mut P {
        &mut self.payload
    }

    /// Linear momentum `m v`
    pub fn momentum(&self) -> Vector3 {
        self.velocity * self.mass
    }

    /// Kinetic energy `0.5 m |v|²`
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity.norm_squared()
    }

    /// Advance one step with semi-implicit (symplectic) Euler
    ///
    /// - v' = v + a*dt
    /// - p' = p + v'*dt
    ///
    /// Only movable particles are integrated; the accumulator is left
    /// untouched and must be cleared by the caller.
    pub fn integrate(&mut self, dt: f64) {
        let (position, velocity) = self.advanced(dt);
        self.position = position;
        self.velocity = velocity;
    }

    /// Position and velocity one step of `dt` ahead, without applying them
    pub fn advanced(&self, dt: f64) -> (Vector3, Vector3) {
        let velocity = self.velocity + self.acceleration * dt;
        (self.position + velocity * dt, velocity)
    }

    /// Integrate only if the result is finite
    ///
    /// Returns `false` and leaves the particle unchanged otherwise.
    pub(crate) fn try_integrate(&mut self, dt: f64) -> bool {
        let (position, velocity) = self.advanced(dt);
        if !(position.is_finite() && velocity.is_finite()) {
            return false;
        }
        self.position = position;
        self.velocity = velocity;
        true
    }

    /// Whether position and velocity are both finite
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite()
    }

    pub(crate) fn accumulate(&mut self, acceleration: Vector3) {
        self.acceleration += acceleration;
    }

    pub(crate) fn set_acceleration(&mut self, acceleration: Vector3) {
        self.acceleration = acceleration;
    }

    pub(crate) fn reset_acceleration(&mut self) {
        self.acceleration = Vector3::ZERO;
    }

    pub(crate) fn set_position(&mut self, position: Vector3) -> Result<()> {
        if !position.is_finite() {
            return Err(SimulationError::NonFiniteInitialState { what: "position" });
        }
        self.position = position;
        Ok(())
    }

    pub(crate) fn set_velocity(&mut self, velocity: Vector3) -> Result<()> {
        if !velocity.is_finite() {
            return Err(SimulationError::NonFiniteInitialState { what: "velocity" });
        }
        self.velocity = velocity;
        Ok(())
    }
}

/// Registration parameters for a new particle
///
/// Velocity defaults to zero and particles are movable unless marked
/// [`fixed`](ParticleSpec::fixed).
///
/// # Examples
///
/// ```
/// use particle_sim::{ParticleSpec, Simulation};
///
/// let mut sim: Simulation = Simulation::new(1e-3).unwrap();
/// let anchor = sim.add_particle(ParticleSpec::new(1.0, [0.0, 0.0, 0.0]).fixed()).unwrap();
/// let bob = sim
///     .add_particle(ParticleSpec::new(2.0, [1.0, 0.0, 0.0]).velocity([0.0, 1.0, 0.0]))
///     .unwrap();
/// assert!(!sim.particle(anchor).unwrap().is_movable());
/// assert_eq!(sim.particle(bob).unwrap().mass(), 2.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleSpec<P = ()> {
    mass: f64,
    position: Vector3,
    velocity: Vector3,
    movable: bool,
    payload: P,
}

impl<P: Default> ParticleSpec<P> {
    /// A movable particle at rest with a default payload
    pub fn new(mass: f64, position: impl Into<Vector3>) -> Self {
        ParticleSpec::with_payload(mass, position, P::default())
    }
}

impl<P> ParticleSpec<P> {
    /// A movable particle at rest carrying `payload`
    pub fn with_payload(mass: f64, position: impl Into<Vector3>, payload: P) -> Self {
        ParticleSpec {
            mass,
            position: position.into(),
            velocity: Vector3::ZERO,
            movable: true,
            payload,
        }
    }

    /// Set the initial velocity
    pub fn velocity(mut self, velocity: impl Into<Vector3>) -> Self {
        self.velocity = velocity.into();
        self
    }

    /// Set whether integration advances the particle
    pub fn movable(mut self, movable: bool) -> Self {
        self.movable = movable;
        self
    }

    /// Mark the particle as a fixed anchor
    pub fn fixed(self) -> Self {
        self.movable(false)
    }

    /// Replace the payload
    pub fn payload(mut self, payload: P) -> Self {
        self.payload = payload;
        self
    }

    /// Edit the payload in place, e.g. to derive it from other parameters
    pub fn configure(mut self, f: impl FnOnce(&mut P)) -> Self {
        f(&mut self.payload);
        self
    }

    fn validate(&self) -> Result<()> {
        if !(self.mass > 0.0 && self.mass.is_finite()) {
            return Err(SimulationError::InvalidMass { mass: self.mass });
        }
        if !self.position.is_finite() {
            return Err(SimulationError::NonFiniteInitialState { what: "position" });
        }
        if !self.velocity.is_finite() {
            return Err(SimulationError::NonFiniteInitialState { what: "velocity" });
        }
        Ok(())
    }
}

/// Open set of named scalar attributes
///
/// A ready-made payload for configurations that prefer named values over a
/// dedicated struct. Missing keys read as absent rather than zero; use
/// [`get_or`](Attributes::get_or) to supply a default.
///
/// # Examples
///
/// ```
/// use particle_sim::Attributes;
///
/// let attrs = Attributes::new().with("charge", -0.5);
/// assert_eq!(attrs.get("charge"), Some(-0.5));
/// assert_eq!(attrs.get_or("spin", 0.0), 0.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    values: BTreeMap<String, f64>,
}

impl Attributes {
    /// Create an empty attribute set
    pub fn new() -> Self {
        Attributes::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: f64) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    /// Insert or replace a value, returning the previous one
    pub fn set(&mut self, key: impl Into<String>, value: f64) -> Option<f64> {
        self.values.insert(key.into(), value)
    }

    /// Look up a value
    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    /// Look up a value, falling back to `default`
    pub fn get_or(&self, key: &str, default: f64) -> f64 {
        self.get(key).unwrap_or(default)
    }

    /// Remove a value
    pub fn remove(&mut self, key: &str) -> Option<f64> {
        self.values.remove(key)
    }

    /// Whether the key is present
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no attributes
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(name, value)` pairs in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Attributes {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
