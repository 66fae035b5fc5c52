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
//! Acceleration fields
//!
//! A [`Field`] maps a particle's current state to an acceleration
//! contribution. Fields are evaluated for every movable particle on every
//! step, in registration order, and their contributions are summed.
//!
//! Fields that depend on other particles (pairwise Coulomb or gravitational
//! interaction) receive an explicit read-only [`Particles`] view rather than
//! a reference to the simulation itself, so they can be tested in isolation.
//!
//! # Contract
//!
//! Fields must be pure: no interior mutation, no dependence on call order.
//! This is documented rather than checked.

use crate::error::{Result, SimulationError};
use crate::particle::{Attributes, Particle, ParticleId};
use crate::vector::Vector3;
use std::fmt;
use std::ops::Index;

/// Read-only view of every particle in a simulation, in registration order
pub struct Particles<'a, P> {
    slice: &'a [Particle<P>],
}

impl<'a, P> Particles<'a, P> {
    /// Wrap a slice of particles
    ///
    /// Particle ids are expected to equal their slice index, which is
    /// always the case for slices handed out by a simulation.
    pub fn new(slice: &'a [Particle<P>]) -> Self {
        Particles { slice }
    }

    /// Number of particles
    pub fn len(&self) -> usize {
        self.slice.len()
    }

    /// Whether the view is empty
    pub fn is_empty(&self) -> bool {
        self.slice.is_empty()
    }

    /// Look up a particle by handle
    pub fn get(&self, id: ParticleId) -> Option<&'a Particle<P>> {
        self.slice.get(id.index())
    }

    /// Iterate over all particles
    pub fn iter(&self) -> std::slice::Iter<'a, Particle<P>> {
        self.slice.iter()
    }

    /// Iterate over every particle except `id`
    pub fn others(&self, id: ParticleId) -> impl Iterator<Item = &'a Particle<P>> + 'a {
        self.slice.iter().filter(move |p| p.id() != id)
    }

    /// The underlying slice
    pub fn as_slice(&self) -> &'a [Particle<P>] {
        self.slice
    }
}

impl<P> Clone for Particles<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for Particles<'_, P> {}

impl<P> fmt::Debug for Particles<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Particles").field("len", &self.slice.len()).finish()
    }
}

impl<P> Index<ParticleId> for Particles<'_, P> {
    type Output = Particle<P>;

    fn index(&self, id: ParticleId) -> &Particle<P> {
        &self.slice[id.index()]
    }
}

impl<'a, P> IntoIterator for Particles<'a, P> {
    type Item = &'a Particle<P>;
    type IntoIter = std::slice::Iter<'a, Particle<P>>;

    fn into_iter(self) -> Self::IntoIter {
        self.slice.iter()
    }
}

/// A pure function producing an acceleration contribution for a particle
pub trait Field<P>: Send + Sync {
    /// Acceleration contributed to `particle`
    ///
    /// `particles` contains every particle in the simulation, including
    /// `particle` itself.
    fn acceleration(&self, particle: &Particle<P>, particles: Particles<'_, P>) -> Vector3;

    /// Descriptive name used in logs and error reports
    fn name(&self) -> &str {
        "field"
    }
}

/// A [`Field`] backed by a closure
///
/// Build one with [`field_fn`]; it is also what
/// [`Simulation::add_field_fn`](crate::Simulation::add_field_fn) registers.
pub struct FnField<F> {
    name: String,
    function: F,
}

/// Wrap a closure as a named field
///
/// # Examples
///
/// ```
/// use particle_sim::{field_fn, Field, Particle, Particles, Vector3};
///
/// let gravity = field_fn("gravity", |_p: &Particle, _all: Particles<'_, ()>| {
///     Vector3::new(0.0, 0.0, -9.8)
/// });
/// assert_eq!(Field::<()>::name(&gravity), "gravity");
/// ```
pub fn field_fn<P, F>(name: impl Into<String>, function: F) -> FnField<F>
where
    F: Fn(&Particle<P>, Particles<'_, P>) -> Vector3 + Send + Sync,
{
    FnField {
        name: name.into(),
        function,
    }
}

impl<P, F> Field<P> for FnField<F>
where
    F: Fn(&Particle<P>, Particles<'_, P>) -> Vector3 + Send + Sync,
{
    fn acceleration(&self, particle: &Particle<P>, particles: Particles<'_, P>) -> Vector3 {
        (self.function)(particle, particles)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Standard gravitational acceleration at Earth's surface (m/s²)
pub const STANDARD_GRAVITY: f64 = 9.8;

/// Spatially uniform acceleration, independent of mass
///
/// ```
/// use particle_sim::field::UniformField;
/// use particle_sim::Vector3;
///
/// let g = UniformField::gravity(9.8);
/// assert_eq!(g.value(), Vector3::new(0.0, 0.0, -9.8));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformField {
    acceleration: Vector3,
}

impl UniformField {
    /// Create a uniform field
    ///
    /// # Panics
    ///
    /// Panics if any component is NaN or infinite. See [`try_new`](Self::try_new).
    pub fn new(acceleration: impl Into<Vector3>) -> Self {
        Self::try_new(acceleration).unwrap_or_else(|err| panic!("{}", err))
    }

    /// Create a uniform field, rejecting NaN or infinite components
    pub fn try_new(acceleration: impl Into<Vector3>) -> Result<Self> {
        let acceleration = acceleration.into();
        if !acceleration.is_finite() {
            return Err(SimulationError::InvalidFieldParameter {
                field: "uniform",
                reason: "Uniform field must be finite",
            });
        }
        Ok(UniformField { acceleration })
    }

    /// Downward gravity of magnitude `g` along −z
    pub fn gravity(g: f64) -> Self {
        UniformField::new([0.0, 0.0, -g])
    }

    /// The constant acceleration
    pub fn value(&self) -> Vector3 {
        self.acceleration
    }
}

impl<P> Field<P> for UniformField {
    fn acceleration(&self, _particle: &Particle<P>, _particles: Particles<'_, P>) -> Vector3 {
        self.acceleration
    }

    fn name(&self) -> &str {
        "uniform"
    }
}

/// Payloads that carry an electric charge
pub trait Charged {
    /// Charge of the particle
    fn charge(&self) -> f64;
}

impl Charged for f64 {
    fn charge(&self) -> f64 {
        *self
    }
}

/// Reads the `"charge"` attribute; uncharged particles default to zero
impl Charged for Attributes {
    fn charge(&self) -> f64 {
        self.get_or("charge", 0.0)
    }
}

/// Pairwise inverse-square electrostatic interaction
///
/// The acceleration on particle i is
///
/// **a_i = Σ_j k q_i q_j r_ij / (m_i |r_ij|³)**, with r_ij = x_i − x_j.
///
/// Like charges repel and opposite charges attract. Every other particle,
/// movable or not, acts as a source. Coincident particles produce a
/// non-finite result, which the simulation reports as an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoulombField {
    k: f64,
}

impl CoulombField {
    /// Create a Coulomb field with coupling constant `k`
    ///
    /// # Panics
    ///
    /// Panics if `k` is not finite. See [`try_new`](Self::try_new).
    pub fn new(k: f64) -> Self {
        Self::try_new(k).unwrap_or_else(|err| panic!("{}", err))
    }

    /// Create a Coulomb field, rejecting a non-finite `k`
    pub fn try_new(k: f64) -> Result<Self> {
        if !k.is_finite() {
            return Err(SimulationError::InvalidFieldParameter {
                field: "coulomb",
                reason: "Coulomb constant must be finite",
            });
        }
        Ok(CoulombField { k })
    }

    /// The coupling constant
    pub fn constant(&self) -> f64 {
        self.k
    }
}

impl<P: Charged> Field<P> for CoulombField {
    fn acceleration(&self, particle: &Particle<P>, particles: Particles<'_, P>) -> Vector3 {
        let q = particle.payload().charge();
        if q == 0.0 {
            return Vector3::ZERO;
        }
        let scale = self.k * q / particle.mass();
        particles
            .others(particle.id())
            .map(|other| {
                let r = particle.position() - other.position();
                let r3 = r.norm_squared() * r.norm();
                r * (scale * other.payload().charge() / r3)
            })
            .sum()
    }

    fn name(&self) -> &str {
        "coulomb"
    }
}

/// Standard gravitational constant in SI units (m³/(kg⋅s²))
///
/// CODATA 2018 recommended value: 6.67430(15) × 10⁻¹¹ m³/(kg⋅s²)
pub const GRAVITATIONAL_CONSTANT: f64 = 6.67430e-11;

/// Pairwise Newtonian gravity between all particles
///
/// **a_i = Σ_j G m_j (x_j − x_i) / (r² + ε²)^(3/2)**
///
/// The softening length ε keeps close encounters finite; with ε = 0 the
/// exact inverse-square law is used and coincident particles are reported
/// as a numerical error by the simulation.
///
/// # References
///
/// - Dehnen, W. (2001). "Towards optimal softening in three-dimensional N-body codes"
/// - Aarseth, S. J. (2003). "Gravitational N-Body Simulations"
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewtonianGravity {
    g_constant: f64,
    softening: f64,
}

impl NewtonianGravity {
    /// Create a gravity field with the given constant and no softening
    ///
    /// # Panics
    ///
    /// Panics if `g_constant` is negative or not finite.
    pub fn new(g_constant: f64) -> Self {
        Self::try_new(g_constant).unwrap_or_else(|err| panic!("{}", err))
    }

    /// Fallible form of [`new`](Self::new)
    pub fn try_new(g_constant: f64) -> Result<Self> {
        if !(g_constant >= 0.0 && g_constant.is_finite()) {
            return Err(SimulationError::InvalidFieldParameter {
                field: "newtonian_gravity",
                reason: "Gravitational constant must be non-negative and finite",
            });
        }
        Ok(NewtonianGravity {
            g_constant,
            softening: 0.0,
        })
    }

    /// Set the softening length
    ///
    /// # Panics
    ///
    /// Panics if `softening` is negative or not finite.
    pub fn with_softening(self, softening: f64) -> Self {
        self.try_with_softening(softening)
            .unwrap_or_else(|err| panic!("{}", err))
    }

    /// Fallible form of [`with_softening`](Self::with_softening)
    pub fn try_with_softening(mut self, softening: f64) -> Result<Self> {
        if !(softening >= 0.0 && softening.is_finite()) {
            return Err(SimulationError::InvalidFieldParameter {
                field: "newtonian_gravity",
                reason: "Softening factor must be non-negative and finite",
            });
        }
        self.softening = softening;
        Ok(self)
    }

    /// The gravitational constant
    pub fn g_constant(&self) -> f64 {
        self.g_constant
    }

    /// The softening length
    pub fn softening(&self) -> f64 {
        self.softening
    }
}

impl<P> Field<P> for NewtonianGravity {
    fn acceleration(&self, particle: &Particle<P>, particles: Particles<'_, P>) -> Vector3 {
        let eps2 = self.softening * self.softening;
        particles
            .others(particle.id())
            .map(|other| {
                let r = other.position() - particle.position();
                let softened = r.norm_squared() + eps2;
                r * (self.g_constant * other.mass() / (softened * softened.sqrt()))
            })
            .sum()
    }

    fn name(&self) -> &str {
        "newtonian_gravity"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::ParticleSpec;

    fn build<P>(specs: Vec<ParticleSpec<P>>) -> Vec<Particle<P>> {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, spec)| Particle::from_spec(ParticleId::new(i), spec).unwrap())
            .collect()
    }

    #[test]
    fn test_view_access() {
        let particles = build::<()>(vec![
            ParticleSpec::new(1.0, [0.0; 3]),
            ParticleSpec::new(2.0, [1.0, 0.0, 0.0]),
            ParticleSpec::new(3.0, [2.0, 0.0, 0.0]),
        ]);
        let view = Particles::new(&particles);
        assert_eq!(view.len(), 3);
        assert_eq!(view[ParticleId::new(1)].mass(), 2.0);
        assert!(view.get(ParticleId::new(3)).is_none());
        let others: Vec<f64> = view.others(ParticleId::new(1)).map(|p| p.mass()).collect();
        assert_eq!(others, vec![1.0, 3.0]);
        assert_eq!(view.into_iter().count(), 3);
    }

    #[test]
    fn test_closure_field() {
        let particles = build::<()>(vec![ParticleSpec::new(2.0, [0.0, 0.0, 5.0])]);
        let field = field_fn("height", |p: &Particle<()>, _all: Particles<'_, ()>| {
            Vector3::new(0.0, 0.0, -p.position().z)
        });
        let acc = field.acceleration(&particles[0], Particles::new(&particles));
        assert_eq!(acc, Vector3::new(0.0, 0.0, -5.0));
        assert_eq!(Field::<()>::name(&field), "height");
    }

    #[test]
    fn test_uniform_field() {
        let particles = build::<()>(vec![ParticleSpec::new(10.0, [3.0, 2.0, 1.0])]);
        let g = UniformField::gravity(STANDARD_GRAVITY);
        let acc = g.acceleration(&particles[0], Particles::new(&particles));
        assert_eq!(acc, Vector3::new(0.0, 0.0, -9.8));
    }

    #[test]
    #[should_panic(expected = "Uniform field must be finite")]
    fn test_uniform_field_rejects_nan() {
        UniformField::new([f64::NAN, 0.0, 0.0]);
    }

    #[test]
    fn test_coulomb_opposite_charges_attract() {
        let particles = build(vec![
            ParticleSpec::with_payload(1.0, [0.0; 3], 1.0),
            ParticleSpec::with_payload(2.0, [2.0, 0.0, 0.0], -1.0),
        ]);
        let field = CoulombField::new(4.0);
        let view = Particles::new(&particles);

        // k q1 q2 / (m |r|²) = 4 * -1 / (1 * 4) = -1 along r = x1 - x2 = (-2, 0, 0)
        let a0 = field.acceleration(&particles[0], view);
        assert!((a0.x - 1.0).abs() < 1e-12);

        let a1 = field.acceleration(&particles[1], view);
        assert!((a1.x - -0.5).abs() < 1e-12);

        // Momentum balance: m0 a0 + m1 a1 = 0
        assert!((a0.x * 1.0 + a1.x * 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_coulomb_with_attributes() {
        let particles = build(vec![
            ParticleSpec::with_payload(1.0, [0.0; 3], Attributes::new().with("charge", 2.0)),
            ParticleSpec::with_payload(1.0, [0.0, 1.0, 0.0], Attributes::new().with("charge", 3.0)),
            ParticleSpec::with_payload(1.0, [0.0, 0.0, 1.0], Attributes::new()),
        ]);
        let field = CoulombField::new(1.0);
        let view = Particles::new(&particles);

        // Like charges repel; the uncharged particle neither feels nor exerts force
        let a0 = field.acceleration(&particles[0], view);
        assert!((a0.y - -6.0).abs() < 1e-12);
        assert_eq!(a0.z, 0.0);
        assert_eq!(field.acceleration(&particles[2], view), Vector3::ZERO);
    }

    #[test]
    fn test_coulomb_coincident_is_not_finite() {
        let particles = build(vec![
            ParticleSpec::with_payload(1.0, [1.0; 3], 1.0),
            ParticleSpec::with_payload(1.0, [1.0; 3], 1.0),
        ]);
        let acc = CoulombField::new(1.0).acceleration(&particles[0], Particles::new(&particles));
        assert!(!acc.is_finite());
    }

    #[test]
    fn test_newtonian_gravity() {
        let particles = build::<()>(vec![
            ParticleSpec::new(1.0, [0.0; 3]),
            ParticleSpec::new(8.0, [0.0, 2.0, 0.0]),
        ]);
        let view = Particles::new(&particles);
        let gravity = NewtonianGravity::new(1.0);

        // G m / r² = 8 / 4 = 2 toward the heavy body
        let a = gravity.acceleration(&particles[0], view);
        assert!((a.y - 2.0).abs() < 1e-12);

        let softened = NewtonianGravity::new(1.0).with_softening(2.0);
        let a = softened.acceleration(&particles[0], view);
        // 8 * 2 / (4 + 4)^(3/2)
        assert!((a.y - 16.0 / 8.0_f64.powf(1.5)).abs() < 1e-12);
    }

    #[test]
    fn test_fallible_constructors() {
        assert_eq!(
            NewtonianGravity::try_new(-1.0).unwrap_err(),
            SimulationError::InvalidFieldParameter {
                field: "newtonian_gravity",
                reason: "Gravitational constant must be non-negative and finite",
            }
        );
        let err = NewtonianGravity::new(1.0).try_with_softening(f64::NAN).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid newtonian_gravity field: Softening factor must be non-negative and finite"
        );
        assert_eq!(NewtonianGravity::try_new(0.0).unwrap().softening(), 0.0);
        assert!(!err.is_step_failure());
        assert_eq!(UniformField::try_new([0.0, 0.0, -1.0]).unwrap(), UniformField::gravity(1.0));
    }

    #[test]
    #[should_panic(expected = "Gravitational constant must be non-negative and finite")]
    fn test_newtonian_gravity_rejects_negative_g() {
        NewtonianGravity::new(-1.0);
    }
}
