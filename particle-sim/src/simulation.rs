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
//! The simulation container and its step algorithm
//!
//! A [`Simulation`] exclusively owns its particles, springs and fields and
//! advances them on a single timeline. Each call to
//! [`update`](Simulation::update) runs, in order:
//!
//! 1. **Spring pass**: every spring, in registration order, adds `F/m_a` to
//!    endpoint a's accumulator and `−F/m_b` to endpoint b's, where F is the
//!    Hooke force plus the damping force when damping is enabled.
//! 2. **Field and integration pass**: every movable particle, in
//!    registration order, adds each field's contribution, integrates with
//!    semi-implicit Euler and clears its accumulator. Fields evaluated for a
//!    later particle observe the already-advanced state of earlier ones.
//! 3. `t += dt`
//!
//! Accumulated spring forces on fixed particles are discarded, so every
//! accumulator is zero between steps.
//!
//! # Failure
//!
//! A coincident spring, a non-finite field value or a diverged particle
//! aborts the step with an error naming the culprit and the time the step
//! would have reached. The clock does not advance and no non-finite value is
//! stored. The simulation is then faulted and every later `update` returns
//! [`SimulationError::Faulted`].

use crate::config::SimulationConfig;
use crate::diagnostics::{self, CenterOfMass, Energy};
use crate::error::{Result, SimulationError};
use crate::field::{field_fn, Field, Particles};
use crate::particle::{Particle, ParticleId, ParticleSpec};
use crate::snapshot::{ParticleState, Snapshot, SpringState};
use crate::spring::{Spring, SpringId};
use crate::vector::Vector3;
use std::fmt;

/// A mass-spring system with fields, advanced with a fixed time step
///
/// `P` is the per-particle payload type; see [`ParticleSpec`].
///
/// # Examples
///
/// ```
/// use particle_sim::{ParticleSpec, Simulation};
///
/// let mut sim: Simulation = Simulation::new(1e-4).unwrap();
/// let a = sim.add_particle(ParticleSpec::new(1.0, [0.0, 0.0, 0.0])).unwrap();
/// let b = sim.add_particle(ParticleSpec::new(1.0, [1.0, 0.0, 0.0])).unwrap();
/// sim.add_spring_with_rest_length(a, b, 100.0, 0.5).unwrap();
///
/// let before = sim.energy().total();
/// sim.step_n(1000).unwrap();
/// let after = sim.energy().total();
/// assert!((after - before).abs() / before < 1e-2);
/// ```
pub struct Simulation<P = ()> {
    config: SimulationConfig,
    elapsed_time: f64,
    step_count: u64,
    particles: Vec<Particle<P>>,
    movable: Vec<ParticleId>,
    springs: Vec<Spring>,
    fields: Vec<Box<dyn Field<P>>>,
    fault: Option<SimulationError>,
}

impl<P> Simulation<P> {
    /// Create an undamped simulation with the given time step
    pub fn new(time_step: f64) -> Result<Self> {
        Self::from_config(SimulationConfig::new(time_step))
    }

    /// Create a simulation whose springs are damped with `dissipation_coefficient`
    pub fn with_damping(time_step: f64, dissipation_coefficient: f64) -> Result<Self> {
        Self::from_config(SimulationConfig::new(time_step).with_damping(dissipation_coefficient))
    }

    /// Create a simulation from a full configuration
    pub fn from_config(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        if let Some(warning) = config.timestep_warning() {
            log::warn!("{}", warning);
        }
        log::debug!(
            "Created simulation: dt = {}, damping = {} (b = {})",
            config.time_step,
            config.damping_enabled,
            config.dissipation_coefficient
        );
        Ok(Simulation {
            config,
            elapsed_time: 0.0,
            step_count: 0,
            particles: Vec::new(),
            movable: Vec::new(),
            springs: Vec::new(),
            fields: Vec::new(),
            fault: None,
        })
    }

    /// The configuration in effect
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Fixed integration time step
    pub fn time_step(&self) -> f64 {
        self.config.time_step
    }

    /// Elapsed simulation time
    pub fn time(&self) -> f64 {
        self.elapsed_time
    }

    /// Number of completed steps
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Whether springs apply velocity damping
    pub fn damping_enabled(&self) -> bool {
        self.config.damping_enabled
    }

    /// Damping magnitude shared by every spring
    pub fn dissipation_coefficient(&self) -> f64 {
        self.config.dissipation_coefficient
    }

    /// Register a particle and return its handle
    ///
    /// Fails if the mass is not positive and finite, or if the initial
    /// position or velocity is not finite.
    pub fn add_particle(&mut self, spec: ParticleSpec<P>) -> Result<ParticleId> {
        let id = ParticleId::new(self.particles.len());
        let particle = Particle::from_spec(id, spec)?;
        log::debug!(
            "Registered {} (mass = {}, movable = {})",
            id,
            particle.mass(),
            particle.is_movable()
        );
        if particle.is_movable() {
            self.movable.push(id);
        }
        self.particles.push(particle);
        Ok(id)
    }

    /// Register a spring whose rest length is the current endpoint distance
    pub fn add_spring(&mut self, a: ParticleId, b: ParticleId, stiffness: f64) -> Result<SpringId> {
        let rest_length = self.endpoint(a)?.position().distance(self.endpoint(b)?.position());
        self.add_spring_with_rest_length(a, b, stiffness, rest_length)
    }

    /// Register a spring with an explicit rest length
    ///
    /// Both endpoints must already be registered and must differ.
    pub fn add_spring_with_rest_length(
        &mut self,
        a: ParticleId,
        b: ParticleId,
        stiffness: f64,
        rest_length: f64,
    ) -> Result<SpringId> {
        self.endpoint(a)?;
        self.endpoint(b)?;
        let id = SpringId::new(self.springs.len());
        let spring = Spring::new(id, a, b, stiffness, rest_length)?;
        log::debug!(
            "Registered {} between {} and {} (k = {}, rest length = {})",
            id,
            a,
            b,
            stiffness,
            rest_length
        );
        self.springs.push(spring);
        Ok(id)
    }

    /// Register a field; fields are applied in registration order
    pub fn add_field<F>(&mut self, field: F)
    where
        F: Field<P> + 'static,
    {
        log::debug!("Registered field '{}'", field.name());
        self.fields.push(Box::new(field));
    }

    /// Register a closure as a named field
    pub fn add_field_fn<F>(&mut self, name: impl Into<String>, function: F)
    where
        F: Fn(&Particle<P>, Particles<'_, P>) -> Vector3 + Send + Sync + 'static,
    {
        self.add_field(field_fn(name, function));
    }

    /// Advance the simulation by one time step
    ///
    /// On error the simulation is left faulted; see the module docs.
    pub fn update(&mut self) -> Result<()> {
        if let Some(cause) = &self.fault {
            return Err(SimulationError::Faulted {
                cause: Box::new(cause.clone()),
            });
        }
        match self.advance() {
            Ok(()) => Ok(()),
            Err(err) => {
                log::error!("Step {} failed: {}", self.step_count + 1, err);
                for particle in &mut self.particles {
                    particle.reset_acceleration();
                }
                self.fault = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Run `steps` updates, stopping at the first failure
    pub fn step_n(&mut self, steps: usize) -> Result<()> {
        for _ in 0..steps {
            self.update()?;
        }
        Ok(())
    }

    fn advance(&mut self) -> Result<()> {
        let time = self.elapsed_time + self.config.time_step;
        self.accumulate_spring_forces(time)?;
        self.apply_fields_and_integrate(time)?;
        self.elapsed_time = time;
        self.step_count += 1;
        log::trace!("Completed step {} at t = {}", self.step_count, self.elapsed_time);
        Ok(())
    }

    /// Spring pass: add each spring's force, divided by mass, to its endpoints
    fn accumulate_spring_forces(&mut self, time: f64) -> Result<()> {
        let damping = self
            .config
            .damping_enabled
            .then_some(self.config.dissipation_coefficient);

        for spring in &self.springs {
            let (a, b) = spring.endpoints();
            let pa = &self.particles[a.index()];
            let pb = &self.particles[b.index()];
            let force = spring
                .force(pa, pb, damping)
                .ok_or(SimulationError::DegenerateSpring {
                    spring: spring.id(),
                    time,
                })?;
            if !force.is_finite() {
                return Err(SimulationError::NonFiniteSpringForce {
                    spring: spring.id(),
                    time,
                });
            }
            let acc_a = force / pa.mass();
            let acc_b = -force / pb.mass();
            self.particles[a.index()].accumulate(acc_a);
            self.particles[b.index()].accumulate(acc_b);
        }
        Ok(())
    }

    /// Field and integration pass over movable particles
    fn apply_fields_and_integrate(&mut self, time: f64) -> Result<()> {
        let dt = self.config.time_step;

        for &id in &self.movable {
            let index = id.index();
            let view = Particles::new(&self.particles);
            let particle = &self.particles[index];
            let mut acceleration = particle.acceleration();
            for field in &self.fields {
                let contribution = field.acceleration(particle, view);
                if !contribution.is_finite() {
                    return Err(SimulationError::NonFiniteFieldAcceleration {
                        field: field.name().to_string(),
                        particle: id,
                        time,
                    });
                }
                acceleration += contribution;
            }

            let particle = &mut self.particles[index];
            particle.set_acceleration(acceleration);
            if !particle.try_integrate(dt) {
                return Err(SimulationError::NonFiniteState { particle: id, time });
            }
            particle.reset_acceleration();
        }

        for particle in self.particles.iter_mut().filter(|p| !p.is_movable()) {
            particle.reset_acceleration();
        }
        Ok(())
    }

    /// Kinetic energy of all particles and potential energy of all springs
    pub fn energy(&self) -> Energy {
        let kinetic: f64 = self.particles.iter().map(Particle::kinetic_energy).sum();
        let potential: f64 = self
            .springs
            .iter()
            .map(|spring| {
                let (a, b) = spring.endpoints();
                spring.potential_energy(&self.particles[a.index()], &self.particles[b.index()])
            })
            .sum();
        Energy::new(kinetic, potential)
    }

    /// Total linear momentum
    pub fn momentum(&self) -> Vector3 {
        diagnostics::total_momentum(&self.particles)
    }

    /// Centre of mass of the given particles
    ///
    /// Unknown handles are ignored. Returns `None` if none are known.
    pub fn center_of_mass(&self, ids: &[ParticleId]) -> Option<CenterOfMass> {
        diagnostics::center_of_mass(ids.iter().filter_map(|&id| self.particle(id)))
    }

    /// Read-only view of all particles in registration order
    pub fn particles(&self) -> Particles<'_, P> {
        Particles::new(&self.particles)
    }

    /// Number of registered particles
    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// Look up a particle
    pub fn particle(&self, id: ParticleId) -> Option<&Particle<P>> {
        self.particles.get(id.index())
    }

    /// Movable particles in registration order
    pub fn movable_particles(&self) -> impl Iterator<Item = &Particle<P>> + '_ {
        self.movable.iter().map(move |id| &self.particles[id.index()])
    }

    /// All springs in registration order
    pub fn springs(&self) -> &[Spring] {
        &self.springs
    }

    /// Look up a spring
    pub fn spring(&self, id: SpringId) -> Option<&Spring> {
        self.springs.get(id.index())
    }

    /// The two particles a spring joins
    pub fn spring_endpoints(&self, id: SpringId) -> Option<(&Particle<P>, &Particle<P>)> {
        let (a, b) = self.spring(id)?.endpoints();
        Some((self.particle(a)?, self.particle(b)?))
    }

    /// Current length of a spring
    pub fn spring_length(&self, id: SpringId) -> Option<f64> {
        let spring = self.spring(id)?;
        let (a, b) = self.spring_endpoints(id)?;
        Some(spring.current_length(a, b))
    }

    /// Number of registered fields
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Names of the registered fields in registration order
    pub fn field_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.iter().map(|f| f.name())
    }

    /// Move a particle between steps
    ///
    /// Intended for driven boundary conditions. Fixed particles may be moved
    /// too; integration still never moves them.
    pub fn set_position(&mut self, id: ParticleId, position: impl Into<Vector3>) -> Result<()> {
        self.endpoint_mut(id)?.set_position(position.into())
    }

    /// Set a particle's velocity between steps
    pub fn set_velocity(&mut self, id: ParticleId, velocity: impl Into<Vector3>) -> Result<()> {
        self.endpoint_mut(id)?.set_velocity(velocity.into())
    }

    /// Mutable access to a particle's payload
    pub fn payload_mut(&mut self, id: ParticleId) -> Option<&mut P> {
        self.particles.get_mut(id.index()).map(Particle::payload_mut)
    }

    /// Owned copy of the current state for rendering
    pub fn snapshot(&self) -> Snapshot {
        let particles = self
            .particles
            .iter()
            .map(|p| ParticleState {
                id: p.id(),
                mass: p.mass(),
                position: p.position(),
                velocity: p.velocity(),
                movable: p.is_movable(),
            })
            .collect();
        let springs = self
            .springs
            .iter()
            .map(|s| {
                let (a, b) = s.endpoints();
                SpringState {
                    id: s.id(),
                    endpoints: (a, b),
                    start: self.particles[a.index()].position(),
                    end: self.particles[b.index()].position(),
                }
            })
            .collect();
        Snapshot {
            time: self.elapsed_time,
            particles,
            springs,
        }
    }

    /// Whether an earlier step failed
    pub fn is_faulted(&self) -> bool {
        self.fault.is_some()
    }

    /// The error that halted the simulation, if any
    pub fn fault(&self) -> Option<&SimulationError> {
        self.fault.as_ref()
    }

    fn endpoint(&self, id: ParticleId) -> Result<&Particle<P>> {
        self.particle(id)
            .ok_or(SimulationError::UnknownParticle { particle: id })
    }

    fn endpoint_mut(&mut self, id: ParticleId) -> Result<&mut Particle<P>> {
        self.particles
            .get_mut(id.index())
            .ok_or(SimulationError::UnknownParticle { particle: id })
    }
}

impl<P> fmt::Debug for Simulation<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("config", &self.config)
            .field("time", &self.elapsed_time)
            .field("steps", &self.step_count)
            .field("particles", &self.particles.len())
            .field("movable", &self.movable.len())
            .field("springs", &self.springs.len())
            .field("fields", &self.field_names().collect::<Vec<_>>())
            .field("faulted", &self.fault.is_some())
            .finish()
    }
}
