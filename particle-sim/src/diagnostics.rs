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
//! Energy and momentum bookkeeping
//!
//! These are read-only aggregates over particle state, used by callers to
//! monitor a run: total energy split into kinetic and potential parts, total
//! linear momentum, centre of mass, and a bounded history of energy samples
//! for plotting.

use crate::particle::Particle;
use crate::vector::Vector3;
use std::collections::VecDeque;

/// System energy split into kinetic and spring potential parts
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Energy {
    /// Sum of `0.5 m |v|²` over all particles
    pub kinetic: f64,
    /// Sum of `0.5 k (L − L₀)²` over all springs
    pub potential: f64,
}

impl Energy {
    /// Create an energy pair
    pub fn new(kinetic: f64, potential: f64) -> Self {
        Energy { kinetic, potential }
    }

    /// Kinetic plus potential
    pub fn total(&self) -> f64 {
        self.kinetic + self.potential
    }
}

impl From<Energy> for (f64, f64) {
    fn from(energy: Energy) -> Self {
        (energy.kinetic, energy.potential)
    }
}

/// Total linear momentum of a set of particles
pub fn total_momentum<'a, P: 'a>(particles: impl IntoIterator<Item = &'a Particle<P>>) -> Vector3 {
    particles.into_iter().map(|p| p.momentum()).sum()
}

/// Mass-weighted centre of a set of particles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CenterOfMass {
    /// Total mass
    pub mass: f64,
    /// Centre-of-mass position
    pub position: Vector3,
    /// Centre-of-mass velocity
    pub velocity: Vector3,
}

/// Centre of mass of a set of particles
///
/// Returns `None` for an empty set.
pub fn center_of_mass<'a, P: 'a>(
    particles: impl IntoIterator<Item = &'a Particle<P>>,
) -> Option<CenterOfMass> {
    let mut mass = 0.0;
    let mut weighted_position = Vector3::ZERO;
    let mut momentum = Vector3::ZERO;
    for p in particles {
        mass += p.mass();
        weighted_position += p.position() * p.mass();
        momentum += p.momentum();
    }
    if mass == 0.0 {
        return None;
    }
    Some(CenterOfMass {
        mass,
        position: weighted_position / mass,
        velocity: momentum / mass,
    })
}

/// A timestamped energy sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergySample {
    /// Simulation time of the sample
    pub time: f64,
    /// Energy at that time
    pub energy: Energy,
}

/// Bounded history of energy samples
///
/// Keeps the most recent `capacity` samples; older samples are dropped.
#[derive(Debug, Clone)]
pub struct EnergyHistory {
    samples: VecDeque<EnergySample>,
    capacity: usize,
}

impl EnergyHistory {
    /// Create an empty history
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "History capacity must be positive");
        EnergyHistory {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a sample, evicting the oldest when full
    pub fn record(&mut self, time: f64, energy: Energy) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(EnergySample { time, energy });
    }

    /// Number of retained samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether no samples are retained
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Maximum number of retained samples
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Retained samples, oldest first
    pub fn samples(&self) -> impl Iterator<Item = &EnergySample> {
        self.samples.iter()
    }

    /// Most recent sample
    pub fn latest(&self) -> Option<&EnergySample> {
        self.samples.back()
    }

    /// Largest absolute deviation of total energy from the oldest retained sample
    pub fn max_drift(&self) -> f64 {
        let Some(first) = self.samples.front() else {
            return 0.0;
        };
        let reference = first.energy.total();
        self.samples
            .iter()
            .map(|s| (s.energy.total() - reference).abs())
            .fold(0.0, f64::max)
    }

    /// Whether total energy never rises by more than `tolerance` between samples
    pub fn is_non_increasing(&self, tolerance: f64) -> bool {
        self.samples
            .iter()
            .zip(self.samples.iter().skip(1))
            .all(|(prev, next)| next.energy.total() <= prev.energy.total() + tolerance)
    }
}
