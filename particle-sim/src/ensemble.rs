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
//! Running independent simulations side by side
//!
//! A single [`Simulation`] always steps on one thread: the field sweep is
//! order dependent. Parameter studies, however, run many unrelated
//! simulations, and those can share the machine. With the `parallel` feature
//! (on by default) each simulation is driven on the Rayon thread pool;
//! without it the same functions run sequentially.

use crate::diagnostics::Energy;
use crate::error::Result;
use crate::simulation::Simulation;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Advance every simulation by `steps` updates
///
/// Returns, per simulation and in input order, the final energy or the error
/// that stopped it. One failing simulation does not affect the others.
#[cfg(feature = "parallel")]
pub fn run_ensemble<P: Send>(simulations: &mut [Simulation<P>], steps: usize) -> Vec<Result<Energy>> {
    log::debug!(
        "Running {} simulations for {} steps on {} threads",
        simulations.len(),
        steps,
        thread_count()
    );
    simulations
        .par_iter_mut()
        .map(|sim| run_one(sim, steps))
        .collect()
}

#[cfg(not(feature = "parallel"))]
/// Advance every simulation by `steps` updates (sequential fallback when parallel feature disabled)
pub fn run_ensemble<P: Send>(simulations: &mut [Simulation<P>], steps: usize) -> Vec<Result<Energy>> {
    log::debug!("Running {} simulations for {} steps", simulations.len(), steps);
    simulations.iter_mut().map(|sim| run_one(sim, steps)).collect()
}

/// Build one simulation per parameter value and run them all
///
/// `build` turns a parameter into a ready simulation; build failures are
/// reported in place of a run result.
///
/// # Examples
///
/// ```
/// use particle_sim::ensemble::sweep;
/// use particle_sim::{ParticleSpec, Simulation};
///
/// let results = sweep(&[10.0, 100.0], 200, |&k| {
///     let mut sim: Simulation = Simulation::new(1e-3)?;
///     let a = sim.add_particle(ParticleSpec::new(1.0, [0.0, 0.0, 0.0]))?;
///     let b = sim.add_particle(ParticleSpec::new(1.0, [1.2, 0.0, 0.0]))?;
///     sim.add_spring_with_rest_length(a, b, k, 1.0)?;
///     Ok(sim)
/// });
/// assert_eq!(results.len(), 2);
/// assert!(results.iter().all(|r| r.is_ok()));
/// ```
pub fn sweep<T, P, F>(parameters: &[T], steps: usize, build: F) -> Vec<Result<Energy>>
where
    T: Sync,
    P: Send,
    F: Fn(&T) -> Result<Simulation<P>> + Sync,
{
    #[cfg(feature = "parallel")]
    let iter = parameters.par_iter();
    #[cfg(not(feature = "parallel"))]
    let iter = parameters.iter();

    iter.map(|parameter| {
        let mut sim = build(parameter)?;
        run_one(&mut sim, steps)
    })
    .collect()
}

/// Number of worker threads available to [`run_ensemble`]
pub fn thread_count() -> usize {
    #[cfg(feature = "parallel")]
    {
        rayon::current_num_threads()
    }
    #[cfg(not(feature = "parallel"))]
    {
        1
    }
}

fn run_one<P>(sim: &mut Simulation<P>, steps: usize) -> Result<Energy> {
    sim.step_n(steps)?;
    Ok(sim.energy())
}
