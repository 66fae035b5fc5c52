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
//! Simulation configuration
//!
//! [`SimulationConfig`] gathers the global integration settings: the fixed
//! time step and the spring damping switch and coefficient.
//!
//! # Environment Configuration
//!
//! Values can be overridden from the environment, which is convenient for
//! demo programs and benchmark sweeps:
//!
//! ```bash
//! export PARTICLE_SIM_TIME_STEP=1e-4
//! export PARTICLE_SIM_DAMPING=true
//! export PARTICLE_SIM_DISSIPATION=0.8
//! ```
//!
//! # Timestep Guidelines
//!
//! - Too small: precision loss accumulates in f64 positions
//! - Too large: stiff springs go unstable (keep dt well below 2/ω, ω = √(k/m))

use crate::error::{Result, SimulationError};

/// Environment variable overriding the time step
pub const ENV_TIME_STEP: &str = "PARTICLE_SIM_TIME_STEP";
/// Environment variable toggling spring damping
pub const ENV_DAMPING: &str = "PARTICLE_SIM_DAMPING";
/// Environment variable overriding the dissipation coefficient
pub const ENV_DISSIPATION: &str = "PARTICLE_SIM_DISSIPATION";

/// Default time step in seconds
pub const DEFAULT_TIME_STEP: f64 = 1e-3;
/// Default spring dissipation coefficient
pub const DEFAULT_DISSIPATION: f64 = 0.5;

/// Global integration settings
///
/// # Examples
///
/// ```
/// use particle_sim::SimulationConfig;
///
/// let config = SimulationConfig::new(1e-4).with_damping(0.8);
/// assert!(config.validate().is_ok());
/// assert!(config.damping_enabled);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationConfig {
    /// Fixed integration time step
    pub time_step: f64,
    /// Whether springs apply velocity damping
    pub damping_enabled: bool,
    /// Damping magnitude shared by every spring
    pub dissipation_coefficient: f64,
}

impl SimulationConfig {
    /// Undamped configuration with the given time step
    pub fn new(time_step: f64) -> Self {
        SimulationConfig {
            time_step,
            ..Default::default()
        }
    }

    /// Enable spring damping with the given coefficient
    pub fn with_damping(mut self, dissipation_coefficient: f64) -> Self {
        self.damping_enabled = true;
        self.dissipation_coefficient = dissipation_coefficient;
        self
    }

    /// Disable spring damping, keeping the coefficient
    pub fn without_damping(mut self) -> Self {
        self.damping_enabled = false;
        self
    }

    /// Check that every value is usable
    pub fn validate(&self) -> Result<()> {
        if !(self.time_step > 0.0 && self.time_step.is_finite()) {
            return Err(SimulationError::InvalidTimeStep(self.time_step));
        }
        if !(self.dissipation_coefficient >= 0.0 && self.dissipation_coefficient.is_finite()) {
            return Err(SimulationError::InvalidDissipation(self.dissipation_coefficient));
        }
        Ok(())
    }

    /// Describe a valid but suspicious time step
    ///
    /// Extremely small time steps lose precision, large ones tend to be
    /// unstable. Returns `None` when the time step looks reasonable.
    pub fn timestep_warning(&self) -> Option<String> {
        let dt = self.time_step;
        if dt < 1e-9 {
            Some(format!(
                "Timestep {} is extremely small and may cause precision loss with f64",
                dt
            ))
        } else if dt > 1.0 {
            Some(format!(
                "Timestep {} is large and may cause instability; consider smaller steps",
                dt
            ))
        } else {
            None
        }
    }

    /// Default configuration with environment overrides applied
    pub fn from_env() -> Result<Self> {
        SimulationConfig::default().apply_env()
    }

    /// Apply overrides from `PARTICLE_SIM_*` environment variables
    pub fn apply_env(self) -> Result<Self> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(raw) = lookup(ENV_TIME_STEP) {
            self.time_step = parse_value(ENV_TIME_STEP, &raw)?;
        }
        if let Some(raw) = lookup(ENV_DAMPING) {
            self.damping_enabled = parse_flag(ENV_DAMPING, &raw)?;
        }
        if let Some(raw) = lookup(ENV_DISSIPATION) {
            self.dissipation_coefficient = parse_value(ENV_DISSIPATION, &raw)?;
        }
        log::debug!("Configuration after environment overrides: {:?}", self);
        self.validate()?;
        Ok(self)
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            time_step: DEFAULT_TIME_STEP,
            damping_enabled: false,
            dissipation_coefficient: DEFAULT_DISSIPATION,
        }
    }
}

fn invalid(key: &str, raw: &str) -> SimulationError {
    SimulationError::InvalidConfig {
        key: key.to_string(),
        value: raw.to_string(),
    }
}

fn parse_value(key: &str, raw: &str) -> Result<f64> {
    raw.trim().parse::<f64>().map_err(|_| invalid(key, raw))
}

fn parse_flag(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, raw)),
    }
}
