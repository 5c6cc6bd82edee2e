use nalgebra::Vector3;

use crate::error::{CoreError, CoreResult};
use crate::integrator::IntegrationMethod;

/// Standard gravitational acceleration, pointing down the z axis.
pub const STANDARD_GRAVITY: f64 = 9.81;

/// Configuration for a simulation run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Gravitational acceleration applied to every body (m/s²).
    pub gravity: Vector3<f64>,
    /// Fixed step size (s).
    pub timestep: f64,
    /// Inclusive upper bound on the sampled time (s).
    pub end_time: f64,
    /// Time integration scheme.
    pub integrator: IntegrationMethod,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            gravity: Vector3::new(0.0, 0.0, -STANDARD_GRAVITY),
            timestep: 0.015,
            end_time: 40.0,
            integrator: IntegrationMethod::default(),
        }
    }
}

impl SimConfig {
    /// Set the gravitational acceleration vector.
    pub fn with_gravity(mut self, gravity: Vector3<f64>) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set the fixed step size in seconds.
    pub fn with_timestep(mut self, timestep: f64) -> Self {
        self.timestep = timestep;
        self
    }

    /// Set the inclusive end time in seconds.
    pub fn with_end_time(mut self, end_time: f64) -> Self {
        self.end_time = end_time;
        self
    }

    /// Set the integration scheme.
    pub fn with_integrator(mut self, integrator: IntegrationMethod) -> Self {
        self.integrator = integrator;
        self
    }

    /// Reject configurations the stepper cannot run.
    pub fn validate(&self) -> CoreResult<()> {
        if !self.timestep.is_finite() || self.timestep <= 0.0 {
            return Err(CoreError::InvalidConfig(format!(
                "timestep must be positive, got {}",
                self.timestep
            )));
        }
        if !self.end_time.is_finite() || self.end_time < 0.0 {
            return Err(CoreError::InvalidConfig(format!(
                "end time must be non-negative, got {}",
                self.end_time
            )));
        }
        if self.gravity.iter().any(|g| !g.is_finite()) {
            return Err(CoreError::InvalidConfig("gravity must be finite".into()));
        }
        Ok(())
    }

    /// Number of samples a sampled run takes: every `n` with `n × dt <= end_time`.
    pub fn sample_count(&self) -> u64 {
        let mut n = (self.end_time / self.timestep).floor() as u64;
        // floor() can land one short or one long of the inclusive bound
        while (n + 1) as f64 * self.timestep <= self.end_time {
            n += 1;
        }
        while n > 0 && n as f64 * self.timestep > self.end_time {
            n -= 1;
        }
        n + 1
    }
}
