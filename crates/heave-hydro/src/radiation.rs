//! Radiation damping by convolution of the impulse response with past
//! velocities.

use nalgebra::{DVector, Vector6};
use serde::{Deserialize, Serialize};

use crate::data::BodyHydroData;

/// Quadrature used for the convolution integral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConvolutionMethod {
    /// Trapezoidal rule over the impulse response time vector.
    #[default]
    Trapezoidal,
    /// Plain sum of all samples times the impulse response step.
    FixedStep,
}

/// Fixed-length ring buffer of generalized velocities.
///
/// Age 0 is the most recent push; age `steps - 1` the oldest retained one.
/// Slots never written read as zero.
#[derive(Debug, Clone)]
pub struct VelocityHistory {
    steps: usize,
    dofs: usize,
    head: usize,
    data: Vec<f64>,
}

impl VelocityHistory {
    /// Create an all-zero history of `steps` slots, each `dofs` wide.
    pub fn new(steps: usize, dofs: usize) -> Self {
        Self {
            steps,
            dofs,
            head: 0,
            data: vec![0.0; steps * dofs],
        }
    }

    /// Number of slots.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Width of each slot.
    pub fn dofs(&self) -> usize {
        self.dofs
    }

    /// Record a new velocity vector, evicting the oldest.
    pub fn push(&mut self, velocities: &DVector<f64>) {
        if self.steps == 0 {
            return;
        }
        self.head = (self.head + self.steps - 1) % self.steps;
        let start = self.head * self.dofs;
        let n = velocities.len().min(self.dofs);
        self.data[start..start + n].copy_from_slice(&velocities.as_slice()[..n]);
    }

    /// Overwrite the most recent slot in place.
    pub fn replace_latest(&mut self, velocities: &DVector<f64>) {
        if self.steps == 0 {
            return;
        }
        let start = self.head * self.dofs;
        let n = velocities.len().min(self.dofs);
        self.data[start..start + n].copy_from_slice(&velocities.as_slice()[..n]);
    }

    /// Velocity in column `col`, pushed `age` pushes ago.
    pub fn get(&self, age: usize, col: usize) -> f64 {
        let slot = (self.head + age) % self.steps;
        self.data[slot * self.dofs + col]
    }
}

/// Radiation force on one body.
///
/// `history` columns follow the column order of the body's impulse response,
/// and age `s` pairs with kernel step `s`.
pub fn radiation_force(
    data: &BodyHydroData,
    history: &VelocityHistory,
    method: ConvolutionMethod,
) -> Vector6<f64> {
    let [rows, cols, steps] = data.rirf_dims();
    let time = data.rirf_time();
    let steps = steps.min(history.steps());
    let mut force = Vector6::zeros();

    for row in 0..rows.min(6) {
        let mut sum = 0.0;
        for col in 0..cols {
            match method {
                ConvolutionMethod::Trapezoidal => {
                    let mut prev = data.rirf_value(row, col, 0) * history.get(0, col);
                    for st in 1..steps {
                        let cur = data.rirf_value(row, col, st) * history.get(st, col);
                        sum += 0.5 * (prev + cur) * (time[st] - time[st - 1]);
                        prev = cur;
                    }
                }
                ConvolutionMethod::FixedStep => {
                    let column: f64 = (0..steps)
                        .map(|st| data.rirf_value(row, col, st) * history.get(st, col))
                        .sum();
                    sum += column * data.rirf_timestep();
                }
            }
        }
        force[row] = -sum;
    }
    force
}
