use nalgebra::{DMatrix, DVector};

use crate::body::RigidBody;
use crate::error::CoreResult;

/// Read-only view of the system handed to force providers.
#[derive(Debug, Clone, Copy)]
pub struct ForceContext<'a> {
    /// All bodies, in registration order.
    pub bodies: &'a [RigidBody],
    /// Current simulated time (s).
    pub time: f64,
    /// Current tick.
    pub tick: u64,
    /// Fixed step size (s).
    pub timestep: f64,
}

impl ForceContext<'_> {
    /// Size of a generalized vector for this system (6 per body).
    pub fn dofs(&self) -> usize {
        6 * self.bodies.len()
    }
}

/// An external load applied to the bodies of a system each step.
///
/// Providers are evaluated in registration order and their outputs summed.
/// Forces are generalized 6N vectors: for body `b`, entries `6b..6b+3` are the
/// force and `6b+3..6b+6` the moment about the centre of mass, both in the
/// world frame.
pub trait ForceProvider: std::fmt::Debug {
    /// Human-readable name for this provider.
    fn name(&self) -> &str;

    /// Called once before the first step, after all bodies are registered.
    fn init(&mut self, _bodies: &[RigidBody], _timestep: f64) -> CoreResult<()> {
        Ok(())
    }

    /// Generalized force at the state described by `ctx`.
    ///
    /// May be called more than once for the same tick; stateful providers
    /// must return the same result for repeated calls.
    fn generalized_forces(&mut self, ctx: &ForceContext<'_>) -> CoreResult<DVector<f64>>;

    /// Forget any result cached for the current tick. Called when a body's
    /// state is edited between steps; the next evaluation must see the edit.
    fn invalidate(&mut self) {}

    /// Constant 6N×6N mass contribution, added to the rigid-body mass matrix.
    fn added_mass(&self, _n_bodies: usize) -> Option<DMatrix<f64>> {
        None
    }

    /// Support downcasting to concrete types.
    fn as_any(&self) -> &dyn std::any::Any;

    /// Support downcasting to concrete types.
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}
