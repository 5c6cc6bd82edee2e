//! Rigid-body system for heave decay and wave-body simulations.
//!
//! Provides fixed-step dynamics for a set of [`RigidBody`] values under
//! gravity, a [`ForceProvider`] seam for external loads such as
//! hydrodynamics, and a [`TraceWriter`] for time-series output.

/// Rigid bodies and their identifiers.
pub mod body;
/// Simulation clock derived from a tick counter.
pub mod clock;
/// Configuration types for simulation runs.
pub mod config;
/// Error types for the core crate.
pub mod error;
/// The trait external loads implement.
pub mod force;
/// Time integration schemes.
pub mod integrator;
/// Top-level body system orchestrator.
pub mod system;
/// Time-series output of body motion.
pub mod trace;

/// Re-exports of [`body::BodyId`], [`body::RigidBody`], and [`body::Shape`].
pub use body::{BodyId, RigidBody, Shape};
/// Re-export of [`clock::SimClock`].
pub use clock::SimClock;
/// Re-export of [`config::SimConfig`].
pub use config::SimConfig;
/// Re-exports of [`error::CoreError`] and [`error::CoreResult`].
pub use error::{CoreError, CoreResult};
/// Re-exports of [`force::ForceContext`] and [`force::ForceProvider`].
pub use force::{ForceContext, ForceProvider};
/// Re-export of [`integrator::IntegrationMethod`].
pub use integrator::IntegrationMethod;
/// Re-export of [`system::BodySystem`].
pub use system::BodySystem;
/// Re-exports of the trace output types.
pub use trace::{Sample, TraceColumns, TraceFormat, TraceWriter};
