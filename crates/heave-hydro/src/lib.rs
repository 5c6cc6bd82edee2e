//! Linear potential-flow hydrodynamics for [`heave_core`] body systems.
//!
//! [`HydroData`] loads BEM coefficients laid out like a bemio file;
//! [`HydroForces`] turns them into hydrostatic, radiation-damping, wave
//! excitation and added-mass loads through the
//! [`ForceProvider`](heave_core::ForceProvider) seam.

/// Coefficient file loading and scaled accessors.
pub mod data;
/// Error types for the hydro crate.
pub mod error;
/// Regular-wave excitation.
pub mod excitation;
/// The force provider combining all hydrodynamic loads.
pub mod forces;
/// Restoring force and buoyancy.
pub mod hydrostatics;
/// Radiation damping by impulse-response convolution.
pub mod radiation;
/// Wave settings.
pub mod waves;

/// Re-exports of the coefficient data types.
pub use data::{Array3, BodyHydroData, HydroData};
/// Re-exports of [`error::HydroError`] and [`error::HydroResult`].
pub use error::{HydroError, HydroResult};
/// Re-export of [`excitation::RegularWaveExcitation`].
pub use excitation::RegularWaveExcitation;
/// Re-exports of [`forces::HydroComponents`] and [`forces::HydroForces`].
pub use forces::{HydroComponents, HydroForces};
/// Re-export of [`hydrostatics::hydrostatic_force`].
pub use hydrostatics::hydrostatic_force;
/// Re-exports of the radiation convolution types.
pub use radiation::{ConvolutionMethod, VelocityHistory, radiation_force};
/// Re-exports of [`waves::HydroInputs`] and [`waves::WaveMode`].
pub use waves::{HydroInputs, WaveMode};
