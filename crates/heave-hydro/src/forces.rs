use std::any::Any;

use heave_core::{CoreError, CoreResult, ForceContext, ForceProvider, RigidBody};
use nalgebra::{DMatrix, DVector};
use tracing::{debug, info, warn};

use crate::data::HydroData;
use crate::error::{HydroError, HydroResult};
use crate::excitation::RegularWaveExcitation;
use crate::hydrostatics::hydrostatic_force;
use crate::radiation::{ConvolutionMethod, VelocityHistory, radiation_force};
use crate::waves::{HydroInputs, WaveMode};

/// Hydrodynamic loads evaluated for one tick, as 6N vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct HydroComponents {
    /// Tick the components were computed for.
    pub tick: u64,
    /// Restoring force and buoyancy.
    pub hydrostatic: DVector<f64>,
    /// Radiation damping.
    pub radiation: DVector<f64>,
    /// Wave excitation (zero in calm water).
    pub excitation: DVector<f64>,
}

impl HydroComponents {
    /// Sum of all components.
    pub fn total(&self) -> DVector<f64> {
        &self.hydrostatic + &self.radiation + &self.excitation
    }
}

/// Linear potential-flow loads on every body of a system.
///
/// Each system body is matched by name to a body group of the coefficient
/// file; the file must describe exactly the bodies in the system.
#[derive(Debug)]
pub struct HydroForces {
    data: HydroData,
    inputs: HydroInputs,
    convolution: ConvolutionMethod,
    /// System body index to index into `data.bodies()`.
    body_map: Vec<usize>,
    history: VelocityHistory,
    /// Tick whose velocities occupy the newest history slot.
    recorded_tick: Option<u64>,
    excitation: Vec<RegularWaveExcitation>,
    last: Option<HydroComponents>,
}

impl HydroForces {
    /// Create a force model. Bodies are matched when the system initializes.
    pub fn new(data: HydroData, inputs: HydroInputs) -> Self {
        Self {
            data,
            inputs,
            convolution: ConvolutionMethod::default(),
            body_map: Vec::new(),
            history: VelocityHistory::new(0, 0),
            recorded_tick: None,
            excitation: Vec::new(),
            last: None,
        }
    }

    /// Choose the radiation convolution quadrature.
    pub fn with_convolution(mut self, method: ConvolutionMethod) -> Self {
        self.convolution = method;
        self
    }

    /// The coefficient data.
    pub fn data(&self) -> &HydroData {
        &self.data
    }

    /// The wave settings.
    pub fn inputs(&self) -> &HydroInputs {
        &self.inputs
    }

    /// The radiation convolution quadrature.
    pub fn convolution(&self) -> ConvolutionMethod {
        self.convolution
    }

    /// Components of the most recent evaluation, if any.
    pub fn last_components(&self) -> Option<&HydroComponents> {
        self.last.as_ref()
    }

    fn bind(&mut self, bodies: &[RigidBody], timestep: f64) -> HydroResult<()> {
        self.inputs.validate()?;
        let body_map = bodies
            .iter()
            .map(|b| self.data.body_index(&b.name))
            .collect::<HydroResult<Vec<_>>>()?;

        let dofs = 6 * bodies.len();
        if dofs != self.data.total_dofs() {
            return Err(HydroError::DimensionMismatch {
                dataset: "added_mass/inf_freq".into(),
                expected: format!("6x{dofs} for {} system bodies", bodies.len()),
                found: format!("6x{}", self.data.total_dofs()),
            });
        }

        let first = &self.data.bodies()[0];
        let steps = first.rirf_dims()[2];
        let rirf_dt = first.rirf_timestep();
        if (rirf_dt - timestep).abs() > 1e-9 * timestep.max(rirf_dt) {
            warn!(
                timestep,
                rirf_timestep = rirf_dt,
                "system timestep differs from impulse response step; history assumes one sample per step"
            );
        }

        self.excitation = match self.inputs.mode {
            WaveMode::NoWaveCic => Vec::new(),
            WaveMode::Regular => body_map
                .iter()
                .map(|&i| RegularWaveExcitation::new(&self.data.bodies()[i], &self.inputs))
                .collect::<HydroResult<Vec<_>>>()?,
        };
        self.history = VelocityHistory::new(steps, dofs);
        self.recorded_tick = None;
        self.body_map = body_map;
        self.last = None;
        info!(
            bodies = bodies.len(),
            rirf_steps = steps,
            mode = ?self.inputs.mode,
            convolution = ?self.convolution,
            "hydrodynamic forces initialized"
        );
        Ok(())
    }

    fn compute(&mut self, ctx: &ForceContext<'_>) -> HydroResult<HydroComponents> {
        if self.body_map.len() != ctx.bodies.len() {
            return Err(HydroError::InvalidData(format!(
                "initialized for {} bodies, called with {}",
                self.body_map.len(),
                ctx.bodies.len()
            )));
        }
        let dofs = ctx.dofs();

        // history columns use the coefficient file's body order
        let mut velocities = DVector::zeros(dofs);
        for (b, body) in ctx.bodies.iter().enumerate() {
            let o = 6 * self.body_map[b];
            velocities
                .rows_mut(o, 6)
                .copy_from(&body.generalized_velocity());
        }
        // one slot per tick: a re-evaluation overwrites rather than shifts
        if self.recorded_tick == Some(ctx.tick) {
            self.history.replace_latest(&velocities);
        } else {
            self.history.push(&velocities);
            self.recorded_tick = Some(ctx.tick);
        }

        let mut hydrostatic = DVector::zeros(dofs);
        let mut radiation = DVector::zeros(dofs);
        let mut excitation = DVector::zeros(dofs);
        for (b, body) in ctx.bodies.iter().enumerate() {
            let data = &self.data.bodies()[self.body_map[b]];
            hydrostatic
                .rows_mut(6 * b, 6)
                .copy_from(&hydrostatic_force(body, data));
            radiation
                .rows_mut(6 * b, 6)
                .copy_from(&radiation_force(data, &self.history, self.convolution));
            if let Some(wave) = self.excitation.get(b) {
                excitation.rows_mut(6 * b, 6).copy_from(&wave.force(ctx.time));
            }
        }
        debug!(
            tick = ctx.tick,
            heave_radiation = radiation[2],
            "evaluated hydrodynamic forces"
        );
        Ok(HydroComponents {
            tick: ctx.tick,
            hydrostatic,
            radiation,
            excitation,
        })
    }
}

impl ForceProvider for HydroForces {
    fn name(&self) -> &str {
        "hydro"
    }

    fn init(&mut self, bodies: &[RigidBody], timestep: f64) -> CoreResult<()> {
        self.bind(bodies, timestep).map_err(CoreError::from)
    }

    fn generalized_forces(&mut self, ctx: &ForceContext<'_>) -> CoreResult<DVector<f64>> {
        if let Some(last) = self.last.as_ref().filter(|l| l.tick == ctx.tick) {
            return Ok(last.total());
        }
        let components = self.compute(ctx)?;
        let total = components.total();
        self.last = Some(components);
        Ok(total)
    }

    fn invalidate(&mut self) {
        self.last = None;
    }

    fn added_mass(&self, n_bodies: usize) -> Option<DMatrix<f64>> {
        if self.body_map.len() != n_bodies {
            return None;
        }
        let dofs = 6 * n_bodies;
        let mut added = DMatrix::zeros(dofs, dofs);
        for (b, &fb) in self.body_map.iter().enumerate() {
            let block = self.data.bodies()[fb].infinite_added_mass();
            for (c, &fc) in self.body_map.iter().enumerate() {
                added
                    .view_mut((6 * b, 6 * c), (6, 6))
                    .copy_from(&block.view((0, 6 * fc), (6, 6)));
            }
        }
        Some(added)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::tests::sphere_json;
    use approx::assert_relative_eq;
    use heave_core::{BodySystem, SimConfig};
    use nalgebra::Vector3;
    use serde_json::json;

    fn sphere_data(steps: usize, dt: f64) -> HydroData {
        HydroData::from_json_str(&sphere_json(steps, dt).to_string()).unwrap()
    }

    fn floating_sphere() -> RigidBody {
        // mass equals displaced water, so the sphere floats at z = 0
        RigidBody::sphere("body1", 5.0, 1.0)
            .with_mass(261.799e3)
            .with_position(Vector3::new(0.0, 0.0, -1.0))
    }

    fn decay_system(inputs: HydroInputs) -> BodySystem {
        let mut sys = BodySystem::new(SimConfig::default().with_end_time(10.0)).unwrap();
        sys.add_body(floating_sphere()).unwrap();
        sys.add_force(HydroForces::new(sphere_data(20, 0.015), inputs))
            .unwrap();
        sys
    }

    /// Two bodies listed in the file in the opposite order to the system.
    fn two_body_json() -> serde_json::Value {
        let steps = 3;
        let mut am = vec![vec![0.0; 12]; 6];
        am[2][2] = 1.0;
        am[2][8] = 0.5;
        let mut am2 = vec![vec![0.0; 12]; 6];
        am2[2][8] = 2.0;
        am2[2][2] = 0.25;
        let k = vec![vec![vec![0.0; steps]; 12]; 6];
        let lin = vec![vec![0.0; 6]; 6];
        let body = |number: u32, am: &[Vec<f64>]| {
            json!({
                "properties": { "body_number": number, "cg": [0.0, 0.0, 0.0],
                                "cb": [0.0, 0.0, 0.0], "disp_vol": 0.0 },
                "hydro_coeffs": {
                    "linear_restoring_stiffness": lin,
                    "added_mass": { "inf_freq": am },
                    "radiation_damping": { "impulse_response_fun": {
                        "K": k, "t": [0.0, 0.015, 0.03] } }
                }
            })
        };
        json!({
            "simulation_parameters": { "rho": 1.0, "g": 9.81, "w": [1.0] },
            "float": body(1, &am),
            "plate": body(2, &am2)
        })
    }

    #[test]
    fn free_decay_oscillates_about_equilibrium() {
        let mut sys = decay_system(HydroInputs::default());
        let id = sys.body_by_name("body1").unwrap();
        let mut min = f64::MAX;
        let mut max = f64::MIN;
        sys.run_sampled(|s| {
            let z = s.body(id).map_or(0.0, RigidBody::heave);
            min = min.min(z);
            max = max.max(z);
            Ok(())
        })
        .unwrap();
        assert_relative_eq!(min, -1.0, epsilon = 1e-9);
        assert!(max > 0.0, "sphere should rise above equilibrium, max {max}");
        assert!(max < 1.0, "radiation damping should shrink the swing, max {max}");
    }

    #[test]
    fn added_mass_is_registered() {
        let mut sys = decay_system(HydroInputs::default());
        sys.init().unwrap();
        let hydro = sys.get_force::<HydroForces>().unwrap();
        let added = hydro.added_mass(1).unwrap();
        assert_relative_eq!(added[(2, 2)], 130.9e3, epsilon = 1e-6);
    }

    #[test]
    fn forces_are_cached_per_tick() {
        let mut sys = decay_system(HydroInputs::default());
        let id = sys.body_by_name("body1").unwrap();
        let first = sys.provider_force(id).unwrap();
        let again = sys.provider_force(id).unwrap();
        assert_eq!(first, again);
        let components = sys.get_force::<HydroForces>().unwrap().last_components().unwrap();
        assert_eq!(components.tick, 0);
        // at rest: no radiation yet
        assert_eq!(components.radiation[2], 0.0);
        assert_relative_eq!(
            components.hydrostatic[2],
            9810.0 * 261.799 + 78.54 * 9810.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn late_provider_leaves_running_history_alone() {
        let mut interrupted = decay_system(HydroInputs::default());
        let mut straight = decay_system(HydroInputs::default());
        let id = interrupted.body_by_name("body1").unwrap();
        for _ in 0..20 {
            interrupted.step().unwrap();
        }
        let late = HydroForces::new(sphere_data(20, 0.015), HydroInputs::default());
        let err = interrupted.add_force(late).unwrap_err();
        assert!(matches!(err, CoreError::AlreadyInitialized));
        for _ in 0..20 {
            interrupted.step().unwrap();
        }
        for _ in 0..40 {
            straight.step().unwrap();
        }
        assert_eq!(
            interrupted.body(id).unwrap().heave(),
            straight.body(id).unwrap().heave()
        );
    }

    #[test]
    fn moving_a_body_refreshes_cached_forces() {
        let mut sys = decay_system(HydroInputs::default());
        let id = sys.body_by_name("body1").unwrap();
        sys.step().unwrap();
        let before = sys.provider_force(id).unwrap();
        let hydro = sys.get_force::<HydroForces>().unwrap();
        let radiation = hydro.last_components().unwrap().radiation[2];

        sys.body_mut(id).unwrap().position.z += 1.0;
        let after = sys.provider_force(id).unwrap();
        // K33 = 78.54 m², scaled by ρg
        assert_relative_eq!(after[2] - before[2], -78.54 * 9810.0, epsilon = 1e-3);

        // same tick, same velocity: the history slot is rewritten, not pushed
        let components = sys.get_force::<HydroForces>().unwrap().last_components().unwrap();
        assert_eq!(components.tick, 1);
        assert_eq!(components.radiation[2], radiation);
    }

    #[test]
    fn regular_wave_adds_excitation() {
        let mut sys = decay_system(HydroInputs::regular(1.0, 1.0));
        let id = sys.body_by_name("body1").unwrap();
        sys.provider_force(id).unwrap();
        let components = sys.get_force::<HydroForces>().unwrap().last_components().unwrap();
        // t = 0: |X|·A·cos(∠X)
        assert_relative_eq!(
            components.excitation[2],
            60.0 * 9810.0 * 0.1_f64.cos(),
            epsilon = 1e-6
        );
    }

    #[test]
    fn calm_water_has_no_excitation() {
        let mut sys = decay_system(HydroInputs::calm().with_regular_wave_amplitude(5.0));
        sys.step().unwrap();
        let components = sys.get_force::<HydroForces>().unwrap().last_components().unwrap();
        assert!(components.excitation.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn missing_body_fails_init() {
        let mut sys = BodySystem::new(SimConfig::default()).unwrap();
        sys.add_body(RigidBody::new("buoy", 1.0)).unwrap();
        sys.add_force(HydroForces::new(sphere_data(3, 0.015), HydroInputs::default()))
            .unwrap();
        let err = sys.init().unwrap_err();
        assert!(matches!(err, CoreError::Provider { .. }));
        assert!(err.to_string().contains("buoy"));
    }

    #[test]
    fn body_count_must_match_file() {
        let data = HydroData::from_json_str(&two_body_json().to_string()).unwrap();
        let mut sys = BodySystem::new(SimConfig::default()).unwrap();
        sys.add_body(RigidBody::new("float", 1.0)).unwrap();
        sys.add_force(HydroForces::new(data, HydroInputs::default()))
            .unwrap();
        let err = sys.init().unwrap_err();
        assert!(err.to_string().contains("expected 6x6"));
    }

    #[test]
    fn added_mass_follows_system_body_order() {
        let data = HydroData::from_json_str(&two_body_json().to_string()).unwrap();
        let mut forces = HydroForces::new(data, HydroInputs::default());
        let bodies = [RigidBody::new("plate", 1.0), RigidBody::new("float", 1.0)];
        forces.init(&bodies, 0.015).unwrap();
        let a = forces.added_mass(2).unwrap();
        // system body 0 is "plate" (file body 2)
        assert_eq!(a[(2, 2)], 2.0);
        assert_eq!(a[(2, 8)], 0.25);
        assert_eq!(a[(8, 8)], 1.0);
        assert_eq!(a[(8, 2)], 0.5);
    }

    #[test]
    fn regular_wave_without_coefficients_fails() {
        let data = HydroData::from_json_str(&two_body_json().to_string()).unwrap();
        let mut forces = HydroForces::new(data, HydroInputs::regular(1.0, 1.0));
        let bodies = [RigidBody::new("float", 1.0), RigidBody::new("plate", 1.0)];
        assert!(forces.init(&bodies, 0.015).is_err());
    }

    #[test]
    fn fixed_step_convolution_also_damps() {
        let mut sys = BodySystem::new(SimConfig::default().with_end_time(10.0)).unwrap();
        let id = sys.add_body(floating_sphere()).unwrap();
        sys.add_force(
            HydroForces::new(sphere_data(20, 0.015), HydroInputs::default())
                .with_convolution(ConvolutionMethod::FixedStep),
        )
        .unwrap();
        let mut max = f64::MIN;
        sys.run_sampled(|s| {
            max = max.max(s.body(id).map_or(0.0, RigidBody::heave));
            Ok(())
        })
        .unwrap();
        assert!(max < 1.0);
        assert_eq!(
            sys.get_force::<HydroForces>().unwrap().convolution(),
            ConvolutionMethod::FixedStep
        );
    }
}
