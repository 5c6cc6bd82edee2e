use nalgebra::Vector6;

use crate::data::BodyHydroData;
use crate::error::{HydroError, HydroResult};
use crate::waves::HydroInputs;

/// Excitation force of a regular wave on one body.
///
/// Magnitudes and phases are interpolated once at the wave frequency, at
/// the first heading.
#[derive(Debug, Clone, PartialEq)]
pub struct RegularWaveExcitation {
    amplitude: f64,
    omega: f64,
    magnitude: Vector6<f64>,
    phase: Vector6<f64>,
}

impl RegularWaveExcitation {
    /// Prepare the excitation for `data` under the regular wave in `inputs`.
    pub fn new(data: &BodyHydroData, inputs: &HydroInputs) -> HydroResult<Self> {
        inputs.validate()?;
        if !data.has_excitation() {
            return Err(HydroError::InvalidData(format!(
                "{}: regular waves need excitation coefficients",
                data.name()
            )));
        }
        let omega = inputs.regular_wave_omega;
        let freq_index = omega / data.omega_delta() - 1.0;
        if omega < data.omega_min() || omega > data.omega_max() {
            tracing::warn!(
                body = data.name(),
                omega,
                min = data.omega_min(),
                max = data.omega_max(),
                "wave frequency outside coefficient range; clamping"
            );
        }
        Ok(Self {
            amplitude: inputs.regular_wave_amplitude,
            omega,
            magnitude: Vector6::from_fn(|r, _| data.excitation_mag_interp(r, 0, freq_index)),
            phase: Vector6::from_fn(|r, _| data.excitation_phase_interp(r, 0, freq_index)),
        })
    }

    /// Force and moment at time `t`.
    pub fn force(&self, t: f64) -> Vector6<f64> {
        Vector6::from_fn(|r, _| {
            self.magnitude[r] * self.amplitude * (self.omega * t + self.phase[r]).cos()
        })
    }

    /// Interpolated magnitude per dof, already scaled by `ρ·g`.
    pub fn magnitude(&self) -> &Vector6<f64> {
        &self.magnitude
    }

    /// Interpolated phase per dof (rad).
    pub fn phase(&self) -> &Vector6<f64> {
        &self.phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::HydroData;
    use crate::data::tests::sphere_json;
    use approx::assert_relative_eq;

    #[test]
    fn force_on_grid_frequency() {
        let data = HydroData::from_json_str(&sphere_json(3, 0.1).to_string()).unwrap();
        let body = data.body("body1").unwrap();
        // ω = 1.0 is the second grid point: |X| = 60, ∠X = 0.1
        let ex = RegularWaveExcitation::new(body, &HydroInputs::regular(2.0, 1.0)).unwrap();
        let scale = 1000.0 * 9.81;
        assert_relative_eq!(ex.magnitude()[2], 60.0 * scale, epsilon = 1e-6);
        assert_relative_eq!(ex.phase()[2], 0.1, epsilon = 1e-12);
        let t = 0.7;
        assert_relative_eq!(
            ex.force(t)[2],
            60.0 * scale * 2.0 * (1.0 * t + 0.1_f64).cos(),
            epsilon = 1e-6
        );
        assert_eq!(ex.force(t)[0], 0.0);
    }

    #[test]
    fn interpolates_between_frequencies() {
        let data = HydroData::from_json_str(&sphere_json(3, 0.1).to_string()).unwrap();
        let body = data.body("body1").unwrap();
        let ex = RegularWaveExcitation::new(body, &HydroInputs::regular(1.0, 1.25)).unwrap();
        assert_relative_eq!(ex.magnitude()[2], 50.0 * 9810.0, epsilon = 1e-6);
    }

    #[test]
    fn requires_excitation_data() {
        let mut doc = sphere_json(3, 0.1);
        doc["body1"]["hydro_coeffs"]
            .as_object_mut()
            .unwrap()
            .remove("excitation");
        let data = HydroData::from_json_str(&doc.to_string()).unwrap();
        let err =
            RegularWaveExcitation::new(data.body("body1").unwrap(), &HydroInputs::regular(1.0, 1.0))
                .unwrap_err();
        assert!(matches!(err, HydroError::InvalidData(_)));
    }
}
