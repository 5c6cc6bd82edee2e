use serde::{Deserialize, Serialize};

use crate::error::{HydroError, HydroResult};

/// Incident wave model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveMode {
    /// Calm water; only hydrostatics and radiation act (free decay).
    #[default]
    NoWaveCic,
    /// A single regular (monochromatic) wave.
    Regular,
}

/// Wave settings for a hydrodynamic force model.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HydroInputs {
    /// Which wave model to apply.
    pub mode: WaveMode,
    /// Regular wave amplitude (m).
    pub regular_wave_amplitude: f64,
    /// Regular wave angular frequency (rad/s).
    pub regular_wave_omega: f64,
}

impl HydroInputs {
    /// Calm water.
    pub fn calm() -> Self {
        Self::default()
    }

    /// A regular wave of the given amplitude and frequency.
    pub fn regular(amplitude: f64, omega: f64) -> Self {
        Self {
            mode: WaveMode::Regular,
            regular_wave_amplitude: amplitude,
            regular_wave_omega: omega,
        }
    }

    /// Set the wave model.
    pub fn with_mode(mut self, mode: WaveMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the regular wave amplitude.
    pub fn with_regular_wave_amplitude(mut self, amplitude: f64) -> Self {
        self.regular_wave_amplitude = amplitude;
        self
    }

    /// Set the regular wave angular frequency.
    pub fn with_regular_wave_omega(mut self, omega: f64) -> Self {
        self.regular_wave_omega = omega;
        self
    }

    /// Check the settings needed by the selected mode.
    pub fn validate(&self) -> HydroResult<()> {
        if self.mode == WaveMode::Regular {
            if !self.regular_wave_omega.is_finite() || self.regular_wave_omega <= 0.0 {
                return Err(HydroError::InvalidData(format!(
                    "regular wave omega must be positive, got {}",
                    self.regular_wave_omega
                )));
            }
            if !self.regular_wave_amplitude.is_finite() {
                return Err(HydroError::InvalidData(
                    "regular wave amplitude must be finite".into(),
                ));
            }
        }
        Ok(())
    }
}
