//! Hydrodynamic coefficients in the bemio group layout.
//!
//! Datasets are stored non-dimensionally as produced by the BEM solver and
//! scaled on access: stiffness and excitation by `ρ·g`, added mass and the
//! radiation impulse response by `ρ`.

use std::collections::BTreeMap;
use std::path::Path;

use nalgebra::{DMatrix, Vector3};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{HydroError, HydroResult};

#[derive(Debug, Deserialize)]
struct RawFile {
    simulation_parameters: RawSimulationParameters,
    #[serde(flatten)]
    groups: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawSimulationParameters {
    rho: f64,
    g: f64,
    w: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct RawBody {
    properties: RawProperties,
    hydro_coeffs: RawCoeffs,
}

#[derive(Debug, Deserialize)]
struct RawProperties {
    body_number: f64,
    cg: Vec<f64>,
    cb: Vec<f64>,
    disp_vol: f64,
}

#[derive(Debug, Deserialize)]
struct RawCoeffs {
    linear_restoring_stiffness: Vec<Vec<f64>>,
    added_mass: RawAddedMass,
    radiation_damping: RawRadiationDamping,
    #[serde(default)]
    excitation: Option<RawExcitation>,
}

#[derive(Debug, Deserialize)]
struct RawAddedMass {
    inf_freq: Vec<Vec<f64>>,
}

#[derive(Debug, Deserialize)]
struct RawRadiationDamping {
    impulse_response_fun: RawImpulseResponse,
}

#[derive(Debug, Deserialize)]
struct RawImpulseResponse {
    #[serde(rename = "K")]
    k: Vec<Vec<Vec<f64>>>,
    t: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct RawExcitation {
    mag: Vec<Vec<Vec<f64>>>,
    phase: Vec<Vec<Vec<f64>>>,
}

/// Dense row-major 3-D array.
#[derive(Debug, Clone, PartialEq)]
pub struct Array3 {
    dims: [usize; 3],
    data: Vec<f64>,
}

impl Array3 {
    fn from_nested(dataset: &str, nested: Vec<Vec<Vec<f64>>>) -> HydroResult<Self> {
        let d0 = nested.len();
        let d1 = nested.first().map_or(0, Vec::len);
        let d2 = nested
            .first()
            .and_then(|m| m.first())
            .map_or(0, Vec::len);
        let mut data = Vec::with_capacity(d0 * d1 * d2);
        for (i, plane) in nested.into_iter().enumerate() {
            if plane.len() != d1 {
                return Err(ragged(dataset, i, d1, plane.len()));
            }
            for (j, line) in plane.into_iter().enumerate() {
                if line.len() != d2 {
                    return Err(ragged(dataset, j, d2, line.len()));
                }
                data.extend(line);
            }
        }
        Ok(Self {
            dims: [d0, d1, d2],
            data,
        })
    }

    /// Sizes along each axis.
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Element `(i, j, k)`. Panics when out of bounds.
    pub fn get(&self, i: usize, j: usize, k: usize) -> f64 {
        let [_, d1, d2] = self.dims;
        self.data[k + d2 * (j + i * d1)]
    }
}

fn ragged(dataset: &str, index: usize, expected: usize, found: usize) -> HydroError {
    HydroError::DimensionMismatch {
        dataset: dataset.to_string(),
        expected: format!("{expected} entries in every row"),
        found: format!("{found} in row {index}"),
    }
}

fn matrix_from_rows(dataset: &str, rows: Vec<Vec<f64>>) -> HydroResult<DMatrix<f64>> {
    let nrows = rows.len();
    let ncols = rows.first().map_or(0, Vec::len);
    let mut flat = Vec::with_capacity(nrows * ncols);
    for (i, row) in rows.into_iter().enumerate() {
        if row.len() != ncols {
            return Err(ragged(dataset, i, ncols, row.len()));
        }
        flat.extend(row);
    }
    Ok(DMatrix::from_row_slice(nrows, ncols, &flat))
}

fn vector3(dataset: &str, v: &[f64]) -> HydroResult<Vector3<f64>> {
    match v {
        [x, y, z] => Ok(Vector3::new(*x, *y, *z)),
        _ => Err(HydroError::DimensionMismatch {
            dataset: dataset.to_string(),
            expected: "3 components".into(),
            found: v.len().to_string(),
        }),
    }
}

fn expect_dims(dataset: &str, expected: &str, ok: bool, found: String) -> HydroResult<()> {
    if ok {
        Ok(())
    } else {
        Err(HydroError::DimensionMismatch {
            dataset: dataset.to_string(),
            expected: expected.to_string(),
            found,
        })
    }
}

/// Wave excitation magnitude (non-dimensional) and phase (rad), indexed
/// `(dof, heading, frequency)`.
#[derive(Debug, Clone)]
struct ExcitationCoefficients {
    mag: Array3,
    phase: Array3,
}

/// Coefficients for one body.
#[derive(Debug, Clone)]
pub struct BodyHydroData {
    name: String,
    body_number: usize,
    rho: f64,
    g: f64,
    disp_vol: f64,
    cg: Vector3<f64>,
    cb: Vector3<f64>,
    lin_matrix: DMatrix<f64>,
    inf_added_mass: DMatrix<f64>,
    rirf: Array3,
    rirf_time: Vec<f64>,
    excitation: Option<ExcitationCoefficients>,
    freq_list: Vec<f64>,
}

impl BodyHydroData {
    fn from_raw(name: &str, raw: RawBody, params: &RawSimulationParameters) -> HydroResult<Self> {
        let path = |suffix: &str| format!("{name}/{suffix}");

        let number = raw.properties.body_number;
        if number.fract() != 0.0 || number < 1.0 {
            return Err(HydroError::InvalidData(format!(
                "{}: body numbers start at 1, got {number}",
                path("properties/body_number")
            )));
        }

        let cg = vector3(&path("properties/cg"), &raw.properties.cg)?;
        let cb = vector3(&path("properties/cb"), &raw.properties.cb)?;
        if !raw.properties.disp_vol.is_finite() || raw.properties.disp_vol < 0.0 {
            return Err(HydroError::InvalidData(format!(
                "{}: must be non-negative",
                path("properties/disp_vol")
            )));
        }

        let coeffs = raw.hydro_coeffs;
        let lin_name = path("hydro_coeffs/linear_restoring_stiffness");
        let lin_matrix = matrix_from_rows(&lin_name, coeffs.linear_restoring_stiffness)?;
        expect_dims(
            &lin_name,
            "6x6",
            lin_matrix.shape() == (6, 6),
            format!("{}x{}", lin_matrix.nrows(), lin_matrix.ncols()),
        )?;

        let am_name = path("hydro_coeffs/added_mass/inf_freq");
        let inf_added_mass = matrix_from_rows(&am_name, coeffs.added_mass.inf_freq)?;
        let total_dofs = inf_added_mass.ncols();
        expect_dims(
            &am_name,
            "6x6N",
            inf_added_mass.nrows() == 6 && total_dofs > 0 && total_dofs % 6 == 0,
            format!("{}x{}", inf_added_mass.nrows(), total_dofs),
        )?;

        let k_name = path("hydro_coeffs/radiation_damping/impulse_response_fun/K");
        let irf = coeffs.radiation_damping.impulse_response_fun;
        let rirf = Array3::from_nested(&k_name, irf.k)?;
        let [r0, r1, r2] = rirf.dims();
        expect_dims(
            &k_name,
            &format!("6x{total_dofs}xS with S >= 2"),
            r0 == 6 && r1 == total_dofs && r2 >= 2,
            format!("{r0}x{r1}x{r2}"),
        )?;
        let t_name = path("hydro_coeffs/radiation_damping/impulse_response_fun/t");
        expect_dims(
            &t_name,
            &format!("{r2} samples"),
            irf.t.len() == r2,
            irf.t.len().to_string(),
        )?;
        if irf.t.windows(2).any(|w| w[1] <= w[0]) {
            return Err(HydroError::InvalidData(format!(
                "{t_name}: must be strictly increasing"
            )));
        }

        let n_freq = params.w.len();
        let excitation = match coeffs.excitation {
            Some(ex) => {
                let load = |suffix: &str, nested| -> HydroResult<Array3> {
                    let dataset = path(&format!("hydro_coeffs/excitation/{suffix}"));
                    let arr = Array3::from_nested(&dataset, nested)?;
                    let [e0, e1, e2] = arr.dims();
                    expect_dims(
                        &dataset,
                        &format!("6xHx{n_freq}"),
                        e0 == 6 && e1 >= 1 && e2 == n_freq,
                        format!("{e0}x{e1}x{e2}"),
                    )?;
                    Ok(arr)
                };
                let mag = load("mag", ex.mag)?;
                let phase = load("phase", ex.phase)?;
                Some(ExcitationCoefficients { mag, phase })
            }
            None => None,
        };

        Ok(Self {
            name: name.to_string(),
            body_number: number as usize,
            rho: params.rho,
            g: params.g,
            disp_vol: raw.properties.disp_vol,
            cg,
            cb,
            lin_matrix,
            inf_added_mass,
            rirf,
            rirf_time: irf.t,
            excitation,
            freq_list: params.w.clone(),
        })
    }

    /// Group name of this body, e.g. `body1`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// One-based body number within the file.
    pub fn body_number(&self) -> usize {
        self.body_number
    }

    /// Water density (kg/m³).
    pub fn rho(&self) -> f64 {
        self.rho
    }

    /// Gravitational acceleration (m/s²).
    pub fn g(&self) -> f64 {
        self.g
    }

    /// Displaced volume at equilibrium (m³).
    pub fn disp_vol(&self) -> f64 {
        self.disp_vol
    }

    /// Centre of gravity at equilibrium.
    pub fn cg(&self) -> Vector3<f64> {
        self.cg
    }

    /// Centre of buoyancy at equilibrium.
    pub fn cb(&self) -> Vector3<f64> {
        self.cb
    }

    /// Linear restoring stiffness, scaled by `ρ·g` (6×6).
    pub fn hydrostatic_stiffness(&self) -> DMatrix<f64> {
        &self.lin_matrix * (self.rho * self.g)
    }

    /// Infinite-frequency added mass, scaled by `ρ` (6×6N).
    pub fn infinite_added_mass(&self) -> DMatrix<f64> {
        &self.inf_added_mass * self.rho
    }

    /// Radiation impulse response value for `(row, col, step)`, scaled by `ρ`.
    pub fn rirf_value(&self, row: usize, col: usize, step: usize) -> f64 {
        self.rirf.get(row, col, step) * self.rho
    }

    /// `[rows, columns, steps]` of the radiation impulse response.
    pub fn rirf_dims(&self) -> [usize; 3] {
        self.rirf.dims()
    }

    /// Sample times of the radiation impulse response.
    pub fn rirf_time(&self) -> &[f64] {
        &self.rirf_time
    }

    /// Spacing of the first two impulse response samples.
    pub fn rirf_timestep(&self) -> f64 {
        self.rirf_time[1] - self.rirf_time[0]
    }

    /// Whether excitation coefficients are present.
    pub fn has_excitation(&self) -> bool {
        self.excitation.is_some()
    }

    /// Number of wave frequencies.
    pub fn num_freqs(&self) -> usize {
        self.freq_list.len()
    }

    /// Lowest wave frequency (rad/s).
    pub fn omega_min(&self) -> f64 {
        self.freq_list[0]
    }

    /// Highest wave frequency (rad/s).
    pub fn omega_max(&self) -> f64 {
        self.freq_list[self.freq_list.len() - 1]
    }

    /// Frequency spacing, assuming `w = Δω, 2Δω, …, nΔω`.
    pub fn omega_delta(&self) -> f64 {
        self.omega_max() / self.num_freqs() as f64
    }

    /// Excitation magnitude for `(dof, heading, frequency)`, scaled by `ρ·g`.
    ///
    /// Returns 0 when the file carries no excitation data.
    pub fn excitation_mag(&self, i: usize, j: usize, k: usize) -> f64 {
        self.excitation
            .as_ref()
            .map_or(0.0, |ex| ex.mag.get(i, j, k) * self.rho * self.g)
    }

    /// Excitation phase (rad) for `(dof, heading, frequency)`.
    pub fn excitation_phase(&self, i: usize, j: usize, k: usize) -> f64 {
        self.excitation
            .as_ref()
            .map_or(0.0, |ex| ex.phase.get(i, j, k))
    }

    /// Magnitude linearly interpolated at a fractional frequency index.
    pub fn excitation_mag_interp(&self, i: usize, j: usize, freq_index: f64) -> f64 {
        self.interp(freq_index, |k| self.excitation_mag(i, j, k))
    }

    /// Phase linearly interpolated at a fractional frequency index.
    pub fn excitation_phase_interp(&self, i: usize, j: usize, freq_index: f64) -> f64 {
        self.interp(freq_index, |k| self.excitation_phase(i, j, k))
    }

    fn interp(&self, freq_index: f64, value: impl Fn(usize) -> f64) -> f64 {
        let last = self.num_freqs() - 1;
        let idx = freq_index.clamp(0.0, last as f64);
        let k0 = idx.floor() as usize;
        let k1 = (k0 + 1).min(last);
        let frac = idx - k0 as f64;
        let lo = value(k0);
        let hi = value(k1);
        lo + frac * (hi - lo)
    }
}

/// All coefficients from one file.
#[derive(Debug, Clone)]
pub struct HydroData {
    rho: f64,
    g: f64,
    frequencies: Vec<f64>,
    bodies: Vec<BodyHydroData>,
}

impl HydroData {
    /// Load coefficients from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> HydroResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| HydroError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let data = Self::parse(&text, &path.display().to_string())?;
        info!(
            path = %path.display(),
            bodies = data.bodies.len(),
            rirf_steps = data.bodies[0].rirf_dims()[2],
            "loaded hydrodynamic coefficients"
        );
        Ok(data)
    }

    /// Parse coefficients from a JSON string.
    pub fn from_json_str(text: &str) -> HydroResult<Self> {
        Self::parse(text, "<string>")
    }

    fn parse(text: &str, origin: &str) -> HydroResult<Self> {
        let raw: RawFile = serde_json::from_str(text).map_err(|source| HydroError::Parse {
            origin: origin.to_string(),
            source,
        })?;
        let params = raw.simulation_parameters;
        if params.w.is_empty() {
            return Err(HydroError::InvalidData(
                "simulation_parameters/w: no frequencies".into(),
            ));
        }
        for (name, value) in [("rho", params.rho), ("g", params.g)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(HydroError::InvalidData(format!(
                    "simulation_parameters/{name}: must be positive, got {value}"
                )));
            }
        }

        let mut bodies = Vec::new();
        for (name, value) in raw.groups {
            let is_body = value.get("properties").is_some() && value.get("hydro_coeffs").is_some();
            if !is_body {
                debug!(group = %name, "skipping non-body group");
                continue;
            }
            let body: RawBody =
                serde_json::from_value(value).map_err(|source| HydroError::Parse {
                    origin: format!("{origin} ({name})"),
                    source,
                })?;
            bodies.push(BodyHydroData::from_raw(&name, body, &params)?);
        }
        if bodies.is_empty() {
            return Err(HydroError::InvalidData("no body groups found".into()));
        }
        bodies.sort_by_key(BodyHydroData::body_number);

        let n = bodies.len();
        for (i, body) in bodies.iter().enumerate() {
            if body.body_number != i + 1 {
                return Err(HydroError::InvalidData(format!(
                    "body numbers must run 1..={n}; \"{}\" has {}",
                    body.name, body.body_number
                )));
            }
            expect_dims(
                &format!("{}/hydro_coeffs/added_mass/inf_freq", body.name),
                &format!("6x{}", 6 * n),
                body.inf_added_mass.ncols() == 6 * n,
                format!("6x{}", body.inf_added_mass.ncols()),
            )?;
        }
        let steps = bodies[0].rirf_dims()[2];
        if let Some(other) = bodies.iter().find(|b| b.rirf_dims()[2] != steps) {
            return Err(HydroError::InvalidData(format!(
                "impulse response length differs: {} has {}, {} has {steps}",
                other.name,
                other.rirf_dims()[2],
                bodies[0].name
            )));
        }

        Ok(Self {
            rho: params.rho,
            g: params.g,
            frequencies: params.w,
            bodies,
        })
    }

    /// Water density (kg/m³).
    pub fn rho(&self) -> f64 {
        self.rho
    }

    /// Gravitational acceleration (m/s²).
    pub fn g(&self) -> f64 {
        self.g
    }

    /// Wave frequencies (rad/s).
    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    /// Bodies ordered by body number.
    pub fn bodies(&self) -> &[BodyHydroData] {
        &self.bodies
    }

    /// Degrees of freedom covered by the file (6 per body).
    pub fn total_dofs(&self) -> usize {
        6 * self.bodies.len()
    }

    /// Coefficients for the named body.
    pub fn body(&self, name: &str) -> HydroResult<&BodyHydroData> {
        self.bodies
            .iter()
            .find(|b| b.name == name)
            .ok_or_else(|| HydroError::MissingBody(name.to_string()))
    }

    /// Index into [`Self::bodies`] of the named body.
    pub fn body_index(&self, name: &str) -> HydroResult<usize> {
        self.bodies
            .iter()
            .position(|b| b.name == name)
            .ok_or_else(|| HydroError::MissingBody(name.to_string()))
    }
}
