//! JSON scenario files for `heave run`.

use std::path::{Path, PathBuf};

use heave_core::{IntegrationMethod, RigidBody, SimConfig};
use heave_hydro::{ConvolutionMethod, HydroInputs};
use nalgebra::{Matrix3, Vector3};
use serde::Deserialize;

use super::{OutputColumns, OutputFormat};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub simulation: SimulationSection,
    pub bodies: Vec<BodySpec>,
    #[serde(default)]
    pub hydro: Option<HydroSection>,
    #[serde(default)]
    pub output: OutputSection,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationSection {
    pub timestep: f64,
    pub end_time: f64,
    pub gravity: [f64; 3],
    pub integrator: Integrator,
}

impl Default for SimulationSection {
    fn default() -> Self {
        let config = SimConfig::default();
        let g = config.gravity;
        Self {
            timestep: config.timestep,
            end_time: config.end_time,
            gravity: [g.x, g.y, g.z],
            integrator: Integrator::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Integrator {
    #[default]
    SemiImplicitEuler,
    ExplicitEuler,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BodySpec {
    pub name: String,
    #[serde(default)]
    pub mass: Option<f64>,
    #[serde(default)]
    pub position: [f64; 3],
    #[serde(default)]
    pub velocity: [f64; 3],
    #[serde(default)]
    pub sphere: Option<SphereSpec>,
    /// Principal moments of inertia about the centre of mass.
    #[serde(default)]
    pub inertia: Option<[f64; 3]>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SphereSpec {
    pub radius: f64,
    #[serde(default = "unit_density")]
    pub density: f64,
}

fn unit_density() -> f64 {
    1.0
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HydroSection {
    pub file: PathBuf,
    #[serde(default)]
    pub waves: HydroInputs,
    #[serde(default)]
    pub convolution: ConvolutionMethod,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSection {
    pub path: PathBuf,
    pub format: OutputFormat,
    pub columns: OutputColumns,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            path: PathBuf::from("outfile/scenario_out.txt"),
            format: OutputFormat::default(),
            columns: OutputColumns::default(),
        }
    }
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
        let scenario: Self = serde_json::from_str(&text)
            .map_err(|e| format!("invalid scenario {}: {e}", path.display()))?;
        if scenario.bodies.is_empty() {
            return Err(format!("{}: scenario has no bodies", path.display()));
        }
        Ok(scenario)
    }

    pub fn config(&self) -> SimConfig {
        let sim = &self.simulation;
        let integrator = match sim.integrator {
            Integrator::SemiImplicitEuler => IntegrationMethod::SemiImplicitEuler,
            Integrator::ExplicitEuler => IntegrationMethod::ExplicitEuler,
        };
        SimConfig::default()
            .with_timestep(sim.timestep)
            .with_end_time(sim.end_time)
            .with_gravity(Vector3::from(sim.gravity))
            .with_integrator(integrator)
    }

    /// Where the hydro file lives: absolute paths are kept, relative ones are
    /// joined to `data_dir` if given, else to the scenario's directory.
    pub fn hydro_path(&self, scenario_path: &Path, data_dir: Option<&Path>) -> Option<PathBuf> {
        let file = &self.hydro.as_ref()?.file;
        if file.is_absolute() {
            return Some(file.clone());
        }
        let base = data_dir
            .map(Path::to_path_buf)
            .or_else(|| scenario_path.parent().map(Path::to_path_buf))
            .unwrap_or_default();
        Some(base.join(file))
    }
}

impl BodySpec {
    pub fn build(&self) -> Result<RigidBody, String> {
        let mut body = match (&self.sphere, self.mass) {
            (Some(sphere), mass) => {
                let body = RigidBody::sphere(self.name.as_str(), sphere.radius, sphere.density);
                match mass {
                    Some(m) => body.with_mass(m),
                    None => body,
                }
            }
            (None, Some(mass)) => RigidBody::new(self.name.as_str(), mass),
            (None, None) => {
                return Err(format!(
                    "body \"{}\" needs a mass or a sphere shape",
                    self.name
                ));
            }
        };
        if let Some([ixx, iyy, izz]) = self.inertia {
            body = body.with_inertia(Matrix3::from_diagonal(&Vector3::new(ixx, iyy, izz)));
        }
        Ok(body
            .with_position(Vector3::from(self.position))
            .with_linear_velocity(Vector3::from(self.velocity)))
    }
}
