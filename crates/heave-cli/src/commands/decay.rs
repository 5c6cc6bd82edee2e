use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use colored::Colorize;
use heave_core::{BodySystem, RigidBody, Sample, SimConfig, TraceWriter};
use heave_hydro::{HydroData, HydroForces, HydroInputs};
use nalgebra::Vector3;
use tracing::info;

use super::{Convolution, OutputColumns, OutputFormat};

#[derive(Debug, Args)]
pub struct DecayArgs {
    /// Trace file to write
    #[arg(short, long, default_value = "outfile/py_out.txt")]
    output: PathBuf,

    /// Fixed step size (s)
    #[arg(long, default_value = "0.015")]
    timestep: f64,

    /// Last sampled time (s), inclusive
    #[arg(long, default_value = "40")]
    end_time: f64,

    /// Sphere radius (m)
    #[arg(long, default_value = "5")]
    radius: f64,

    /// Sphere density, used for its inertia (kg/m³)
    #[arg(long, default_value = "1")]
    density: f64,

    /// Sphere mass (kg)
    #[arg(long, default_value = "261800")]
    mass: f64,

    /// Initial heave position (m)
    #[arg(long, default_value = "-1", allow_hyphen_values = true)]
    initial_z: f64,

    /// Hydrodynamic coefficient file; without it the sphere falls freely
    #[arg(long)]
    hydro: Option<PathBuf>,

    /// Regular wave amplitude (m)
    #[arg(long, requires_all = ["hydro", "wave_omega"])]
    wave_amplitude: Option<f64>,

    /// Regular wave angular frequency (rad/s)
    #[arg(long, requires_all = ["hydro", "wave_amplitude"])]
    wave_omega: Option<f64>,

    /// Radiation convolution quadrature
    #[arg(long, value_enum, default_value_t)]
    convolution: Convolution,

    /// Values written per row
    #[arg(long, value_enum, default_value_t)]
    columns: OutputColumns,

    /// Trace file layout
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,

    /// Write the wall-clock duration to duration_ms.txt beside the output
    #[arg(long)]
    profile: bool,
}

pub fn run(args: &DecayArgs) -> Result<(), String> {
    let start = Instant::now();

    let config = SimConfig::default()
        .with_timestep(args.timestep)
        .with_end_time(args.end_time);
    let mut system =
        BodySystem::new(config).map_err(|e| format!("invalid configuration: {e}"))?;

    let sphere = RigidBody::sphere("body1", args.radius, args.density)
        .with_mass(args.mass)
        .with_position(Vector3::new(0.0, 0.0, args.initial_z));
    let id = system.add_body(sphere).map_err(|e| e.to_string())?;

    if let Some(path) = &args.hydro {
        let data = HydroData::from_path(path).map_err(|e| e.to_string())?;
        let inputs = match (args.wave_amplitude, args.wave_omega) {
            (Some(amplitude), Some(omega)) => HydroInputs::regular(amplitude, omega),
            _ => HydroInputs::calm(),
        };
        system
            .add_force(HydroForces::new(data, inputs).with_convolution(args.convolution.into()))
            .map_err(|e| e.to_string())?;
    }

    let out = super::create_output(&args.output)?;
    let mut writer = TraceWriter::new(out, args.format.into(), args.columns.into());
    let mut last: Option<Sample> = None;
    let samples = system
        .run_sampled(|s| {
            let sample = s.sample(id)?;
            writer.write_sample(&sample)?;
            last = Some(sample);
            Ok(())
        })
        .map_err(|e| format!("simulation error: {e}"))?;
    writer
        .finish()
        .map_err(|e| format!("cannot write {}: {e}", args.output.display()))?;

    let elapsed = start.elapsed();
    info!(samples, elapsed_ms = elapsed.as_millis() as u64, "decay run finished");

    println!(
        "  {} {} {}",
        "Decay".bold(),
        args.output.display(),
        format!("({samples} samples, dt={}s)", args.timestep).dimmed()
    );
    if let Some(last) = last {
        println!("  final time:  {:.3} s", last.time);
        println!("  final heave: {:.4} m", last.position.z);
    }
    if args.profile {
        let path = super::write_profile(&args.output, elapsed)?;
        println!("  duration:    {} ms ({})", elapsed.as_millis(), path.display());
    }

    Ok(())
}
