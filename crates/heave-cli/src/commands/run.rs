use std::path::Path;
use std::time::Instant;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use heave_core::{BodyId, BodySystem, TraceWriter};
use heave_hydro::{HydroData, HydroForces};
use tracing::info;

use super::scenario::Scenario;

/// Per-body heave extremes collected while sampling.
struct HeaveRange {
    min: f64,
    max: f64,
    last: f64,
}

pub fn run(
    scenario_path: &Path,
    data_dir: Option<&Path>,
    output: Option<&Path>,
) -> Result<(), String> {
    let start = Instant::now();
    let scenario = Scenario::load(scenario_path)?;

    let mut system = BodySystem::new(scenario.config())
        .map_err(|e| format!("invalid simulation settings: {e}"))?;
    let mut ids: Vec<BodyId> = Vec::with_capacity(scenario.bodies.len());
    for spec in &scenario.bodies {
        let body = spec.build()?;
        ids.push(system.add_body(body).map_err(|e| e.to_string())?);
    }

    if let (Some(hydro), Some(path)) = (
        &scenario.hydro,
        scenario.hydro_path(scenario_path, data_dir),
    ) {
        let data = HydroData::from_path(&path).map_err(|e| e.to_string())?;
        system
            .add_force(HydroForces::new(data, hydro.waves).with_convolution(hydro.convolution))
            .map_err(|e| e.to_string())?;
    }
    system
        .init()
        .map_err(|e| format!("simulation init failed: {e}"))?;

    let out_path = output.unwrap_or(scenario.output.path.as_path());
    let out = super::create_output(out_path)?;
    let names: Vec<&str> = scenario.bodies.iter().map(|b| b.name.as_str()).collect();
    let mut writer = TraceWriter::new(
        out,
        scenario.output.format.into(),
        scenario.output.columns.into(),
    )
    .with_bodies(names.iter().copied());

    let mut ranges: Vec<HeaveRange> = system
        .bodies()
        .iter()
        .map(|b| HeaveRange {
            min: b.heave(),
            max: b.heave(),
            last: b.heave(),
        })
        .collect();
    let samples = system
        .run_sampled(|s| {
            let row = ids
                .iter()
                .map(|&id| s.sample(id))
                .collect::<Result<Vec<_>, _>>()?;
            for (range, sample) in ranges.iter_mut().zip(&row) {
                let z = sample.position.z;
                range.min = range.min.min(z);
                range.max = range.max.max(z);
                range.last = z;
            }
            writer.write_samples(&row)
        })
        .map_err(|e| format!("simulation error: {e}"))?;
    writer
        .finish()
        .map_err(|e| format!("cannot write {}: {e}", out_path.display()))?;
    info!(
        samples,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "scenario finished"
    );

    println!(
        "  {} {} {}",
        "Scenario".bold(),
        scenario_path.display(),
        format!("({samples} samples -> {})", out_path.display()).dimmed()
    );
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Body", "Min heave (m)", "Max heave (m)", "Final heave (m)"]);
    for (name, range) in names.iter().zip(&ranges) {
        table.add_row(vec![
            name.to_string(),
            format!("{:.4}", range.min),
            format!("{:.4}", range.max),
            format!("{:.4}", range.last),
        ]);
    }
    println!("{table}");

    Ok(())
}
