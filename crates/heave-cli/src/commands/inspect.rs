use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use heave_hydro::HydroData;
use nalgebra::Vector3;

pub fn run(file: &Path) -> Result<(), String> {
    let data = HydroData::from_path(file).map_err(|e| e.to_string())?;

    println!("  {} {}", "Hydro data".bold(), file.display());
    println!(
        "  rho = {} kg/m³, g = {} m/s², {} frequencies ({:.3} to {:.3} rad/s)",
        data.rho(),
        data.g(),
        data.frequencies().len(),
        data.frequencies().first().copied().unwrap_or_default(),
        data.frequencies().last().copied().unwrap_or_default(),
    );
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Body",
        "No.",
        "Disp. vol (m³)",
        "cg",
        "cb",
        "RIRF steps",
        "RIRF dt (s)",
        "K33 (N/m)",
        "A33 (kg)",
        "Excitation",
    ]);

    for body in data.bodies() {
        let [_, _, steps] = body.rirf_dims();
        let column = 6 * (body.body_number() - 1) + 2;
        let excitation = if body.has_excitation() {
            "yes".green().to_string()
        } else {
            "--".dimmed().to_string()
        };
        table.add_row(vec![
            body.name().to_string(),
            body.body_number().to_string(),
            format!("{:.3}", body.disp_vol()),
            format_point(&body.cg()),
            format_point(&body.cb()),
            steps.to_string(),
            format!("{}", body.rirf_timestep()),
            format!("{:.4e}", body.hydrostatic_stiffness()[(2, 2)]),
            format!("{:.4e}", body.infinite_added_mass()[(2, column)]),
            excitation,
        ]);
    }

    println!("{table}");
    println!();
    println!("  {} bodies, {} dofs", data.bodies().len(), data.total_dofs());

    Ok(())
}

fn format_point(p: &Vector3<f64>) -> String {
    format!("({}, {}, {})", p.x, p.y, p.z)
}
