pub mod decay;
pub mod inspect;
pub mod run;
pub mod scenario;

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::ValueEnum;
use heave_core::{TraceColumns, TraceFormat};
use heave_hydro::ConvolutionMethod;
use serde::Deserialize;

/// Trace file layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Tab-separated values with a `#` header
    #[default]
    Tsv,
    /// Fixed-width columns
    Table,
}

impl From<OutputFormat> for TraceFormat {
    fn from(f: OutputFormat) -> Self {
        match f {
            OutputFormat::Tsv => TraceFormat::Tsv,
            OutputFormat::Table => TraceFormat::Table,
        }
    }
}

/// Values written per body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputColumns {
    /// Time and heave position
    #[default]
    TimePosition,
    /// Time, heave position, heave velocity and heave force
    Full,
}

impl From<OutputColumns> for TraceColumns {
    fn from(c: OutputColumns) -> Self {
        match c {
            OutputColumns::TimePosition => TraceColumns::TimePosition,
            OutputColumns::Full => TraceColumns::Full,
        }
    }
}

/// Radiation convolution quadrature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Convolution {
    /// Trapezoidal rule over the impulse response time vector
    #[default]
    Trapezoidal,
    /// Sum of samples times the impulse response step
    FixedStep,
}

impl From<Convolution> for ConvolutionMethod {
    fn from(c: Convolution) -> Self {
        match c {
            Convolution::Trapezoidal => ConvolutionMethod::Trapezoidal,
            Convolution::FixedStep => ConvolutionMethod::FixedStep,
        }
    }
}

/// Open `path` for writing, creating missing parent directories.
fn create_output(path: &Path) -> Result<BufWriter<File>, String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| format!("cannot create directory {}: {e}", parent.display()))?;
    }
    let file =
        File::create(path).map_err(|e| format!("cannot create {}: {e}", path.display()))?;
    Ok(BufWriter::new(file))
}

/// Write the elapsed wall-clock time in whole milliseconds to
/// `duration_ms.txt` beside `output`.
fn write_profile(output: &Path, elapsed: Duration) -> Result<PathBuf, String> {
    let path = output
        .parent()
        .map_or_else(|| PathBuf::from("duration_ms.txt"), |p| p.join("duration_ms.txt"));
    fs::write(&path, format!("{}\n", elapsed.as_millis()))
        .map_err(|e| format!("cannot write {}: {e}", path.display()))?;
    Ok(path)
}
