//! Time-series output of body motion.
//!
//! The tab-separated format starts with a `#`-prefixed header and no trailing
//! newline; every sample line is *preceded* by a newline. Values use the
//! shortest representation that round-trips (`0.0`, `-1.0`, `0.015`).

use std::io::Write;

use nalgebra::Vector3;

use crate::error::CoreResult;

/// Header of the single-body tab-separated trace.
pub const TSV_HEADER: &str = "#Time\tBody Pos\tBody vel (heave)\tforce (heave)";

/// State of one body at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Simulated time (s).
    pub time: f64,
    /// Centre-of-mass position (m).
    pub position: Vector3<f64>,
    /// Linear velocity (m/s).
    pub velocity: Vector3<f64>,
    /// Vertical component of the applied external force (N).
    pub heave_force: f64,
}

/// Layout of the trace file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraceFormat {
    /// Tab-separated values with a `#` header.
    #[default]
    Tsv,
    /// Fixed-width columns, two decimals for time and four for values.
    Table,
}

/// Which per-body values each row carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraceColumns {
    /// Time and heave position only.
    #[default]
    TimePosition,
    /// Time, heave position, heave velocity and heave force.
    Full,
}

/// Streams samples to a writer.
#[derive(Debug)]
pub struct TraceWriter<W: Write> {
    out: W,
    format: TraceFormat,
    columns: TraceColumns,
    bodies: Vec<String>,
    header_written: bool,
    rows: u64,
}

impl<W: Write> TraceWriter<W> {
    /// Create a writer for a single body using the classic header.
    pub fn new(out: W, format: TraceFormat, columns: TraceColumns) -> Self {
        Self {
            out,
            format,
            columns,
            bodies: Vec::new(),
            header_written: false,
            rows: 0,
        }
    }

    /// Label the per-body column groups. Rows must then carry one sample per name.
    pub fn with_bodies(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.bodies = names.into_iter().map(Into::into).collect();
        self
    }

    /// Number of sample rows written so far.
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Write the header. Does nothing if it was already written.
    pub fn write_header(&mut self) -> CoreResult<()> {
        if self.header_written {
            return Ok(());
        }
        let header = self.header();
        self.out.write_all(header.as_bytes())?;
        self.header_written = true;
        Ok(())
    }

    /// Write one row for a single body.
    pub fn write_sample(&mut self, sample: &Sample) -> CoreResult<()> {
        self.write_samples(std::slice::from_ref(sample))
    }

    /// Write one row holding a sample per body. The first sample supplies the time.
    pub fn write_samples(&mut self, samples: &[Sample]) -> CoreResult<()> {
        self.write_header()?;
        let Some(first) = samples.first() else {
            return Ok(());
        };
        let mut row = String::new();
        match self.format {
            TraceFormat::Tsv => {
                row.push('\n');
                row.push_str(&format_value(first.time));
                for s in samples {
                    row.push('\t');
                    row.push_str(&format_value(s.position.z));
                    if self.columns == TraceColumns::Full {
                        row.push('\t');
                        row.push_str(&format_value(s.velocity.z));
                        row.push('\t');
                        row.push_str(&format_value(s.heave_force));
                    }
                }
            }
            TraceFormat::Table => {
                row.push_str(&format!("{:<10.2}", first.time));
                for s in samples {
                    row.push_str(&format!("{:>16.4}", s.position.z));
                    if self.columns == TraceColumns::Full {
                        row.push_str(&format!("{:>16.4}", s.velocity.z));
                        row.push_str(&format!("{:>16.4}", s.heave_force));
                    }
                }
                row.push('\n');
            }
        }
        self.out.write_all(row.as_bytes())?;
        self.rows += 1;
        Ok(())
    }

    /// Flush and return the underlying writer.
    pub fn finish(mut self) -> CoreResult<W> {
        self.write_header()?;
        self.out.flush()?;
        Ok(self.out)
    }

    fn header(&self) -> String {
        match self.format {
            TraceFormat::Tsv if self.bodies.is_empty() => TSV_HEADER.to_string(),
            TraceFormat::Tsv => {
                let mut h = String::from("#Time");
                for name in &self.bodies {
                    h.push_str(&format!("\t{name} pos"));
                    if self.columns == TraceColumns::Full {
                        h.push_str(&format!("\t{name} vel (heave)\t{name} force (heave)"));
                    }
                }
                h
            }
            TraceFormat::Table => {
                let mut h = format!("{:<10}", "Time (s)");
                let single = [String::from("Body")];
                let names = if self.bodies.is_empty() {
                    &single[..]
                } else {
                    &self.bodies[..]
                };
                for name in names {
                    h.push_str(&format!("{:>16}", format!("{name} Heave (m)")));
                    if self.columns == TraceColumns::Full {
                        h.push_str(&format!("{:>16}", "Vel (m/s)"));
                        h.push_str(&format!("{:>16}", "Force (N)"));
                    }
                }
                h.push('\n');
                h
            }
        }
    }
}

/// Shortest round-trip rendering; integral values keep a trailing `.0`.
pub fn format_value(v: f64) -> String {
    format!("{v:?}")
}
