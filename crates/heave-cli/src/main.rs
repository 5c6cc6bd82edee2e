//! CLI frontend for heave decay tests and wave-body scenarios.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(
    name = "heave",
    about = "Heave decay and wave-body simulations of floating rigid bodies",
    version,
    propagate_version = true
)]
struct Cli {
    /// Logging verbosity: trace, debug, info, warn, error
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drop a sphere and record its heave motion
    Decay(commands::decay::DecayArgs),

    /// Run a multi-body scenario described in a JSON file
    Run {
        /// Scenario file
        scenario: PathBuf,

        /// Directory that relative hydro file paths are resolved against
        #[arg(long, env = "HEAVE_DATA_DIR")]
        data_dir: Option<PathBuf>,

        /// Override the scenario's output path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Summarize a hydrodynamic coefficient file
    Inspect {
        /// Coefficient file (JSON, bemio layout)
        file: PathBuf,
    },
}

fn init_logging(level: &str) -> Result<(), String> {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        other => return Err(format!("unknown log level '{other}'")),
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| format!("cannot install logger: {e}"))
}

fn main() {
    let cli = Cli::parse();

    let result = init_logging(&cli.log_level).and_then(|()| match cli.command {
        Commands::Decay(args) => commands::decay::run(&args),
        Commands::Run {
            scenario,
            data_dir,
            output,
        } => commands::run::run(&scenario, data_dir.as_deref(), output.as_deref()),
        Commands::Inspect { file } => commands::inspect::run(&file),
    });

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
