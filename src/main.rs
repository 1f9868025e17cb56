//! parconv CLI
//!
//! Times the sequential and parallel executors on one input and checks that
//! they agree.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use parconv::config::{RunConfig, VectorRunConfig, DEFAULT_INPUT};
use parconv::pipeline::{run_convolution, run_vector_addition};
use parconv::report::{render, OutputFormat, RunReport};
use parconv::timing::TimeUnit;
use parconv::Strategy;
use tracing::debug;

#[derive(Parser)]
#[command(name = "parconv")]
#[command(author, version, about = "Statically partitioned parallel convolution and vector addition")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convolve a matrix read from or generated per the input file
    Convolve {
        /// Worker threads; 0 runs the sequential pass only
        workers: usize,

        /// Input file with dimensions and optional values
        #[arg(short, long, default_value = DEFAULT_INPUT)]
        input: PathBuf,

        /// How the result is divided among workers
        #[arg(short, long, value_enum, default_value_t = Strategy::Columns)]
        strategy: Strategy,

        /// Seed for generated data
        #[arg(long)]
        seed: Option<u64>,

        /// Unit for timing lines
        #[arg(long, value_enum, default_value_t = TimeUnit::Millis)]
        unit: TimeUnit,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add two generated vectors
    Vecadd {
        /// Vector length
        #[arg(short, long, default_value = "10")]
        len: usize,

        /// Workers for the contiguous strategy
        #[arg(short, long, default_value = "4")]
        workers: usize,

        /// Seed for generated data
        #[arg(long)]
        seed: Option<u64>,

        /// Unit for timing lines
        #[arg(long, value_enum, default_value_t = TimeUnit::Nanos)]
        unit: TimeUnit,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr so stdout carries only the report
fn init_logging(verbose: u8) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

fn format_for(json: bool) -> OutputFormat {
    if json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    }
}

/// Run the selected command; `Ok(false)` means verification failed
fn run(cli: Cli) -> parconv::Result<bool> {
    let (report, unit, format) = match cli.command {
        Commands::Convolve {
            workers,
            input,
            strategy,
            seed,
            unit,
            json,
        } => {
            let config = RunConfig::load(input, workers, strategy, seed, unit)?;
            debug!(dims = ?config.dims, workers, %strategy, "starting convolution");
            (run_convolution(&config)?, config.unit, format_for(json))
        }
        Commands::Vecadd {
            len,
            workers,
            seed,
            unit,
            json,
        } => {
            let config = VectorRunConfig {
                len,
                workers,
                seed,
                unit,
            };
            (run_vector_addition(&config)?, config.unit, format_for(json))
        }
    };

    print_report(&report, format, unit)?;
    Ok(report.verification.is_ok())
}

fn print_report(report: &RunReport, format: OutputFormat, unit: TimeUnit) -> parconv::Result<()> {
    let rendered = render(report, format, unit)?;
    print!("{rendered}");
    if format == OutputFormat::Json {
        println!();
    }
    Ok(())
}
