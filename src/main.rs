use anyhow::Result;
use clap::{Parser, Subcommand};
use fivezone::input::EnvelopeInput;
use fivezone::idf::assembler;
use fivezone::run::{batch, runner::SimulationRunner};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fivezone", version, about = "5-zone simulation models from energy-certificate data")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a model file from certificate input data
    Build {
        /// Certificate input JSON
        #[arg(short, long)]
        config: PathBuf,
        /// Model file to write
        #[arg(short, long, default_value = "model.idf")]
        output: PathBuf,
    },
    /// Run one model through the simulation engine
    Run {
        /// Model file
        model: PathBuf,
        /// Weather file (EPW)
        weather: PathBuf,
        /// Engine output directory
        #[arg(short, long, default_value = "sim_out")]
        out_dir: PathBuf,
        /// Simulation engine executable
        #[arg(short, long, default_value = "energyplus")]
        engine: PathBuf,
        /// Per-run timeout in seconds
        #[arg(short, long, default_value_t = 600)]
        timeout: u64,
    },
    /// Run a manifest of jobs in parallel
    Batch {
        /// JSON manifest: array of {name, model, weather}
        jobs: PathBuf,
        /// Base directory for per-job output
        #[arg(short, long, default_value = "batch_out")]
        out_dir: PathBuf,
        /// Simulation engine executable
        #[arg(short, long, default_value = "energyplus")]
        engine: PathBuf,
        /// Worker pool size
        #[arg(short, long, default_value_t = 4)]
        workers: usize,
        /// Per-run timeout in seconds
        #[arg(short, long, default_value_t = 600)]
        timeout: u64,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .init();

    match run(Cli::parse()) {
        Ok(ok) if ok => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<bool> {
    match cli.command {
        Command::Build { config, output } => {
            let input = EnvelopeInput::from_json_file(&config)?;
            let model = assembler::write_model(&input, &output)?;
            info!(
                strategy = ?model.solution.strategy,
                confidence = model.solution.confidence,
                zones = model.zone_names.len(),
                "model written to {}",
                output.display()
            );
            for warning in &model.solution.warnings {
                info!("plausibility: {warning}");
            }
            Ok(true)
        }
        Command::Run {
            model,
            weather,
            out_dir,
            engine,
            timeout,
        } => {
            let runner =
                SimulationRunner::new(engine).with_timeout(Duration::from_secs(timeout));
            let outcome = runner.run(&model, &weather, &out_dir)?;
            if outcome.success {
                info!(duration = ?outcome.duration, "simulation succeeded: {}", outcome.message);
            } else {
                error!("simulation failed: {}", outcome.message);
            }
            Ok(outcome.success)
        }
        Command::Batch {
            jobs,
            out_dir,
            engine,
            workers,
            timeout,
        } => {
            let runner =
                SimulationRunner::new(engine).with_timeout(Duration::from_secs(timeout));
            let jobs = batch::load_jobs(&jobs)?;
            let report = batch::run_batch(&runner, &jobs, &out_dir, workers)?;
            for (name, outcome) in &report.outcomes {
                if outcome.success {
                    info!(job = name.as_str(), duration = ?outcome.duration, "ok");
                } else {
                    error!(job = name.as_str(), "failed: {}", outcome.message);
                }
            }
            Ok(report.all_succeeded())
        }
    }
}
