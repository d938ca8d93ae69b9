use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use rssi_localization::api::{create_router, AppState};
use rssi_localization::{
    AccuracyEvaluator, AppConfig, Position, RunStore, SimulationParams, Simulator,
};

/// RSSI localization simulator
#[derive(Parser, Debug)]
#[command(name = "rssi-localization")]
#[command(version, about = "Simulate and solve RSSI-based indoor localization")]
struct Cli {
    /// JSON configuration file; built-in defaults are used when omitted
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service until Ctrl-C
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run one simulation and print the result as JSON
    Simulate {
        #[arg(long, allow_negative_numbers = true)]
        x: f64,
        #[arg(long, allow_negative_numbers = true)]
        y: f64,
        #[command(flatten)]
        signal: SignalArgs,
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Monte Carlo accuracy evaluation for one target
    Evaluate {
        #[arg(long, allow_negative_numbers = true)]
        x: f64,
        #[arg(long, allow_negative_numbers = true)]
        y: f64,
        #[command(flatten)]
        signal: SignalArgs,
        #[arg(long)]
        trials: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Validate the configuration and report problems
    CheckConfig,
}

/// Overrides for the configured signal parameters
#[derive(clap::Args, Debug)]
struct SignalArgs {
    /// Shadowing noise standard deviation (dB)
    #[arg(long)]
    noise: Option<f64>,
    /// Path-loss exponent
    #[arg(long = "path-loss")]
    path_loss: Option<f64>,
    /// Reference power at 1 m (dBm)
    #[arg(long, allow_negative_numbers = true)]
    ptx: Option<f64>,
}

impl SignalArgs {
    fn apply(&self, base: SimulationParams) -> SimulationParams {
        SimulationParams {
            p_tx: self.ptx.unwrap_or(base.p_tx),
            path_loss_n: self.path_loss.unwrap_or(base.path_loss_n),
            noise_std_dev: self.noise.unwrap_or(base.noise_std_dev),
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };
    Ok(config.with_env_overrides()?)
}

fn init_tracing(debug_logging: bool) {
    let default_level = if debug_logging { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn simulator_for(config: &AppConfig) -> Simulator {
    Simulator::new(config.anchors.clone(), config.field_size_m)
}

async fn serve(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let report = config.validate();
    for warning in &report.warnings {
        warn!("{}", warning);
    }
    if !report.is_valid() {
        for e in &report.errors {
            error!("{}", e);
        }
        return Err("configuration is invalid; run check-config for details".into());
    }

    let runs = match &config.runs_file {
        Some(path) => RunStore::open(path)?,
        None => RunStore::in_memory(),
    };
    info!(saved_runs = runs.len(), anchors = config.anchors.len(), "run store ready");

    let state = AppState::new(simulator_for(&config), config.default_params, runs);
    let app = create_router(state);

    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    info!("HTTP server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for Ctrl-C: {}", e);
    }
    info!("Shutdown signal received");
}

fn check_config(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let report = config.validate();

    for warning in &report.warnings {
        println!("warning: {}", warning);
    }
    for e in &report.errors {
        println!("error: {}", e);
    }

    if report.is_valid() {
        println!(
            "Configuration OK ({} anchors, {} m field)",
            config.anchors.len(),
            config.field_size_m
        );
        Ok(())
    } else {
        Err(format!("configuration has {} error(s)", report.errors.len()).into())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;
    init_tracing(config.debug_logging);

    match cli.command {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config).await
        }
        Command::Simulate { x, y, signal, seed } => {
            let params = signal.apply(config.default_params);
            let mut rng = rng_from(seed);
            let result = simulator_for(&config).run(Position::new(x, y), &params, &mut rng)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Command::Evaluate {
            x,
            y,
            signal,
            trials,
            seed,
        } => {
            let params = signal.apply(config.default_params);
            params.validate()?;
            let trials = trials.unwrap_or(config.evaluation.trials);
            let mut rng = rng_from(seed.or(config.evaluation.seed));

            let report = AccuracyEvaluator::new().evaluate(
                &simulator_for(&config),
                Position::new(x, y),
                &params,
                trials,
                &mut rng,
            );
            info!(
                trials,
                failures = report.failures,
                mean_error_m = report.statistics.mean_error,
                "evaluation complete"
            );
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Command::CheckConfig => check_config(&config),
    }
}
