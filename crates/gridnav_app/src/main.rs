//! gridnav: interactive 20x20 scenario editor and path player.
//!
//! Obstacles and the robot pose are edited in a text shell, handed to an
//! external planning service over HTTP, and the returned path is stepped
//! through pose by pose.

mod config;
mod error;
mod runtime;
mod ui;
mod ui_shell;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use config::GridnavConfig;
use error::{AppError, Result};
use gridnav_core::engine::Engine;
use gridnav_rt::health::{HealthProbe, HealthStatus};
use gridnav_rt::solver::{HttpSolver, OfflineSolver, Solver};
use runtime::RuntimeCoordinator;
use tracing::info;
use tracing_subscriber::EnvFilter;
use ui::UiController;

#[derive(Debug, Parser)]
#[command(
    name = "gridnav",
    about = "Grid scenario editor and path player for an external planning service",
    version
)]
struct Cli {
    /// TOML configuration file (default: ./gridnav.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Planning service base URL, overriding the configuration file
    #[arg(long = "api-url")]
    api_url: Option<String>,

    /// Run without a planning service; every compute fails
    #[arg(long)]
    offline: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Interactive shell (default).
    Shell,

    /// Probe the planning service once and exit.
    Check,
}

fn main() {
    if let Err(error) = run(Cli::parse()) {
        eprintln!("{error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let working_dir = std::env::current_dir()?;
    let source = config::locate(cli.config.as_deref(), &working_dir);
    let mut config = match &source {
        Some(path) => GridnavConfig::load(path)?,
        None => GridnavConfig::default(),
    };
    if let Some(url) = cli.api_url {
        config.solver.base_url = url;
    }

    init_tracing(&config.logging.filter)?;
    match &source {
        Some(path) => info!("Loaded configuration from {}", path.display()),
        None => info!("Using default configuration"),
    }

    let (solver, probe) = build_backends(&config, cli.offline)?;
    info!(
        backend = solver.backend_name(),
        base_url = %config.solver.base_url,
        "planning service configured"
    );
    let mut runtime = RuntimeCoordinator::new(solver, probe, config.health.clear_after());

    match cli.command.unwrap_or(Commands::Shell) {
        Commands::Shell => {
            let mut engine = Engine::new();
            let mut ui = UiController::default();
            ui_shell::run_interactive_shell(&mut ui, &mut engine, &mut runtime)?;
            Ok(())
        }
        Commands::Check => {
            runtime.check_health();
            match runtime.wait_for_health() {
                HealthStatus::Success => {
                    println!("api: ok ({})", config.solver.base_url);
                    Ok(())
                }
                _ => Err(AppError::Unhealthy(config.solver.base_url)),
            }
        }
    }
}

fn init_tracing(default_filter: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter)
            .map_err(|e| AppError::Config(format!("invalid log filter: {e}")))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn build_backends(
    config: &GridnavConfig,
    offline: bool,
) -> Result<(Arc<dyn Solver>, Arc<dyn HealthProbe>)> {
    if offline {
        let solver: Arc<dyn Solver> = Arc::new(OfflineSolver);
        let probe: Arc<dyn HealthProbe> = Arc::new(OfflineSolver);
        return Ok((solver, probe));
    }

    let http = Arc::new(HttpSolver::new(&config.solver.to_solver_config())?);
    let solver: Arc<dyn Solver> = http.clone();
    let probe: Arc<dyn HealthProbe> = http;
    Ok((solver, probe))
}

#[cfg(test)]
mod tests {
    use super::{build_backends, Cli, Commands};
    use crate::config::GridnavConfig;
    use clap::Parser;

    #[test]
    fn cli_defaults_to_shell_without_overrides() {
        let cli = Cli::parse_from(["gridnav"]);
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
        assert!(!cli.offline);
    }

    #[test]
    fn cli_accepts_overrides_and_check() {
        let cli = Cli::parse_from([
            "gridnav",
            "--api-url",
            "http://10.1.1.1:5000",
            "--offline",
            "check",
        ]);
        assert_eq!(cli.api_url.as_deref(), Some("http://10.1.1.1:5000"));
        assert!(cli.offline);
        assert!(matches!(cli.command, Some(Commands::Check)));
    }

    #[test]
    fn offline_backends_always_fail() {
        let (solver, probe) = build_backends(&GridnavConfig::default(), true).unwrap();
        assert_eq!(solver.backend_name(), "offline");
        assert!(probe.probe().is_err());
    }

    #[test]
    fn http_backends_share_one_client() {
        let (solver, probe) = build_backends(&GridnavConfig::default(), false).unwrap();
        assert_eq!(solver.backend_name(), "http");
        assert_eq!(probe.backend_name(), "http");
    }
}
