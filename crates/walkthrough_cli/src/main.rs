//! Walkthrough CLI
//!
//! Validate walkthrough configurations and run headless tours.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use walkthrough_core::WalkthroughConfig;

mod simulate;

use simulate::SimulateOptions;

#[derive(Parser)]
#[command(name = "walkthrough")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Camera walkthrough tools", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a walkthrough configuration for errors
    Check {
        /// Configuration file (TOML)
        config: PathBuf,
    },

    /// List the tour's waypoints
    Waypoints {
        /// Configuration file; the stock tour is used when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the default configuration as TOML
    Defaults,

    /// Fly in and run the auto tour headlessly inside a box room
    Simulate {
        /// Configuration file; the stock tour is used when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Simulated frames per second
        #[arg(long, default_value = "60")]
        fps: u32,

        /// Number of auto-tour legs to run before stopping
        #[arg(short, long, default_value = "3")]
        legs: usize,

        /// Print a JSON snapshot of the final state
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Check { config } => cmd_check(&config),

        Commands::Waypoints { config } => cmd_waypoints(config.as_deref()),

        Commands::Defaults => cmd_defaults(),

        Commands::Simulate {
            config,
            fps,
            legs,
            json,
        } => {
            let config = load_config(config.as_deref())?;
            simulate::run(config, SimulateOptions { fps, legs, json })
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<WalkthroughConfig> {
    match path {
        Some(path) => WalkthroughConfig::load(path)
            .with_context(|| format!("Failed to load {}", path.display())),
        None => Ok(WalkthroughConfig::default()),
    }
}

fn cmd_check(path: &Path) -> Result<()> {
    info!("Checking {}", path.display());

    let config = load_config(Some(path))?;

    if config.overlays.is_empty() {
        warn!("No overlays configured");
    }

    info!(
        "{} waypoints, {} overlays, {} ms legs, {} ms auto pause",
        config.waypoints.len(),
        config.overlays.len(),
        config.tour.transition_ms,
        config.tour.auto_pause_ms
    );
    info!("Check passed");

    Ok(())
}

fn cmd_waypoints(path: Option<&Path>) -> Result<()> {
    let config = load_config(path)?;

    println!("{:>3}  {:<28}  {:<28}", "#", "camera", "target");
    for (index, waypoint) in config.waypoints.iter().enumerate() {
        let camera = format!(
            "({:.3}, {:.3}, {:.3})",
            waypoint.camera.x, waypoint.camera.y, waypoint.camera.z
        );
        let target = format!(
            "({:.3}, {:.3}, {:.3})",
            waypoint.target.x, waypoint.target.y, waypoint.target.z
        );
        println!("{:>3}  {:<28}  {:<28}", index, camera, target);
    }

    Ok(())
}

fn cmd_defaults() -> Result<()> {
    let toml = WalkthroughConfig::default()
        .to_toml_string()
        .context("Failed to serialize the default configuration")?;
    print!("{}", toml);
    Ok(())
}
