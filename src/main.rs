//! Command-line front end for the optical bench engine.
//!
//! ```sh
//! optibench trace setup.json
//! optibench simulate setup.json --config engine.toml --profile
//! optibench generate response.txt > setup.json
//! ```

use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;
use optibench::generator::{generate_setup, RecordedResponse};
use optibench::profiler::Profiler;
use optibench::{simulate_with, trace_with, ComponentType, EngineConfig, Setup};

#[derive(Parser)]
#[command(name = "optibench")]
#[command(about = "Ray propagation and interference analysis for 2D optical benches")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Engine configuration (TOML). Stock limits are used when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Print stage timings to stderr.
    #[arg(long, global = true)]
    profile: bool,
    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Trace every laser and print the setup with its rays filled in.
    Trace {
        setup: PathBuf,
    },
    /// Analyze losses and interference for a setup.
    Simulate {
        setup: PathBuf,
        /// Analyze the rays stored in the file instead of tracing again.
        #[arg(long)]
        use_existing_rays: bool,
    },
    /// Check a setup file without tracing it.
    Validate {
        setup: PathBuf,
    },
    /// Convert a saved setup-generator response into a setup file.
    Generate {
        response: PathBuf,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// List the available component types and their defaults.
    Components,
}

fn load_setup(path: &Path) -> Result<Setup> {
    let setup = Setup::load(path).with_context(|| format!("loading {}", path.display()))?;
    setup
        .validate()
        .with_context(|| format!("validating {}", path.display()))?;
    Ok(setup)
}

fn emit<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", json);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let engine = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading engine config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let mut profiler = Profiler::new();

    match cli.command {
        Commands::Trace { setup } => {
            let mut setup = profiler.time("load", || load_setup(&setup))?;
            let rays = profiler.time("trace", || trace_with(&setup, &engine.trace));
            setup.rays = rays;
            info!("traced {} rays", setup.rays.len());
            emit(&setup, cli.pretty)?;
        }
        Commands::Simulate { setup, use_existing_rays } => {
            let mut setup = profiler.time("load", || load_setup(&setup))?;
            if !use_existing_rays {
                let rays = profiler.time("trace", || trace_with(&setup, &engine.trace));
                setup.rays = rays;
            }
            let result = profiler
                .time("simulate", || simulate_with(&setup, &engine.analysis))
                .context("simulation failed")?;
            emit(&result, cli.pretty)?;
        }
        Commands::Validate { setup } => {
            let setup = load_setup(&setup)?;
            println!(
                "ok: {} components ({} lasers, {} detectors), grid {}x{}",
                setup.components.len(),
                setup.lasers().count(),
                setup.detectors().count(),
                setup.grid_size.width,
                setup.grid_size.height
            );
        }
        Commands::Generate { response, description } => {
            let text = std::fs::read_to_string(&response)
                .with_context(|| format!("reading {}", response.display()))?;
            let setup = profiler
                .time("generate", || {
                    generate_setup(&RecordedResponse(text), &description, Default::default())
                })
                .context("generated setup rejected")?;
            emit(&setup, cli.pretty)?;
        }
        Commands::Components => {
            for t in ComponentType::ALL {
                let defaults = serde_json::to_string(&t.default_properties())?;
                println!("{:<14} {:<14} {}  defaults {}", t.as_str(), t.label(), t.description(), defaults);
            }
        }
    }

    if cli.profile {
        profiler.report().print();
    }
    Ok(())
}
