//! Pathwise CLI - savings allocation and recommendation engines
//!
//! Usage:
//!   pathwise allocate --input request.json         Allocate a monthly budget
//!   pathwise rebalance -b plan.json -o edits.json -p 900
//!   pathwise leaps --state state.json              Ranked next steps
//!   pathwise ef-gate --state state.json            Emergency-fund gate

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use pathwise_core::StepDirection;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact().with_writer(std::io::stderr))
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Allocate { input } => {
            let config = commands::load_config(config_path)?;
            commands::cmd_allocate(&config, &input, cli.json)
        }
        Commands::Rebalance {
            baseline,
            overrides,
            pool,
            no_clamp,
        } => commands::cmd_rebalance(&baseline, &overrides, pool, !no_clamp, cli.json),
        Commands::Step {
            baseline,
            bucket,
            up,
            down: _,
            pool,
        } => {
            let config = commands::load_config(config_path)?;
            let direction = if up {
                StepDirection::Up
            } else {
                StepDirection::Down
            };
            commands::cmd_step(&config, &baseline, &bucket, direction, pool, cli.json)
        }
        Commands::Pretax {
            baseline,
            overrides,
            budget,
        } => commands::cmd_pretax(&baseline, &overrides, budget, cli.json),
        Commands::Leaps {
            state,
            signals,
            debug,
        } => {
            let config = commands::load_config(config_path)?;
            commands::cmd_leaps(&config, &state, signals.as_deref(), debug, cli.json)
        }
        Commands::EfGate { state, now } => {
            let config = commands::load_config(config_path)?;
            commands::cmd_ef_gate(&config, &state, now.as_deref(), cli.json)
        }
        Commands::Config { action } => match action {
            None | Some(ConfigAction::Show) => commands::cmd_config_show(config_path),
            Some(ConfigAction::Path) => commands::cmd_config_path(config_path),
        },
    }
}
