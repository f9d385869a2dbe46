//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Pathwise - Decide where the next dollar goes
#[derive(Parser)]
#[command(name = "pathwise")]
#[command(about = "Savings allocation and next-step recommendations", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Planner config file (defaults to the user override, then built-in values)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Allocate a monthly budget across savings buckets
    Allocate {
        /// Allocation request JSON
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Apply post-tax overrides to a plan and rebalance
    Rebalance {
        /// Baseline snapshot JSON
        #[arg(short, long)]
        baseline: PathBuf,

        /// Overrides JSON
        #[arg(short, long)]
        overrides: PathBuf,

        /// Post-tax pool to fit within
        #[arg(short, long)]
        pool: f64,

        /// Apply edits without trimming to the pool
        #[arg(long)]
        no_clamp: bool,
    },

    /// Nudge one post-tax bucket by the configured increment
    Step {
        /// Baseline snapshot JSON
        #[arg(short, long)]
        baseline: PathBuf,

        /// Bucket: ef, debt, retirement, brokerage
        #[arg(long)]
        bucket: String,

        /// Increase the bucket
        #[arg(long, conflicts_with = "down", required_unless_present = "down")]
        up: bool,

        /// Decrease the bucket
        #[arg(long)]
        down: bool,

        /// Post-tax pool to fit within
        #[arg(short, long)]
        pool: f64,
    },

    /// Apply pre-tax (401k/HSA) overrides, then post-tax overrides
    Pretax {
        /// Baseline snapshot JSON
        #[arg(short, long)]
        baseline: PathBuf,

        /// Overrides JSON
        #[arg(short, long)]
        overrides: PathBuf,

        /// Total monthly savings budget
        #[arg(long)]
        budget: f64,
    },

    /// Generate the ranked recommendation feed
    Leaps {
        /// Financial state JSON
        #[arg(short, long)]
        state: PathBuf,

        /// Trigger signals JSON (defaults to now with no flags)
        #[arg(long)]
        signals: Option<PathBuf>,

        /// Include suppressed Leaps and gate telemetry
        #[arg(long)]
        debug: bool,
    },

    /// Evaluate the emergency-fund on-track gate
    EfGate {
        /// Financial state JSON
        #[arg(short, long)]
        state: PathBuf,

        /// Evaluation time (RFC 3339 or YYYY-MM-DD, defaults to now)
        #[arg(long)]
        now: Option<String>,
    },

    /// Show planner configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Print which config file is in use
    Path,
}
