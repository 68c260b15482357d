//! Causegraph CLI
//!
//! Produce and inspect encoded exception graph snapshots.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod commands;
mod scenario;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use scenario::Scenario;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "causegraph")]
#[command(about = "Snapshot, encode and inspect exception cause graphs", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a sample exception graph
    Demo {
        /// Graph shape
        #[arg(short, long, value_enum, default_value_t = Scenario::Chain)]
        scenario: Scenario,
        /// Output file; hex is printed when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Decode and print an encoded graph
    Inspect {
        /// Encoded graph file
        #[arg(short, long)]
        input: PathBuf,
        /// Print the node arena as JSON
        #[arg(long)]
        json: bool,
        /// JSON file with decode limits
        #[arg(long)]
        limits: Option<PathBuf>,
        /// Maximum string length in bytes
        #[arg(long)]
        max_string_len: Option<u32>,
        /// Maximum number of nodes
        #[arg(long)]
        max_nodes: Option<u32>,
        /// Maximum nesting depth of inline nodes
        #[arg(long)]
        max_depth: Option<u32>,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let default_filter = match cli.verbose {
        0 => "causegraph=info",
        1 => "causegraph=debug",
        _ => "causegraph=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let output = match cli.command {
        Commands::Demo { scenario, output } => commands::demo(scenario, output.as_deref())?,
        Commands::Inspect {
            input,
            json,
            limits,
            max_string_len,
            max_nodes,
            max_depth,
        } => {
            let limits = commands::load_limits(limits.as_deref(), max_string_len, max_nodes, max_depth)?;
            commands::inspect(&input, limits, json)?
        }
    };
    print!("{output}");
    Ok(())
}
