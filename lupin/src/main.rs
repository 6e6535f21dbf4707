mod common;
mod common_io;
mod run_sample;
mod run_schedule;
mod sim_potentials;

use run_sample::*;
use run_schedule::*;
use sim_potentials::*;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "lupin")]
#[command(
    version,
    about = "Latent-tree Update and Propagation INference",
    long_about = "Sample spanning trees of latent feature graphs and compile\n\
		  message-passing schedules for exact inference on them.\n\
		  Edge potentials are K = V(V-1)/2 log weights, one per line,\n\
		  indexed by k = v1 + v2 * (v2 - 1) / 2 for v1 < v2."
)]
struct Cli {
    #[arg(
        short = 'v',
        long,
        global = true,
        help = "Verbose",
        long_help = "Enable verbose output `RUST_LOG=info`"
    )]
    verbose: bool,

    #[command(subcommand)]
    commands: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate random edge potentials, optionally with a planted tree
    Simulate(SimPotentialsArgs),
    /// Gibbs sample spanning trees given edge potentials
    Sample(SampleArgs),
    /// Print the most central vertex of a tree
    Center(CenterArgs),
    /// Compile a message-passing schedule for a tree
    Schedule(ScheduleArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    match &cli.commands {
        Commands::Simulate(args) => {
            sim_potentials(args)?;
        }
        Commands::Sample(args) => {
            sample_trees(args)?;
        }
        Commands::Center(args) => {
            print_center(args)?;
        }
        Commands::Schedule(args) => {
            compile_schedule(args)?;
        }
    }

    Ok(())
}
