use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use vanet_sim::error::SimError;
use vanet_sim::sim::{Budgets, RoundController, Topology};

/// Simulates one round of federated voting between vehicles reporting road
/// conditions, with a controllable share of adversarial reporters and a
/// randomly delayed in-process network.
#[derive(Parser)]
#[command(name = "vanet-sim")]
struct Args {
    /// RNG seed for nomination and delay draws.
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Upper bound for the random per-hop delay in milliseconds. 0 delivers
    /// synchronously.
    #[arg(long, default_value_t = 100)]
    delay: u64,

    /// Number of nodes nominating the benign road condition.
    #[arg(long = "good-nodes", default_value_t = 0)]
    good_nodes: usize,

    /// Number of nodes nominating a random adversarial road condition.
    #[arg(long = "bad-nodes", default_value_t = 0)]
    bad_nodes: usize,

    /// Topology file declaring each node's quorum slices.
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    if let Err(err) = run(args).await {
        error!("{err}");
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), SimError> {
    let budgets = Budgets {
        honest: args.good_nodes,
        adversarial: args.bad_nodes,
    };
    if budgets.total() == 0 {
        return Err(SimError::EmptyPopulation);
    }

    let topology = Topology::load(&args.config)?;
    info!(
        nodes = topology.nodes.len(),
        honest = budgets.honest,
        adversarial = budgets.adversarial,
        seed = args.seed,
        delay_ms = args.delay,
        "starting simulation"
    );

    let mut controller = RoundController::build(topology, budgets, args.seed, args.delay)?;
    let outcome = controller.run_slot(1).await?;
    info!(
        slot = outcome.slot,
        value = %outcome.value,
        elapsed = ?outcome.elapsed,
        "round complete"
    );
    Ok(())
}
