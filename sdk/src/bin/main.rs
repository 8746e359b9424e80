// CLI tool for the AMM
//
// Creates pools, moves liquidity and swaps from the command line. Every
// mutating command prints its instruction plan and, unless --yes is given,
// asks for confirmation before signing.

mod commands;
mod prompt;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::CliContext;

#[derive(Parser)]
#[command(name = "amm")]
#[command(about = "Constant-product AMM CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Cluster preset (localnet, devnet, mainnet) used when no config file is given
    #[arg(long, global = true, default_value = "localnet")]
    cluster: String,

    /// RPC URL, overrides the config file
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// Path to wallet keypair file
    #[arg(long, global = true)]
    keypair: Option<String>,

    /// Program ID, overrides the config file
    #[arg(long, global = true)]
    program_id: Option<String>,

    /// Sign without asking for confirmation
    #[arg(long, short = 'y', global = true)]
    yes: bool,

    /// Print the instruction plan and exit without submitting
    #[arg(long, global = true)]
    dry_run: bool,

    /// Debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the pool for a pair of mints
    InitPool(commands::pool::InitPoolCmd),

    /// Deposit both assets into a pool
    AddLiquidity(commands::liquidity::AddLiquidityCmd),

    /// Swap through a pool
    Swap(commands::swap::SwapCmd),

    /// Withdraw the wallet's entire LP position
    RemoveLiquidity(commands::liquidity::RemoveLiquidityCmd),

    /// List pools, or show one
    Pools(commands::pool::PoolsCmd),

    /// Print every derived address for a pair of mints
    Derive(commands::pool::DeriveCmd),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("[ERROR] {}", commands::utils::error_report(&err));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let ctx = CliContext::from_args(
        cli.config.as_deref(),
        &cli.cluster,
        cli.rpc_url,
        cli.keypair,
        cli.program_id.as_deref(),
        cli.yes,
        cli.dry_run,
    )?;

    match cli.command {
        Commands::InitPool(cmd) => commands::pool::init_pool(cmd, &ctx).await,
        Commands::AddLiquidity(cmd) => commands::liquidity::add_liquidity(cmd, &ctx).await,
        Commands::Swap(cmd) => commands::swap::execute(cmd, &ctx).await,
        Commands::RemoveLiquidity(cmd) => commands::liquidity::remove_liquidity(cmd, &ctx).await,
        Commands::Pools(cmd) => commands::pool::pools(cmd, &ctx).await,
        Commands::Derive(cmd) => commands::pool::derive(cmd, &ctx),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("amm_sdk={},amm={}", level, level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
