// Swap command

use amm_sdk::{SwapDirection, SwapRequest};
use anyhow::{bail, Result};
use clap::Args;

use super::utils::{parse_pubkey, print_plan, print_receipt};
use super::CliContext;

#[derive(Args)]
pub struct SwapCmd {
    /// Pool address
    #[arg(long)]
    pool: String,

    /// Mint being sold; must be one side of the pool
    #[arg(long)]
    input_mint: String,

    /// Amount to sell, e.g. 2.5
    #[arg(long)]
    amount: String,

    /// Minimum amount to receive; defaults to one base unit
    #[arg(long)]
    minimum_out: Option<String>,
}

pub async fn execute(cmd: SwapCmd, ctx: &CliContext) -> Result<()> {
    let client = ctx.connected_client()?;
    let pool_key = parse_pubkey(&cmd.pool)?;
    let input_mint = parse_pubkey(&cmd.input_mint)?;

    let pool = client.get_pool(&pool_key).await?;
    let direction = if input_mint == pool.state.mint_a {
        SwapDirection::AToB
    } else if input_mint == pool.state.mint_b {
        SwapDirection::BToA
    } else {
        bail!("{} is not a mint of pool {}", input_mint, pool_key);
    };

    let request = SwapRequest {
        pool: Some(pool_key),
        direction,
        amount_in: cmd.amount,
        minimum_out: cmd.minimum_out,
    };

    let plan = client.plan_swap(&request).await?;
    print_plan(&plan);
    if ctx.dry_run {
        return Ok(());
    }

    print_receipt(&client.execute(plan).await?);
    Ok(())
}
