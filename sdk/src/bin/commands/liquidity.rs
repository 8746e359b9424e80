// Liquidity commands

use amm_sdk::{AddLiquidityRequest, RemoveLiquidityRequest};
use anyhow::Result;
use clap::Args;

use super::utils::{parse_pubkey, print_plan, print_receipt};
use super::CliContext;

#[derive(Args)]
pub struct AddLiquidityCmd {
    /// Pool address
    #[arg(long)]
    pool: String,

    /// Amount of mint A, e.g. 1.5
    #[arg(long)]
    amount_a: String,

    /// Amount of mint B
    #[arg(long)]
    amount_b: String,
}

#[derive(Args)]
pub struct RemoveLiquidityCmd {
    /// Pool address
    #[arg(long)]
    pool: String,
}

pub async fn add_liquidity(cmd: AddLiquidityCmd, ctx: &CliContext) -> Result<()> {
    let client = ctx.connected_client()?;
    let request = AddLiquidityRequest {
        pool: Some(parse_pubkey(&cmd.pool)?),
        amount_a: cmd.amount_a,
        amount_b: cmd.amount_b,
    };

    let plan = client.plan_add_liquidity(&request).await?;
    print_plan(&plan);
    if ctx.dry_run {
        return Ok(());
    }

    print_receipt(&client.execute(plan).await?);
    Ok(())
}

pub async fn remove_liquidity(cmd: RemoveLiquidityCmd, ctx: &CliContext) -> Result<()> {
    let client = ctx.connected_client()?;
    let request = RemoveLiquidityRequest {
        pool: Some(parse_pubkey(&cmd.pool)?),
    };

    let plan = client.plan_remove_liquidity(&request).await?;
    print_plan(&plan);
    if ctx.dry_run {
        return Ok(());
    }

    print_receipt(&client.execute(plan).await?);
    Ok(())
}
