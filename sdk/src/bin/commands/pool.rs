// Pool creation and inspection commands

use amm_sdk::{protocol::TokenPair, InitPoolRequest};
use anyhow::Result;
use clap::Args;

use super::utils::{info, parse_pubkey, print_plan, print_pool, print_receipt};
use super::CliContext;

#[derive(Args)]
pub struct InitPoolCmd {
    /// First mint, in either order
    mint_a: String,

    /// Second mint
    mint_b: String,
}

#[derive(Args)]
pub struct PoolsCmd {
    /// Show only this pool
    #[arg(long)]
    pool: Option<String>,
}

#[derive(Args)]
pub struct DeriveCmd {
    mint_a: String,

    mint_b: String,

    /// Also print this owner's token accounts
    #[arg(long)]
    owner: Option<String>,
}

pub async fn init_pool(cmd: InitPoolCmd, ctx: &CliContext) -> Result<()> {
    let client = ctx.connected_client()?;
    let request = InitPoolRequest {
        mint_a: cmd.mint_a,
        mint_b: cmd.mint_b,
    };

    let plan = client.plan_init_pool(&request)?;
    print_plan(&plan);
    if ctx.dry_run {
        return Ok(());
    }

    let receipt = client.execute(plan).await?;
    print_receipt(&receipt);
    Ok(())
}

pub async fn pools(cmd: PoolsCmd, ctx: &CliContext) -> Result<()> {
    let client = ctx.client()?;

    if let Some(pool) = cmd.pool {
        let pool = client.get_pool(&parse_pubkey(&pool)?).await?;
        print_pool(&pool);
        return Ok(());
    }

    let pools = client.list_pools().await?;
    if pools.is_empty() {
        info("No pools found.");
    }
    for pool in &pools {
        print_pool(pool);
    }
    Ok(())
}

pub fn derive(cmd: DeriveCmd, ctx: &CliContext) -> Result<()> {
    let client = ctx.client()?;
    let pair = TokenPair::new(parse_pubkey(&cmd.mint_a)?, parse_pubkey(&cmd.mint_b)?)?;
    let addresses = client.pda.pool_addresses(&pair);

    println!("Mint A:     {}", pair.mint_a());
    println!("Mint B:     {}", pair.mint_b());
    println!("Pool:       {}", addresses.pool);
    println!("LP mint:    {}", addresses.lp_mint);
    println!("Authority:  {}", addresses.pool_auth);
    println!("Vault A:    {}", addresses.vault_a);
    println!("Vault B:    {}", addresses.vault_b);

    if let Some(owner) = cmd.owner {
        let owner = parse_pubkey(&owner)?;
        println!("Owner A:    {}", client.pda.owned_token_account(&owner, &pair.mint_a()));
        println!("Owner B:    {}", client.pda.owned_token_account(&owner, &pair.mint_b()));
        println!("Owner LP:   {}", client.pda.owned_token_account(&owner, &addresses.lp_mint));
    }
    Ok(())
}
