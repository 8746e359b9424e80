use std::sync::Arc;

use solana_sdk::pubkey::Pubkey;
use spl_associated_token_account::get_associated_token_address;
use tracing::{debug, warn};

use crate::{
    client::{AccountProber, BaseClient, InstructionSet, OperationPlan, WrapPlanner},
    core::{
        AddLiquidityRequest, Operation, PoolInfo, RemoveLiquidityRequest, SdkError, SdkResult,
        AMOUNT_DECIMALS,
    },
    instructions::{AddLiquidityParams, AmmInstructions, RemoveLiquidityParams, UserPoolAccounts},
    protocol::{format_amount, parse_amount, PdaBuilder, PoolAddresses},
};

/// Service for deposits and withdrawals
pub struct LiquidityService {
    base: Arc<BaseClient>,
    pda: Arc<PdaBuilder>,
    prober: Arc<AccountProber>,
    wrap: Arc<WrapPlanner>,
    amm: AmmInstructions,
}

impl LiquidityService {
    pub fn new(
        base: Arc<BaseClient>,
        pda: Arc<PdaBuilder>,
        prober: Arc<AccountProber>,
        wrap: Arc<WrapPlanner>,
    ) -> Self {
        Self {
            amm: AmmInstructions::new(pda.program_id),
            base,
            pda,
            prober,
            wrap,
        }
    }

    /// Sequence a deposit of both sides into an existing pool
    pub async fn plan_add_liquidity(
        &self,
        owner: Option<Pubkey>,
        request: &AddLiquidityRequest,
    ) -> SdkResult<OperationPlan> {
        let pool_key = request
            .pool
            .ok_or_else(|| SdkError::Validation("no pool selected".to_string()))?;
        let owner = owner.ok_or(SdkError::Unauthenticated)?;
        let amount_a = parse_amount(&request.amount_a, AMOUNT_DECIMALS)?;
        let amount_b = parse_amount(&request.amount_b, AMOUNT_DECIMALS)?;

        let pool = self.base.fetch_pool(&pool_key).await?;
        let (addresses, user) = self.resolve(&pool, &owner);
        let user_lp = get_associated_token_address(&owner, &addresses.lp_mint);
        debug!(
            "Adding {} / {} to pool {}",
            format_amount(amount_a, AMOUNT_DECIMALS),
            format_amount(amount_b, AMOUNT_DECIMALS),
            pool_key
        );

        let mut plan = InstructionSet::new();
        self.wrap
            .plan_wrap_in(&mut plan, &owner, &pool.state.mint_a, amount_a)
            .await?;
        self.wrap
            .plan_wrap_in(&mut plan, &owner, &pool.state.mint_b, amount_b)
            .await?;
        self.prober
            .ensure_owned_account(&mut plan, &owner, &owner, &addresses.lp_mint)
            .await?;
        plan.push_amm(self.amm.add_liquidity(
            &user,
            user_lp,
            &addresses,
            AddLiquidityParams { amount_a, amount_b },
        )?)?;

        Ok(OperationPlan::new(Operation::AddLiquidity, pool_key, plan))
    }

    /// Sequence a withdrawal of the owner's entire LP balance
    pub async fn plan_remove_liquidity(
        &self,
        owner: Option<Pubkey>,
        request: &RemoveLiquidityRequest,
    ) -> SdkResult<OperationPlan> {
        let pool_key = request
            .pool
            .ok_or_else(|| SdkError::Validation("no pool selected".to_string()))?;
        let owner = owner.ok_or(SdkError::Unauthenticated)?;

        let pool = self.base.fetch_pool(&pool_key).await?;
        let (addresses, user) = self.resolve(&pool, &owner);
        let user_lp = get_associated_token_address(&owner, &addresses.lp_mint);

        let lp_amount = match self.base.get_token_balance(&user_lp).await? {
            Some(balance) if balance > 0 => balance,
            Some(_) => {
                return Err(SdkError::InsufficientBalance(format!(
                    "no LP tokens of pool {} to withdraw",
                    pool_key
                )))
            }
            None => {
                return Err(SdkError::InsufficientBalance(format!(
                    "no LP account for pool {}",
                    pool_key
                )))
            }
        };
        debug!("Withdrawing {} LP from pool {}", lp_amount, pool_key);

        let mut plan = InstructionSet::new();
        self.prober
            .ensure_owned_account(&mut plan, &owner, &owner, &pool.state.mint_a)
            .await?;
        self.prober
            .ensure_owned_account(&mut plan, &owner, &owner, &pool.state.mint_b)
            .await?;
        plan.push_amm(self.amm.remove_liquidity(
            &user,
            user_lp,
            &addresses,
            RemoveLiquidityParams { lp_amount },
        )?)?;
        self.wrap
            .plan_unwrap_out(&mut plan, &owner, &pool.state.mint_a)?;
        self.wrap
            .plan_unwrap_out(&mut plan, &owner, &pool.state.mint_b)?;

        Ok(OperationPlan::new(Operation::RemoveLiquidity, pool_key, plan))
    }

    fn resolve(&self, pool: &PoolInfo, owner: &Pubkey) -> (PoolAddresses, UserPoolAccounts) {
        resolve_accounts(&self.pda, pool, owner)
    }
}

/// Pool-derived accounts plus the owner's token accounts for both sides
pub(crate) fn resolve_accounts(
    pda: &PdaBuilder,
    pool: &PoolInfo,
    owner: &Pubkey,
) -> (PoolAddresses, UserPoolAccounts) {
    let addresses = pda.pool_accounts(&pool.address);
    if addresses.vault_a != pool.state.vault_a
        || addresses.vault_b != pool.state.vault_b
        || addresses.lp_mint != pool.state.lp_mint
    {
        warn!(
            "Pool {} stores accounts that differ from their derived addresses",
            pool.address
        );
    }

    let user = UserPoolAccounts {
        user: *owner,
        user_ata_a: pda.owned_token_account(owner, &pool.state.mint_a),
        user_ata_b: pda.owned_token_account(owner, &pool.state.mint_b),
    };
    (addresses, user)
}
