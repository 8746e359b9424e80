use std::sync::Arc;

use solana_sdk::pubkey::Pubkey;
use tracing::debug;

use crate::{
    client::{BaseClient, InstructionSet, OperationPlan},
    core::{InitPoolRequest, Operation, PoolInfo, SdkError, SdkResult},
    instructions::{AmmInstructions, InitializePoolParams},
    protocol::{parse_asset_id, PdaBuilder, TokenPair},
};

/// Service for pool creation and lookup
pub struct PoolService {
    base: Arc<BaseClient>,
    pda: Arc<PdaBuilder>,
    amm: AmmInstructions,
    fees: InitializePoolParams,
}

impl PoolService {
    pub fn new(
        base: Arc<BaseClient>,
        pda: Arc<PdaBuilder>,
        fee_bps: u16,
        proto_fee_bps: u16,
    ) -> Self {
        Self {
            amm: AmmInstructions::new(pda.program_id),
            fees: InitializePoolParams {
                fee_bps,
                proto_fee_bps,
            },
            base,
            pda,
        }
    }

    /// Sequence an `initialize_pool` call.
    ///
    /// No probing happens here: the program itself rejects a second
    /// initialization of the same pair.
    pub fn plan_init_pool(
        &self,
        initializer: Option<Pubkey>,
        request: &InitPoolRequest,
    ) -> SdkResult<OperationPlan> {
        let mint_x = parse_asset_id(&request.mint_a).map_err(as_validation)?;
        let mint_y = parse_asset_id(&request.mint_b).map_err(as_validation)?;
        if mint_x == mint_y {
            return Err(SdkError::Validation(
                "a pool needs two different assets".to_string(),
            ));
        }
        let initializer = initializer.ok_or(SdkError::Unauthenticated)?;

        let pair = TokenPair::new(mint_x, mint_y)?;
        let addresses = self.pda.pool_addresses(&pair);
        debug!(
            "Initializing pool {} for {} / {}",
            addresses.pool,
            pair.mint_a(),
            pair.mint_b()
        );

        let mut plan = InstructionSet::new();
        plan.push_amm(self.amm.initialize_pool(
            initializer,
            &pair,
            &addresses,
            self.fees.clone(),
        )?)?;

        Ok(OperationPlan::new(Operation::InitPool, addresses.pool, plan))
    }

    /// Pool address for an unordered pair of mints
    pub fn pool_address_for(&self, mint_x: &str, mint_y: &str) -> SdkResult<Pubkey> {
        let pair = TokenPair::new(parse_asset_id(mint_x)?, parse_asset_id(mint_y)?)?;
        Ok(self.pda.pool(&pair).0)
    }

    /// Fetch one pool by address
    pub async fn get_pool(&self, pool: &Pubkey) -> SdkResult<PoolInfo> {
        self.base.fetch_pool(pool).await
    }

    /// List every pool of the program
    pub async fn list_pools(&self) -> SdkResult<Vec<PoolInfo>> {
        self.base.list_pools().await
    }
}

fn as_validation(err: SdkError) -> SdkError {
    match err {
        SdkError::InvalidInput(msg) => SdkError::Validation(msg),
        other => other,
    }
}
