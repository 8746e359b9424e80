pub mod base;
pub mod liquidity;
pub mod pipeline;
pub mod plan;
pub mod pool;
pub mod prober;
pub mod swap;
pub mod wrap;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use solana_sdk::pubkey::Pubkey;
use tracing::info;

use crate::{
    config::SdkConfig,
    core::{
        AddLiquidityRequest, InitPoolRequest, OperationReceipt, PoolInfo, RemoveLiquidityRequest,
        SdkError, SdkResult, SwapRequest,
    },
    protocol::PdaBuilder,
    rpc::{LightRpcClient, RpcTransport, SigningIdentity},
};

pub use base::BaseClient;
pub use liquidity::LiquidityService;
pub use pipeline::{Submission, TransactionPipeline};
pub use plan::{InstructionKind, InstructionSet, OperationPlan, PlannedInstruction};
pub use pool::PoolService;
pub use prober::{AccountProber, ProbeFailurePolicy, ProbeOutcome};
pub use swap::SwapService;
pub use wrap::WrapPlanner;

/// Main AMM client with service-based architecture
pub struct AmmClient {
    /// Base RPC client
    pub base: Arc<BaseClient>,
    /// Pool creation and lookup
    pub pool: PoolService,
    /// Deposits and withdrawals
    pub liquidity: LiquidityService,
    /// Swap execution service
    pub swap: SwapService,
    /// Transaction submission
    pub pipeline: TransactionPipeline,
    /// PDA builder
    pub pda: Arc<PdaBuilder>,
    wallet: Option<Arc<dyn SigningIdentity>>,
    in_flight: AtomicBool,
}

impl AmmClient {
    /// Create a client talking JSON-RPC to `config.rpc_url`
    pub fn new(config: &SdkConfig) -> SdkResult<Self> {
        config.validate()?;
        let rpc = LightRpcClient::with_options(
            &config.rpc_url,
            &config.commitment,
            Duration::from_secs(config.request_timeout_secs),
        );
        Ok(Self::with_transport(Arc::new(rpc), config))
    }

    /// Create a client over any transport
    pub fn with_transport(rpc: Arc<dyn RpcTransport>, config: &SdkConfig) -> Self {
        let base = Arc::new(BaseClient::with_program_id(rpc.clone(), config.program_id));
        let pda = Arc::new(PdaBuilder::new(config.program_id));
        let prober = Arc::new(AccountProber::new(rpc.clone(), config.probe_failure_policy));
        let wrap = Arc::new(WrapPlanner::new(prober.clone()));

        Self {
            pool: PoolService::new(
                base.clone(),
                pda.clone(),
                config.fee_bps,
                config.protocol_fee_bps,
            ),
            liquidity: LiquidityService::new(
                base.clone(),
                pda.clone(),
                prober.clone(),
                wrap.clone(),
            ),
            swap: SwapService::new(base.clone(), pda.clone(), prober, wrap),
            pipeline: TransactionPipeline::new(rpc),
            base,
            pda,
            wallet: None,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Get the program ID
    pub fn program_id(&self) -> Pubkey {
        self.base.program_id()
    }

    /// Attach the identity that pays for and signs every operation
    pub fn connect(&mut self, wallet: Arc<dyn SigningIdentity>) {
        info!("Wallet connected: {}", wallet.pubkey());
        self.wallet = Some(wallet);
    }

    pub fn disconnect(&mut self) {
        self.wallet = None;
    }

    pub fn wallet_pubkey(&self) -> Option<Pubkey> {
        self.wallet.as_ref().map(|w| w.pubkey())
    }

    /// Build the init-pool plan without submitting
    pub fn plan_init_pool(&self, request: &InitPoolRequest) -> SdkResult<OperationPlan> {
        self.pool.plan_init_pool(self.wallet_pubkey(), request)
    }

    pub async fn plan_add_liquidity(
        &self,
        request: &AddLiquidityRequest,
    ) -> SdkResult<OperationPlan> {
        self.liquidity
            .plan_add_liquidity(self.wallet_pubkey(), request)
            .await
    }

    pub async fn plan_swap(&self, request: &SwapRequest) -> SdkResult<OperationPlan> {
        self.swap.plan_swap(self.wallet_pubkey(), request).await
    }

    pub async fn plan_remove_liquidity(
        &self,
        request: &RemoveLiquidityRequest,
    ) -> SdkResult<OperationPlan> {
        self.liquidity
            .plan_remove_liquidity(self.wallet_pubkey(), request)
            .await
    }

    /// Create the pool for an unordered pair of mints
    pub async fn init_pool(&self, request: &InitPoolRequest) -> SdkResult<OperationReceipt> {
        let _guard = self.begin()?;
        let plan = self.plan_init_pool(request)?;
        self.execute(plan).await
    }

    /// Deposit both sides into a pool
    pub async fn add_liquidity(
        &self,
        request: &AddLiquidityRequest,
    ) -> SdkResult<OperationReceipt> {
        let _guard = self.begin()?;
        let plan = self.plan_add_liquidity(request).await?;
        self.execute(plan).await
    }

    /// Swap through a pool
    pub async fn swap(&self, request: &SwapRequest) -> SdkResult<OperationReceipt> {
        let _guard = self.begin()?;
        let plan = self.plan_swap(request).await?;
        self.execute(plan).await
    }

    /// Withdraw the wallet's entire LP position
    pub async fn remove_liquidity(
        &self,
        request: &RemoveLiquidityRequest,
    ) -> SdkResult<OperationReceipt> {
        let _guard = self.begin()?;
        let plan = self.plan_remove_liquidity(request).await?;
        self.execute(plan).await
    }

    pub async fn get_pool(&self, pool: &Pubkey) -> SdkResult<PoolInfo> {
        self.pool.get_pool(pool).await
    }

    pub async fn list_pools(&self) -> SdkResult<Vec<PoolInfo>> {
        self.pool.list_pools().await
    }

    /// Pool address for an unordered pair of base58 mints
    pub fn pool_address_for(&self, mint_x: &str, mint_y: &str) -> SdkResult<Pubkey> {
        self.pool.pool_address_for(mint_x, mint_y)
    }

    /// Submit a plan with the connected wallet as fee payer
    pub async fn execute(&self, plan: OperationPlan) -> SdkResult<OperationReceipt> {
        let wallet = self.wallet.as_ref().ok_or(SdkError::Unauthenticated)?;
        let submission = self
            .pipeline
            .execute(&plan.instructions.instructions(), wallet.as_ref())
            .await?;

        info!("{} on pool {}: {}", plan.operation, plan.pool, submission.signature);
        Ok(OperationReceipt {
            operation: plan.operation,
            signature: submission.signature,
            pool: plan.pool,
            instruction_count: plan.instructions.len(),
            simulation: submission.simulation,
            unwrapped_native: plan.unwraps_native(),
        })
    }

    fn begin(&self) -> SdkResult<InFlightGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| SdkError::OperationInFlight)?;
        Ok(InFlightGuard(&self.in_flight))
    }
}

/// Clears the in-flight flag on every exit path
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SwapDirection;
    use crate::testing::{MockSigner, MockTransport};

    fn client() -> AmmClient {
        let mut client =
            AmmClient::with_transport(Arc::new(MockTransport::new()), &SdkConfig::localnet());
        client.connect(Arc::new(MockSigner::approving()));
        client
    }

    fn swap_request() -> SwapRequest {
        SwapRequest {
            pool: Some(Pubkey::new_unique()),
            direction: SwapDirection::AToB,
            amount_in: "1".to_string(),
            minimum_out: None,
        }
    }

    #[tokio::test]
    async fn test_second_operation_rejected_while_in_flight() {
        let client = client();
        let guard = client.begin().unwrap();

        assert!(matches!(
            client.swap(&swap_request()).await,
            Err(SdkError::OperationInFlight)
        ));

        drop(guard);
        // Flag released: the swap now fails on its own merits
        assert!(matches!(
            client.swap(&swap_request()).await,
            Err(SdkError::PoolNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_flag_released_after_failure() {
        let client = client();
        let _ = client.swap(&swap_request()).await;
        assert!(client.begin().is_ok());
    }

    #[tokio::test]
    async fn test_disconnected_wallet() {
        let mut client = client();
        assert!(client.wallet_pubkey().is_some());
        client.disconnect();

        assert!(matches!(
            client.swap(&swap_request()).await,
            Err(SdkError::Unauthenticated)
        ));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = SdkConfig::localnet().with_rpc_url("ftp://example.org".to_string());
        assert!(matches!(AmmClient::new(&config), Err(SdkError::Config(_))));
    }
}
