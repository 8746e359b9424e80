use std::sync::Arc;

use solana_sdk::pubkey::Pubkey;
use tracing::debug;

use crate::{
    client::{
        liquidity::resolve_accounts, AccountProber, BaseClient, InstructionSet, OperationPlan,
        WrapPlanner,
    },
    core::{Operation, SdkError, SdkResult, SwapRequest, AMOUNT_DECIMALS, DEFAULT_MINIMUM_OUT},
    instructions::{AmmInstructions, SwapTokenParams},
    protocol::{parse_amount, parse_optional_amount, PdaBuilder},
};

/// Service for swaps through a single pool
pub struct SwapService {
    base: Arc<BaseClient>,
    pda: Arc<PdaBuilder>,
    prober: Arc<AccountProber>,
    wrap: Arc<WrapPlanner>,
    amm: AmmInstructions,
}

impl SwapService {
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

    /// Sequence a swap: wrap the input if native, swap, unwrap the output if native
    pub async fn plan_swap(
        &self,
        owner: Option<Pubkey>,
        request: &SwapRequest,
    ) -> SdkResult<OperationPlan> {
        let pool_key = request
            .pool
            .ok_or_else(|| SdkError::Validation("no pool selected".to_string()))?;
        let owner = owner.ok_or(SdkError::Unauthenticated)?;
        let amount_in = parse_amount(&request.amount_in, AMOUNT_DECIMALS)?;
        let minimum_out = parse_optional_amount(request.minimum_out.as_deref(), AMOUNT_DECIMALS)?
            .unwrap_or(DEFAULT_MINIMUM_OUT);

        let pool = self.base.fetch_pool(&pool_key).await?;
        let (addresses, user) = resolve_accounts(&self.pda, &pool, &owner);
        let (mint_in, mint_out) = request.direction.mints(&pool.state);
        debug!(
            "Swapping {} of {} for {} (min out {}) in pool {}",
            amount_in, mint_in, mint_out, minimum_out, pool_key
        );

        let mut plan = InstructionSet::new();
        self.wrap
            .plan_wrap_in(&mut plan, &owner, &mint_in, amount_in)
            .await?;
        self.prober
            .ensure_owned_account(&mut plan, &owner, &owner, &pool.state.mint_a)
            .await?;
        self.prober
            .ensure_owned_account(&mut plan, &owner, &owner, &pool.state.mint_b)
            .await?;
        plan.push_amm(self.amm.swap_token(
            &user,
            &addresses,
            SwapTokenParams {
                amount_in,
                minimum_out,
            },
        )?)?;
        self.wrap.plan_unwrap_out(&mut plan, &owner, &mint_out)?;

        Ok(OperationPlan::new(Operation::Swap, pool_key, plan))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{InstructionKind, ProbeFailurePolicy};
    use crate::core::{native_wrapper_mint, program_id, PoolInfo, SwapDirection};
    use crate::instructions::AmmInstruction;
    use crate::testing::{pool_fixture, MockTransport};
    use spl_associated_token_account::get_associated_token_address;

    fn service(rpc: Arc<MockTransport>, policy: ProbeFailurePolicy) -> SwapService {
        let base = Arc::new(BaseClient::new(rpc.clone()));
        let prober = Arc::new(AccountProber::new(rpc, policy));
        SwapService::new(
            base,
            Arc::new(PdaBuilder::new(program_id())),
            prober.clone(),
            Arc::new(WrapPlanner::new(prober)),
        )
    }

    fn request(
        pool: &PoolInfo,
        direction: SwapDirection,
        amount: &str,
        min: Option<&str>,
    ) -> SwapRequest {
        SwapRequest {
            pool: Some(pool.address),
            direction,
            amount_in: amount.to_string(),
            minimum_out: min.map(str::to_string),
        }
    }

    /// Direction whose input side is `mint`
    fn direction_from(pool: &PoolInfo, mint: &Pubkey) -> SwapDirection {
        if pool.state.mint_a == *mint {
            SwapDirection::AToB
        } else {
            SwapDirection::BToA
        }
    }

    #[tokio::test]
    async fn test_swap_rejects_non_positive_amount_before_network() {
        let rpc = Arc::new(MockTransport::new());
        let pool = pool_fixture(&program_id(), Pubkey::new_unique(), Pubkey::new_unique());
        let service = service(rpc.clone(), ProbeFailurePolicy::AssumeAbsent);

        for amount in ["0", "-2", "0.0000000001"] {
            let err = service
                .plan_swap(
                    Some(Pubkey::new_unique()),
                    &request(&pool, SwapDirection::AToB, amount, None),
                )
                .await
                .unwrap_err();
            assert!(matches!(err, SdkError::Validation(_)), "{}", amount);
        }
        assert!(rpc.calls().is_empty());
    }

    #[tokio::test]
    async fn test_swap_explicit_minimum_out() {
        let rpc = Arc::new(MockTransport::new());
        let pool = pool_fixture(&program_id(), Pubkey::new_unique(), Pubkey::new_unique());
        rpc.add_pool(&program_id(), &pool);

        let plan = service(rpc, ProbeFailurePolicy::AssumeAbsent)
            .plan_swap(
                Some(Pubkey::new_unique()),
                &request(&pool, SwapDirection::BToA, "1", Some("0.25")),
            )
            .await
            .unwrap();

        assert_eq!(
            plan.instructions.kinds().last(),
            Some(&&InstructionKind::Amm(AmmInstruction::SwapToken(SwapTokenParams {
                amount_in: 1_000_000_000,
                minimum_out: 250_000_000,
            })))
        );
    }

    #[tokio::test]
    async fn test_swap_wrapper_side_created_once() {
        let rpc = Arc::new(MockTransport::new());
        let wsol = native_wrapper_mint();
        let other = Pubkey::new_unique();
        let pool = pool_fixture(&program_id(), wsol, other);
        rpc.add_pool(&program_id(), &pool);
        let owner = Pubkey::new_unique();

        let plan = service(rpc, ProbeFailurePolicy::AssumeAbsent)
            .plan_swap(
                Some(owner),
                &request(&pool, direction_from(&pool, &wsol), "1", None),
            )
            .await
            .unwrap();

        let wsol_account = get_associated_token_address(&owner, &wsol);
        let creations: Vec<_> = plan
            .instructions
            .kinds()
            .into_iter()
            .filter(|k| matches!(k, InstructionKind::CreateOwnedAccount { .. }))
            .cloned()
            .collect();
        assert_eq!(
            creations,
            vec![
                InstructionKind::CreateOwnedAccount {
                    account: wsol_account,
                    mint: wsol
                },
                InstructionKind::CreateOwnedAccount {
                    account: get_associated_token_address(&owner, &other),
                    mint: other
                },
            ]
        );
        assert!(!plan.unwraps_native());
    }

    #[tokio::test]
    async fn test_swap_into_wrapper_ends_with_unwrap() {
        let rpc = Arc::new(MockTransport::new());
        let wsol = native_wrapper_mint();
        let other = Pubkey::new_unique();
        let pool = pool_fixture(&program_id(), wsol, other);
        rpc.add_pool(&program_id(), &pool);
        let owner = Pubkey::new_unique();

        let plan = service(rpc, ProbeFailurePolicy::AssumeAbsent)
            .plan_swap(
                Some(owner),
                &request(&pool, direction_from(&pool, &other), "4", None),
            )
            .await
            .unwrap();

        let wsol_account = get_associated_token_address(&owner, &wsol);
        let kinds = plan.instructions.kinds();
        let n = kinds.len();
        assert!(matches!(
            kinds[n - 3],
            InstructionKind::Amm(AmmInstruction::SwapToken(_))
        ));
        assert_eq!(kinds[n - 2], &InstructionKind::SyncNative { account: wsol_account });
        assert_eq!(kinds[n - 1], &InstructionKind::CloseAccount { account: wsol_account });
        assert!(!kinds
            .iter()
            .any(|k| matches!(k, InstructionKind::NativeTransfer { .. })));
    }

    #[tokio::test]
    async fn test_swap_probe_failure_under_abort_policy() {
        let rpc = Arc::new(MockTransport::new());
        let pool = pool_fixture(&program_id(), Pubkey::new_unique(), Pubkey::new_unique());
        rpc.add_pool(&program_id(), &pool);
        let owner = Pubkey::new_unique();
        rpc.fail_lookups(get_associated_token_address(&owner, &pool.state.mint_b));

        let err = service(rpc.clone(), ProbeFailurePolicy::Abort)
            .plan_swap(Some(owner), &request(&pool, SwapDirection::AToB, "1", None))
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::Transport(_)));

        // The lenient policy schedules the creation instead
        let plan = service(rpc, ProbeFailurePolicy::AssumeAbsent)
            .plan_swap(Some(owner), &request(&pool, SwapDirection::AToB, "1", None))
            .await
            .unwrap();
        assert_eq!(plan.instructions.len(), 3);
    }
}
