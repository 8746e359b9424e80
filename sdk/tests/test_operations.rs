//! End-to-end sequencing of the four AMM operations against an in-memory cluster

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use amm_sdk::{
        core::{native_wrapper_mint, SimulationReport},
        instructions::{
            AddLiquidityParams, AmmInstruction, RemoveLiquidityParams, SwapTokenParams,
        },
        testing::{pool_fixture, MockSigner, MockTransport},
        AddLiquidityRequest, AmmClient, InitPoolRequest, InstructionKind, OperationPlan,
        PoolInfo, ProbeFailurePolicy, RemoveLiquidityRequest, SdkConfig, SdkError,
        SigningIdentity, SwapDirection, SwapRequest,
    };
    use solana_sdk::pubkey::Pubkey;
    use spl_associated_token_account::get_associated_token_address;

    struct Harness {
        rpc: Arc<MockTransport>,
        client: AmmClient,
        owner: Pubkey,
    }

    fn harness_with(config: SdkConfig, signer: MockSigner) -> Harness {
        let rpc = Arc::new(MockTransport::new());
        let owner = signer.pubkey();
        let mut client = AmmClient::with_transport(rpc.clone(), &config);
        client.connect(Arc::new(signer));
        Harness { rpc, client, owner }
    }

    fn harness() -> Harness {
        harness_with(SdkConfig::localnet(), MockSigner::approving())
    }

    impl Harness {
        fn pool(&self, mint_x: Pubkey, mint_y: Pubkey) -> PoolInfo {
            let pool = pool_fixture(&self.client.program_id(), mint_x, mint_y);
            self.rpc.add_pool(&self.client.program_id(), &pool);
            pool
        }

        fn owned(&self, mint: &Pubkey) -> Pubkey {
            get_associated_token_address(&self.owner, mint)
        }

        fn fund(&self, mint: &Pubkey, balance: u64) {
            self.rpc.add_token_account(self.owned(mint), balance);
        }
    }

    fn kinds(plan: &OperationPlan) -> Vec<InstructionKind> {
        plan.instructions.kinds().into_iter().cloned().collect()
    }

    fn swap_request(pool: &PoolInfo, input: &Pubkey, amount: &str) -> SwapRequest {
        SwapRequest {
            pool: Some(pool.address),
            direction: if pool.state.mint_a == *input {
                SwapDirection::AToB
            } else {
                SwapDirection::BToA
            },
            amount_in: amount.to_string(),
            minimum_out: None,
        }
    }

    #[tokio::test]
    async fn test_init_pool_same_key_for_both_orders() {
        let h = harness();
        let x = Pubkey::new_from_array([9u8; 32]);
        let y = Pubkey::new_from_array([3u8; 32]);

        let first = h
            .client
            .init_pool(&InitPoolRequest {
                mint_a: x.to_string(),
                mint_b: y.to_string(),
            })
            .await
            .unwrap();
        let second = h
            .client
            .init_pool(&InitPoolRequest {
                mint_a: y.to_string(),
                mint_b: x.to_string(),
            })
            .await
            .unwrap();

        assert_eq!(first.pool, second.pool);
        assert_eq!(first.instruction_count, 1);
        assert_eq!(
            h.client.pool_address_for(&x.to_string(), &y.to_string()).unwrap(),
            first.pool
        );

        // Normalized to (Y, X) before derivation
        let sent = h.rpc.sent_transactions();
        assert_eq!(sent.len(), 2);
        let message = &sent[0].message;
        let ix = &message.instructions[0];
        assert_eq!(message.account_keys[ix.accounts[1] as usize], y);
        assert_eq!(message.account_keys[ix.accounts[2] as usize], x);
        // No existence probing for init
        assert!(!h.rpc.calls().iter().any(|c| c.starts_with("getAccountInfo")));
    }

    #[tokio::test]
    async fn test_init_pool_same_asset_fails_before_network() {
        let h = harness();
        let x = Pubkey::new_unique().to_string();
        let err = h
            .client
            .init_pool(&InitPoolRequest {
                mint_a: x.clone(),
                mint_b: x,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::Validation(_)));
        assert!(h.rpc.calls().is_empty());
    }

    #[tokio::test]
    async fn test_swap_wrapped_native_input() {
        let h = harness();
        let wsol = native_wrapper_mint();
        let other = Pubkey::new_unique();
        let pool = h.pool(wsol, other);
        h.fund(&other, 0);

        let request = swap_request(&pool, &wsol, "2.5");
        let plan = h.client.plan_swap(&request).await.unwrap();
        let wsol_account = h.owned(&wsol);

        assert_eq!(
            kinds(&plan),
            vec![
                InstructionKind::CreateOwnedAccount {
                    account: wsol_account,
                    mint: wsol
                },
                InstructionKind::NativeTransfer {
                    account: wsol_account,
                    lamports: 2_500_000_000
                },
                InstructionKind::SyncNative {
                    account: wsol_account
                },
                InstructionKind::Amm(AmmInstruction::SwapToken(SwapTokenParams {
                    amount_in: 2_500_000_000,
                    minimum_out: 1,
                })),
            ]
        );

        let receipt = h.client.execute(plan).await.unwrap();
        assert_eq!(receipt.instruction_count, 4);
        assert!(!receipt.unwrapped_native);
        let sent = h.rpc.sent_transactions();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].message.instructions.len(), 4);
        assert_eq!(sent[0].signatures[0], receipt.signature);
    }

    #[tokio::test]
    async fn test_swap_wrapped_native_input_existing_account() {
        let h = harness();
        let wsol = native_wrapper_mint();
        let other = Pubkey::new_unique();
        let pool = h.pool(wsol, other);
        h.fund(&other, 0);
        h.fund(&wsol, 0);

        let plan = h
            .client
            .plan_swap(&swap_request(&pool, &wsol, "2.5"))
            .await
            .unwrap();
        let plan_kinds = kinds(&plan);
        assert_eq!(plan_kinds.len(), 3);
        assert!(matches!(plan_kinds[0], InstructionKind::NativeTransfer { .. }));
    }

    #[tokio::test]
    async fn test_swap_into_wrapped_native_unwraps() {
        let h = harness();
        let wsol = native_wrapper_mint();
        let other = Pubkey::new_unique();
        let pool = h.pool(wsol, other);
        h.fund(&other, 10_000_000_000);
        h.fund(&wsol, 0);

        let plan = h
            .client
            .plan_swap(&swap_request(&pool, &other, "3"))
            .await
            .unwrap();
        let wsol_account = h.owned(&wsol);
        let plan_kinds = kinds(&plan);

        assert_eq!(plan_kinds.len(), 3);
        assert!(matches!(
            plan_kinds[0],
            InstructionKind::Amm(AmmInstruction::SwapToken(SwapTokenParams {
                amount_in: 3_000_000_000,
                minimum_out: 1,
                ..
            }))
        ));
        assert_eq!(
            plan_kinds[1],
            InstructionKind::SyncNative {
                account: wsol_account
            }
        );
        assert_eq!(
            plan_kinds[2],
            InstructionKind::CloseAccount {
                account: wsol_account
            }
        );

        let receipt = h.client.execute(plan).await.unwrap();
        assert!(receipt.unwrapped_native);
    }

    #[tokio::test]
    async fn test_swap_without_wrapper_has_no_wrap_steps() {
        let h = harness();
        let (x, y) = (Pubkey::new_unique(), Pubkey::new_unique());
        let pool = h.pool(x, y);

        let plan = h.client.plan_swap(&swap_request(&pool, &x, "1")).await.unwrap();
        for kind in kinds(&plan) {
            assert!(matches!(
                kind,
                InstructionKind::CreateOwnedAccount { .. } | InstructionKind::Amm(_)
            ));
        }
        assert_eq!(plan.instructions.len(), 3);
    }

    #[tokio::test]
    async fn test_add_liquidity_non_wrapper_pair() {
        let h = harness();
        let pool = h.pool(Pubkey::new_unique(), Pubkey::new_unique());
        let request = AddLiquidityRequest {
            pool: Some(pool.address),
            amount_a: "1.0".to_string(),
            amount_b: "1.0".to_string(),
        };

        let plan = h.client.plan_add_liquidity(&request).await.unwrap();
        let lp_account = h.owned(&pool.state.lp_mint);
        let add = InstructionKind::Amm(AmmInstruction::AddLiquidity(AddLiquidityParams {
            amount_a: 1_000_000_000,
            amount_b: 1_000_000_000,
        }));
        assert_eq!(
            kinds(&plan),
            vec![
                InstructionKind::CreateOwnedAccount {
                    account: lp_account,
                    mint: pool.state.lp_mint
                },
                add.clone(),
            ]
        );

        // With the LP account in place only the deposit remains
        h.fund(&pool.state.lp_mint, 0);
        let plan = h.client.plan_add_liquidity(&request).await.unwrap();
        assert_eq!(kinds(&plan), vec![add]);

        let receipt = h.client.add_liquidity(&request).await.unwrap();
        assert_eq!(receipt.pool, pool.address);
    }

    #[tokio::test]
    async fn test_add_liquidity_wrapper_side_a_absent() {
        let h = harness();
        let wsol = native_wrapper_mint();
        // All-0xff sorts after the native mint, so the wrapper is side A
        let other = Pubkey::new_from_array([0xff; 32]);
        let pool = h.pool(wsol, other);
        assert_eq!(pool.state.mint_a, wsol);

        let plan = h
            .client
            .plan_add_liquidity(&AddLiquidityRequest {
                pool: Some(pool.address),
                amount_a: "0.75".to_string(),
                amount_b: "12".to_string(),
            })
            .await
            .unwrap();

        let wsol_account = h.owned(&wsol);
        assert_eq!(
            kinds(&plan),
            vec![
                InstructionKind::CreateOwnedAccount {
                    account: wsol_account,
                    mint: wsol
                },
                InstructionKind::NativeTransfer {
                    account: wsol_account,
                    lamports: 750_000_000
                },
                InstructionKind::SyncNative {
                    account: wsol_account
                },
                InstructionKind::CreateOwnedAccount {
                    account: h.owned(&pool.state.lp_mint),
                    mint: pool.state.lp_mint
                },
                InstructionKind::Amm(AmmInstruction::AddLiquidity(AddLiquidityParams {
                    amount_a: 750_000_000,
                    amount_b: 12_000_000_000,
                })),
            ]
        );
    }

    #[tokio::test]
    async fn test_remove_liquidity_full_withdrawal() {
        let h = harness();
        let pool = h.pool(Pubkey::new_unique(), Pubkey::new_unique());
        h.fund(&pool.state.lp_mint, 500_000_000);

        let request = RemoveLiquidityRequest {
            pool: Some(pool.address),
        };
        let plan = h.client.plan_remove_liquidity(&request).await.unwrap();
        assert_eq!(
            kinds(&plan),
            vec![
                InstructionKind::CreateOwnedAccount {
                    account: h.owned(&pool.state.mint_a),
                    mint: pool.state.mint_a
                },
                InstructionKind::CreateOwnedAccount {
                    account: h.owned(&pool.state.mint_b),
                    mint: pool.state.mint_b
                },
                InstructionKind::Amm(AmmInstruction::RemoveLiquidity(RemoveLiquidityParams {
                    lp_amount: 500_000_000
                })),
            ]
        );

        let receipt = h.client.remove_liquidity(&request).await.unwrap();
        assert!(!receipt.unwrapped_native);
        assert_eq!(h.rpc.sent_transactions().len(), 1);
    }

    #[tokio::test]
    async fn test_remove_liquidity_nothing_to_withdraw() {
        let h = harness();
        let pool = h.pool(Pubkey::new_unique(), Pubkey::new_unique());
        let request = RemoveLiquidityRequest {
            pool: Some(pool.address),
        };

        // Absent LP account
        assert!(matches!(
            h.client.remove_liquidity(&request).await,
            Err(SdkError::InsufficientBalance(_))
        ));

        // Empty LP account
        h.fund(&pool.state.lp_mint, 0);
        assert!(matches!(
            h.client.remove_liquidity(&request).await,
            Err(SdkError::InsufficientBalance(_))
        ));

        assert!(h.rpc.sent_transactions().is_empty());
        assert!(h.rpc.simulated_transactions().is_empty());
    }

    #[tokio::test]
    async fn test_probe_failure_policies() {
        let (x, y) = (Pubkey::new_unique(), Pubkey::new_unique());

        let strict = harness_with(
            SdkConfig::localnet().with_probe_failure_policy(ProbeFailurePolicy::Abort),
            MockSigner::approving(),
        );
        let pool = strict.pool(x, y);
        strict.rpc.fail_lookups(strict.owned(&y));
        let err = strict
            .client
            .swap(&swap_request(&pool, &x, "1"))
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::Transport(_)));
        assert!(strict.rpc.sent_transactions().is_empty());

        let lenient = harness();
        let pool = lenient.pool(x, y);
        lenient.fund(&x, 5_000_000_000);
        lenient.rpc.fail_lookups(lenient.owned(&y));
        let plan = lenient
            .client
            .plan_swap(&swap_request(&pool, &x, "1"))
            .await
            .unwrap();
        assert_eq!(
            kinds(&plan)[0],
            InstructionKind::CreateOwnedAccount {
                account: lenient.owned(&y),
                mint: y
            }
        );
    }

    #[tokio::test]
    async fn test_declined_signature_sends_nothing() {
        let h = harness_with(SdkConfig::localnet(), MockSigner::rejecting());
        let pool = h.pool(Pubkey::new_unique(), Pubkey::new_unique());

        let err = h
            .client
            .add_liquidity(&AddLiquidityRequest {
                pool: Some(pool.address),
                amount_a: "1".to_string(),
                amount_b: "2".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, SdkError::UserRejected));
        assert!(err.is_user_facing());
        assert!(h.rpc.sent_transactions().is_empty());
        // Simulation happens before the signature request
        assert_eq!(h.rpc.simulated_transactions().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_simulation_is_reported_not_fatal() {
        let h = harness();
        let pool = h.pool(Pubkey::new_unique(), Pubkey::new_unique());
        h.rpc.set_simulation(SimulationReport {
            err: Some("{\"InstructionError\":[0,{\"Custom\":6001}]}".to_string()),
            logs: vec!["Program log: Error: slippage exceeded".to_string()],
            units_consumed: Some(4_200),
        });

        let receipt = h
            .client
            .swap(&swap_request(&pool, &pool.state.mint_b, "1"))
            .await
            .unwrap();

        let report = receipt.simulation.unwrap();
        assert!(!report.succeeded());
        assert_eq!(h.rpc.sent_transactions().len(), 1);
    }

    #[tokio::test]
    async fn test_pool_listing_and_lookup() {
        let h = harness();
        let first = h.pool(Pubkey::new_unique(), Pubkey::new_unique());
        let second = h.pool(native_wrapper_mint(), Pubkey::new_unique());

        let pools = h.client.list_pools().await.unwrap();
        assert_eq!(pools.len(), 2);
        assert!(pools.contains(&first));
        assert!(pools.contains(&second));

        let fetched = h.client.get_pool(&second.address).await.unwrap();
        assert!(fetched.has_native_side());
        assert!(matches!(
            h.client.get_pool(&Pubkey::new_unique()).await,
            Err(SdkError::PoolNotFound(_))
        ));
    }
}
