//! Account existence probing

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use solana_sdk::{instruction::Instruction, pubkey::Pubkey};
use spl_associated_token_account::get_associated_token_address;
use tracing::{debug, warn};

use crate::{
    client::{InstructionKind, InstructionSet},
    core::{SdkError, SdkResult},
    instructions::create_owned_account,
    rpc::RpcTransport,
};

/// What to do when an existence query itself fails
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeFailurePolicy {
    /// Treat the account as absent and schedule its creation
    #[default]
    AssumeAbsent,
    /// Abort the operation with a transport error
    Abort,
}

/// Result of a single existence query
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProbeOutcome {
    Exists,
    Absent,
    /// The query failed; says nothing about the account
    Failed(String),
}

/// Read-only existence checks against the transport
pub struct AccountProber {
    rpc: Arc<dyn RpcTransport>,
    policy: ProbeFailurePolicy,
}

impl AccountProber {
    pub fn new(rpc: Arc<dyn RpcTransport>, policy: ProbeFailurePolicy) -> Self {
        Self { rpc, policy }
    }

    /// Query `address` without interpreting failures
    pub async fn probe(&self, address: &Pubkey) -> ProbeOutcome {
        match self.rpc.get_account(address).await {
            Ok(Some(_)) => ProbeOutcome::Exists,
            Ok(None) => ProbeOutcome::Absent,
            Err(e) => ProbeOutcome::Failed(e.to_string()),
        }
    }

    /// Whether `address` exists, with failures resolved by the policy
    pub async fn exists(&self, address: &Pubkey) -> SdkResult<bool> {
        match self.probe(address).await {
            ProbeOutcome::Exists => Ok(true),
            ProbeOutcome::Absent => Ok(false),
            ProbeOutcome::Failed(reason) => match self.policy {
                ProbeFailurePolicy::AssumeAbsent => {
                    warn!(
                        "Probe of {} failed ({}), assuming absent",
                        address, reason
                    );
                    Ok(false)
                }
                ProbeFailurePolicy::Abort => Err(SdkError::Transport(format!(
                    "existence check for {} failed: {}",
                    address, reason
                ))),
            },
        }
    }

    /// Return the creation instruction for `address` if it needs one
    pub async fn ensure_account<F>(
        &self,
        address: &Pubkey,
        create: F,
    ) -> SdkResult<Option<Instruction>>
    where
        F: FnOnce() -> Instruction,
    {
        if self.exists(address).await? {
            debug!("Account {} exists", address);
            Ok(None)
        } else {
            Ok(Some(create()))
        }
    }

    /// Make sure `owner`'s token account for `mint` exists by the time `plan` runs.
    ///
    /// Accounts already ensured earlier in the plan are neither probed nor
    /// created again.
    pub async fn ensure_owned_account(
        &self,
        plan: &mut InstructionSet,
        payer: &Pubkey,
        owner: &Pubkey,
        mint: &Pubkey,
    ) -> SdkResult<()> {
        let account = get_associated_token_address(owner, mint);
        if plan.is_ensured(&account) {
            return Ok(());
        }

        match self
            .ensure_account(&account, || create_owned_account(payer, owner, mint))
            .await?
        {
            Some(ix) => plan.push(
                InstructionKind::CreateOwnedAccount {
                    account,
                    mint: *mint,
                },
                ix,
            ),
            None => plan.mark_ensured(account),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTransport;

    fn prober(policy: ProbeFailurePolicy) -> (Arc<MockTransport>, AccountProber) {
        let rpc = Arc::new(MockTransport::new());
        let prober = AccountProber::new(rpc.clone(), policy);
        (rpc, prober)
    }

    #[tokio::test]
    async fn test_probe_outcomes() {
        let (rpc, prober) = prober(ProbeFailurePolicy::AssumeAbsent);
        let present = Pubkey::new_unique();
        let missing = Pubkey::new_unique();
        let broken = Pubkey::new_unique();
        rpc.add_token_account(present, 1);
        rpc.fail_lookups(broken);

        assert_eq!(prober.probe(&present).await, ProbeOutcome::Exists);
        assert_eq!(prober.probe(&missing).await, ProbeOutcome::Absent);
        assert!(matches!(prober.probe(&broken).await, ProbeOutcome::Failed(_)));
    }

    #[tokio::test]
    async fn test_failed_probe_assumed_absent() {
        let (rpc, prober) = prober(ProbeFailurePolicy::AssumeAbsent);
        let broken = Pubkey::new_unique();
        rpc.fail_lookups(broken);
        assert!(!prober.exists(&broken).await.unwrap());
    }

    #[tokio::test]
    async fn test_failed_probe_aborts_under_abort_policy() {
        let (rpc, prober) = prober(ProbeFailurePolicy::Abort);
        let broken = Pubkey::new_unique();
        rpc.fail_lookups(broken);
        assert!(matches!(
            prober.exists(&broken).await,
            Err(SdkError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_ensure_owned_account_creates_once() {
        let (rpc, prober) = prober(ProbeFailurePolicy::AssumeAbsent);
        let owner = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let mut plan = InstructionSet::new();

        prober
            .ensure_owned_account(&mut plan, &owner, &owner, &mint)
            .await
            .unwrap();
        prober
            .ensure_owned_account(&mut plan, &owner, &owner, &mint)
            .await
            .unwrap();

        assert_eq!(plan.len(), 1);
        // Second call is answered from the plan without touching the transport
        assert_eq!(rpc.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_ensure_owned_account_skips_existing() {
        let (rpc, prober) = prober(ProbeFailurePolicy::AssumeAbsent);
        let owner = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let account = get_associated_token_address(&owner, &mint);
        rpc.add_token_account(account, 0);

        let mut plan = InstructionSet::new();
        prober
            .ensure_owned_account(&mut plan, &owner, &owner, &mint)
            .await
            .unwrap();

        assert!(plan.is_empty());
        assert!(plan.is_ensured(&account));
    }
}
