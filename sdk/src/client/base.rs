use std::sync::Arc;

use solana_sdk::{account::Account, pubkey::Pubkey};
use tracing::debug;

use crate::{
    core::{program_id, PoolInfo, PoolState, SdkError, SdkResult},
    rpc::RpcTransport,
};

/// Base RPC client wrapper for common reads
pub struct BaseClient {
    rpc: Arc<dyn RpcTransport>,
    program_id: Pubkey,
}

impl BaseClient {
    pub fn new(rpc: Arc<dyn RpcTransport>) -> Self {
        Self {
            rpc,
            program_id: program_id(),
        }
    }

    pub fn with_program_id(rpc: Arc<dyn RpcTransport>, program_id: Pubkey) -> Self {
        Self { rpc, program_id }
    }

    /// Get the program ID
    pub fn program_id(&self) -> Pubkey {
        self.program_id
    }

    /// Fetch an account, `None` if it does not exist
    pub async fn get_account(&self, address: &Pubkey) -> SdkResult<Option<Account>> {
        self.rpc.get_account(address).await
    }

    /// Token balance in base units, `None` if the account does not exist
    pub async fn get_token_balance(&self, address: &Pubkey) -> SdkResult<Option<u64>> {
        self.rpc.get_token_balance(address).await
    }

    /// Fetch and decode a pool. Always reads fresh state.
    pub async fn fetch_pool(&self, pool: &Pubkey) -> SdkResult<PoolInfo> {
        let account = self
            .get_account(pool)
            .await?
            .ok_or_else(|| SdkError::PoolNotFound(pool.to_string()))?;

        if account.owner != self.program_id {
            return Err(SdkError::PoolNotFound(format!(
                "{} is not owned by {}",
                pool, self.program_id
            )));
        }

        Ok(PoolInfo {
            address: *pool,
            state: PoolState::try_from_account_data(&account.data)?,
        })
    }

    /// Every pool account owned by the program
    pub async fn list_pools(&self) -> SdkResult<Vec<PoolInfo>> {
        let accounts = self
            .rpc
            .get_program_accounts(&self.program_id, Some(&PoolState::DISCRIMINATOR[..]))
            .await?;

        let pools = accounts
            .into_iter()
            .filter_map(|(address, account)| {
                match PoolState::try_from_account_data(&account.data) {
                    Ok(state) => Some(PoolInfo { address, state }),
                    Err(e) => {
                        debug!("Skipping undecodable pool {}: {}", address, e);
                        None
                    }
                }
            })
            .collect::<Vec<_>>();

        debug!("Found {} pools", pools.len());
        Ok(pools)
    }
}
