//! Collaborator seams: the RPC transport and the signing identity.
//!
//! The sequencers only talk to the network through [`RpcTransport`] and only
//! obtain signatures through [`SigningIdentity`], so every operation can be
//! driven against `testing::MockTransport` without a live cluster.

pub mod light;
pub mod signer;

use async_trait::async_trait;
use solana_sdk::{
    account::Account, hash::Hash, pubkey::Pubkey, signature::Signature, transaction::Transaction,
};

use crate::core::{SdkResult, SimulationReport};

pub use light::LightRpcClient;
pub use signer::SigningIdentity;

/// Read/write access to a Solana cluster
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Fetch an account, `None` when it does not exist
    async fn get_account(&self, address: &Pubkey) -> SdkResult<Option<Account>>;

    /// Token balance in base units, `None` when the token account does not exist
    async fn get_token_balance(&self, address: &Pubkey) -> SdkResult<Option<u64>>;

    /// Recent blockhash to anchor a transaction
    async fn get_latest_blockhash(&self) -> SdkResult<Hash>;

    /// Simulate without signature verification
    async fn simulate_transaction(&self, transaction: &Transaction) -> SdkResult<SimulationReport>;

    /// Submit a signed transaction
    async fn send_transaction(&self, transaction: &Transaction) -> SdkResult<Signature>;

    /// All accounts owned by `program_id` whose data starts with `prefix`
    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        prefix: Option<&[u8]>,
    ) -> SdkResult<Vec<(Pubkey, Account)>>;
}
