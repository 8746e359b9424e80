use async_trait::async_trait;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    transaction::Transaction,
};

use crate::core::{SdkError, SdkResult};

/// A wallet able to sign transactions on behalf of one pubkey.
///
/// Implementations may prompt a human; declining must surface as
/// [`SdkError::UserRejected`].
#[async_trait]
pub trait SigningIdentity: Send + Sync {
    fn pubkey(&self) -> Pubkey;

    /// Add this identity's signature to `transaction`
    async fn sign_transaction(&self, transaction: &mut Transaction) -> SdkResult<()>;
}

#[async_trait]
impl SigningIdentity for Keypair {
    fn pubkey(&self) -> Pubkey {
        Signer::pubkey(self)
    }

    async fn sign_transaction(&self, transaction: &mut Transaction) -> SdkResult<()> {
        let blockhash = transaction.message.recent_blockhash;
        transaction
            .try_partial_sign(&[self], blockhash)
            .map_err(|e| SdkError::Signing(e.to_string()))
    }
}
