// Keypair signer that asks on stdin before every signature

use std::io::{self, BufRead, Write};

use amm_sdk::{SdkError, SdkResult, SigningIdentity};
use async_trait::async_trait;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    transaction::Transaction,
};

pub struct ConfirmingSigner {
    keypair: Keypair,
}

impl ConfirmingSigner {
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }
}

/// Only an explicit "y" approves
pub fn is_approval(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

#[async_trait]
impl SigningIdentity for ConfirmingSigner {
    fn pubkey(&self) -> Pubkey {
        Signer::pubkey(&self.keypair)
    }

    async fn sign_transaction(&self, transaction: &mut Transaction) -> SdkResult<()> {
        let summary = format!(
            "Sign transaction with {} instructions as {}? [y/N] ",
            transaction.message.instructions.len(),
            Signer::pubkey(&self.keypair)
        );

        let answer = tokio::task::spawn_blocking(move || -> io::Result<String> {
            let mut stderr = io::stderr();
            stderr.write_all(summary.as_bytes())?;
            stderr.flush()?;
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            Ok(line)
        })
        .await
        .map_err(|e| SdkError::Signing(format!("prompt failed: {}", e)))?
        .map_err(|e| SdkError::Signing(format!("prompt failed: {}", e)))?;

        if !is_approval(&answer) {
            return Err(SdkError::UserRejected);
        }
        SigningIdentity::sign_transaction(&self.keypair, transaction).await
    }
}
