//! Blockhash, simulate, sign, send

use std::sync::Arc;

use solana_sdk::{instruction::Instruction, signature::Signature, transaction::Transaction};
use tracing::{debug, info, warn};

use crate::{
    core::{SdkError, SdkResult, SimulationReport},
    rpc::{RpcTransport, SigningIdentity},
};

/// Outcome of a submitted transaction
#[derive(Clone, Debug)]
pub struct Submission {
    pub signature: Signature,
    /// `None` when the simulation request itself failed
    pub simulation: Option<SimulationReport>,
}

/// Turns an ordered instruction list into one submitted transaction.
///
/// Network failures are not retried; each call ends in a single success or
/// failure.
pub struct TransactionPipeline {
    rpc: Arc<dyn RpcTransport>,
}

impl TransactionPipeline {
    pub fn new(rpc: Arc<dyn RpcTransport>) -> Self {
        Self { rpc }
    }

    /// Submit `instructions` paid and signed by `fee_payer`
    pub async fn submit(
        &self,
        instructions: &[Instruction],
        fee_payer: &dyn SigningIdentity,
    ) -> SdkResult<Signature> {
        Ok(self.execute(instructions, fee_payer).await?.signature)
    }

    /// Submit and keep the simulation diagnostics
    pub async fn execute(
        &self,
        instructions: &[Instruction],
        fee_payer: &dyn SigningIdentity,
    ) -> SdkResult<Submission> {
        if instructions.is_empty() {
            return Err(SdkError::Validation(
                "refusing to submit an empty transaction".to_string(),
            ));
        }

        let payer = fee_payer.pubkey();
        let blockhash = self.rpc.get_latest_blockhash().await?;
        let mut transaction = Transaction::new_with_payer(instructions, Some(&payer));
        transaction.message.recent_blockhash = blockhash;
        debug!(
            "Assembled transaction with {} instructions, payer {}",
            instructions.len(),
            payer
        );

        let simulation = self.simulate(&transaction).await;

        fee_payer.sign_transaction(&mut transaction).await?;
        let signature = self.rpc.send_transaction(&transaction).await?;
        info!("Transaction submitted: {}", signature);

        Ok(Submission {
            signature,
            simulation,
        })
    }

    /// Simulation never blocks submission; problems are only logged
    async fn simulate(&self, transaction: &Transaction) -> Option<SimulationReport> {
        match self.rpc.simulate_transaction(transaction).await {
            Ok(report) => {
                for line in &report.logs {
                    debug!("sim: {}", line);
                }
                match &report.err {
                    Some(err) => warn!("Simulation failed: {}", err),
                    None => debug!(
                        "Simulation succeeded ({} units)",
                        report.units_consumed.unwrap_or_default()
                    ),
                }
                Some(report)
            }
            Err(e) => {
                warn!("Simulation unavailable: {}", e);
                None
            }
        }
    }
}
