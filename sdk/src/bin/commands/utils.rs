// Utility functions for CLI commands

use std::str::FromStr;

use amm_sdk::{
    core::{OperationReceipt, PoolInfo},
    OperationPlan, SdkError,
};
use anyhow::{Context, Result};
use solana_sdk::{
    pubkey::Pubkey,
    signature::{read_keypair_file, Keypair},
};

/// Load a keypair from a file path, expanding ~ if needed
pub fn load_keypair(path: &str) -> Result<Keypair> {
    let expanded_path = if path.starts_with('~') {
        let home = std::env::var("HOME").context("HOME environment variable not set")?;
        path.replacen('~', &home, 1)
    } else {
        path.to_string()
    };

    read_keypair_file(&expanded_path)
        .map_err(|e| anyhow::anyhow!("Failed to load keypair from {}: {}", expanded_path, e))
}

/// Parse a pubkey from string
pub fn parse_pubkey(s: &str) -> Result<Pubkey> {
    Pubkey::from_str(s).with_context(|| format!("Invalid public key: {}", s))
}

/// Print success message with checkmark
pub fn success(msg: &str) {
    println!("[OK] {}", msg);
}

/// Print info message
pub fn info(msg: &str) {
    println!("[INFO] {}", msg);
}

/// Print warning message
pub fn warn(msg: &str) {
    eprintln!("[WARN] {}", msg);
}

/// Render a failed command: user feedback as one line, anything else with its cause chain
pub fn error_report(err: &anyhow::Error) -> String {
    let user_facing = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<SdkError>())
        .is_some_and(SdkError::is_user_facing);

    if user_facing {
        format!("{:#}", err)
    } else {
        format!("{:?}", err)
    }
}

pub fn print_plan(plan: &OperationPlan) {
    info(&format!(
        "{} on pool {} ({} instructions)",
        plan.operation,
        plan.pool,
        plan.instructions.len()
    ));
    for (i, entry) in plan.instructions.entries().iter().enumerate() {
        println!("  {:>2}. {}", i + 1, entry.kind);
    }
}

pub fn print_receipt(receipt: &OperationReceipt) {
    if let Some(report) = &receipt.simulation {
        if let Some(err) = &report.err {
            warn(&format!("Simulation reported an error before submission: {}", err));
        }
    }
    success(&format!("{} submitted: {}", receipt.operation, receipt.signature));
    println!("  Pool:         {}", receipt.pool);
    println!("  Instructions: {}", receipt.instruction_count);
    if receipt.unwrapped_native {
        println!("  Wrapped SOL returned to the wallet");
    }
}

pub fn print_pool(pool: &PoolInfo) {
    println!("Pool {}", pool.address);
    println!("  Mint A:        {}", pool.state.mint_a);
    println!("  Mint B:        {}", pool.state.mint_b);
    println!("  Vault A:       {}", pool.state.vault_a);
    println!("  Vault B:       {}", pool.state.vault_b);
    println!("  LP mint:       {}", pool.state.lp_mint);
    println!("  Authority:     {}", pool.state.pool_auth);
    println!(
        "  Fee:           {} bps (protocol {} bps)",
        pool.state.fee_bps, pool.state.proto_fee_bps
    );
    if pool.has_native_side() {
        println!("  Native side:   wrapped SOL");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_feedback_is_one_line() {
        let err = anyhow::Error::new(SdkError::InsufficientBalance(
            "no LP tokens to withdraw".to_string(),
        ))
        .context("remove liquidity");
        assert_eq!(
            error_report(&err),
            "remove liquidity: Insufficient balance: no LP tokens to withdraw"
        );

        let err = anyhow::Error::new(SdkError::UserRejected);
        assert!(!error_report(&err).contains('\n'));
    }

    #[test]
    fn test_infrastructure_failure_keeps_cause_chain() {
        let err = anyhow::Error::new(SdkError::Transport("connection refused".to_string()))
            .context("fetch pool");
        let report = error_report(&err);
        assert!(report.starts_with("fetch pool"));
        assert!(report.contains("Caused by"));
        assert!(report.contains("connection refused"));
    }
}
