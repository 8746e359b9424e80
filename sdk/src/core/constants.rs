use solana_sdk::{pubkey, pubkey::Pubkey};

/// Program ID of the constant-product AMM
pub const PROGRAM_ID: Pubkey = pubkey!("6anbDQNCcVh2f6okexjaX1VGj6tEnizJ1kV5UTBS8Zhi");

/// Get the program ID as a Pubkey
pub fn program_id() -> Pubkey {
    PROGRAM_ID
}

/// Mint of the wrapped native coin (WSOL).
///
/// Any pool side using this mint is wrapped from native lamports before the
/// AMM instruction and unwrapped back into lamports after it.
pub fn native_wrapper_mint() -> Pubkey {
    spl_token::native_mint::id()
}

/// Seeds for the AMM PDAs
pub mod seeds {
    pub const POOL: &[u8] = b"pool";
    pub const LP_MINT: &[u8] = b"lp_mint";
    pub const POOL_AUTHORITY: &[u8] = b"pool_auth";
    pub const VAULT_A: &[u8] = b"vault_a";
    pub const VAULT_B: &[u8] = b"vault_b";
}

/// Base-unit precision used when converting user-entered amounts
pub const AMOUNT_DECIMALS: u8 = 9;

/// Swap floor used when the caller gives no explicit minimum
pub const DEFAULT_MINIMUM_OUT: u64 = 1;

/// Fee parameters carried by every initialize-pool instruction
pub const DEFAULT_FEE_BPS: u16 = 30;
pub const DEFAULT_PROTOCOL_FEE_BPS: u16 = 5;
pub const MAX_BPS: u16 = 10_000;
