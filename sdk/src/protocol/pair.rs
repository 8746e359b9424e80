//! Canonical ordering of an unordered mint pair

use std::str::FromStr;

use solana_sdk::pubkey::Pubkey;

use crate::core::{SdkError, SdkResult};

/// Parse a base58 mint address
pub fn parse_asset_id(value: &str) -> SdkResult<Pubkey> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SdkError::InvalidInput("empty mint address".to_string()));
    }
    Pubkey::from_str(trimmed)
        .map_err(|e| SdkError::InvalidInput(format!("invalid mint address {}: {}", trimmed, e)))
}

/// Order two distinct mints ascending by bytes.
///
/// `normalize(a, b) == normalize(b, a)` for every pair.
pub fn normalize(a: Pubkey, b: Pubkey) -> SdkResult<(Pubkey, Pubkey)> {
    if a == b {
        return Err(SdkError::InvalidInput(format!(
            "token A and token B must be different (both {})",
            a
        )));
    }
    if a < b {
        Ok((a, b))
    } else {
        Ok((b, a))
    }
}

/// A normalized pair of distinct mints
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TokenPair {
    mint_a: Pubkey,
    mint_b: Pubkey,
}

impl TokenPair {
    pub fn new(a: Pubkey, b: Pubkey) -> SdkResult<Self> {
        let (mint_a, mint_b) = normalize(a, b)?;
        Ok(Self { mint_a, mint_b })
    }

    pub fn mint_a(&self) -> Pubkey {
        self.mint_a
    }

    pub fn mint_b(&self) -> Pubkey {
        self.mint_b
    }
}
