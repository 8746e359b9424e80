use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::{pubkey::Pubkey, signature::Signature};

use crate::core::{native_wrapper_mint, SdkError, SdkResult};

/// On-chain pool record as written by `initialize_pool`
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct PoolState {
    pub mint_a: Pubkey,
    pub mint_b: Pubkey,
    pub vault_a: Pubkey,
    pub vault_b: Pubkey,
    pub lp_mint: Pubkey,
    pub pool_auth: Pubkey,
    pub fee_bps: u16,
    pub proto_fee_bps: u16,
    pub bump: u8,
}

impl PoolState {
    /// Account discriminator, `sha256("account:Pool")[..8]`
    pub const DISCRIMINATOR: [u8; 8] = [0xf1, 0x9a, 0x6d, 0x04, 0x11, 0xb1, 0x6d, 0xbc];

    /// Decode raw account data, discriminator included
    pub fn try_from_account_data(data: &[u8]) -> SdkResult<Self> {
        if data.len() < Self::DISCRIMINATOR.len() {
            return Err(SdkError::Serialization(format!(
                "pool account too short: {} bytes",
                data.len()
            )));
        }
        let (discriminator, body) = data.split_at(Self::DISCRIMINATOR.len());
        if discriminator != Self::DISCRIMINATOR {
            return Err(SdkError::Serialization(
                "account is not a pool (discriminator mismatch)".to_string(),
            ));
        }
        // Anchor accounts may carry trailing padding, so don't use try_from_slice
        let mut body = body;
        Self::deserialize(&mut body).map_err(|e| SdkError::Serialization(e.to_string()))
    }

    /// Encode the account the way the program stores it
    pub fn to_account_data(&self) -> SdkResult<Vec<u8>> {
        let mut data = Self::DISCRIMINATOR.to_vec();
        data.extend_from_slice(
            &borsh::to_vec(self).map_err(|e| SdkError::Serialization(e.to_string()))?,
        );
        Ok(data)
    }
}

/// Pool info returned to callers
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolInfo {
    pub address: Pubkey,
    pub state: PoolState,
}

impl PoolInfo {
    /// Whether either side of the pool is the wrapped native coin
    pub fn has_native_side(&self) -> bool {
        let wrapper = native_wrapper_mint();
        self.state.mint_a == wrapper || self.state.mint_b == wrapper
    }
}

/// Swap direction over a pool's (A, B) ordering
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwapDirection {
    /// Token A in, token B out
    AToB,
    /// Token B in, token A out
    BToA,
}

impl SwapDirection {
    /// (input mint, output mint) for this direction
    pub fn mints(&self, pool: &PoolState) -> (Pubkey, Pubkey) {
        match self {
            SwapDirection::AToB => (pool.mint_a, pool.mint_b),
            SwapDirection::BToA => (pool.mint_b, pool.mint_a),
        }
    }
}

/// Operations the sequencer knows how to build
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    InitPool,
    AddLiquidity,
    Swap,
    RemoveLiquidity,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Operation::InitPool => "init-pool",
            Operation::AddLiquidity => "add-liquidity",
            Operation::Swap => "swap",
            Operation::RemoveLiquidity => "remove-liquidity",
        };
        f.write_str(name)
    }
}

/// Diagnostics from a transaction simulation
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SimulationReport {
    pub err: Option<String>,
    pub logs: Vec<String>,
    pub units_consumed: Option<u64>,
}

impl SimulationReport {
    pub fn succeeded(&self) -> bool {
        self.err.is_none()
    }
}

/// Result of a submitted operation
#[derive(Clone, Debug)]
pub struct OperationReceipt {
    pub operation: Operation,
    pub signature: Signature,
    pub pool: Pubkey,
    pub instruction_count: usize,
    /// `None` when the simulation request itself failed
    pub simulation: Option<SimulationReport>,
    /// True when wrapped native coin was closed back into lamports
    pub unwrapped_native: bool,
}

/// Inputs for creating a pool; mints are base58 strings in either order
#[derive(Clone, Debug)]
pub struct InitPoolRequest {
    pub mint_a: String,
    pub mint_b: String,
}

/// Inputs for a deposit; amounts are human-readable decimal strings
#[derive(Clone, Debug)]
pub struct AddLiquidityRequest {
    pub pool: Option<Pubkey>,
    pub amount_a: String,
    pub amount_b: String,
}

/// Inputs for a swap
#[derive(Clone, Debug)]
pub struct SwapRequest {
    pub pool: Option<Pubkey>,
    pub direction: SwapDirection,
    pub amount_in: String,
    /// Slippage floor; defaults to one base unit when absent
    pub minimum_out: Option<String>,
}

/// Inputs for a full withdrawal
#[derive(Clone, Debug)]
pub struct RemoveLiquidityRequest {
    pub pool: Option<Pubkey>,
}
