//! Encoders for the AMM program's own instructions.
//!
//! Each instruction is an 8-byte discriminator (`sha256("global:<name>")[..8]`)
//! followed by the borsh-encoded params, with accounts in program order.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::{instruction::Instruction, pubkey::Pubkey, system_program};

use crate::{
    core::SdkResult,
    impl_instruction,
    instructions::{AmmInstructionBuilder, InstructionBuilder},
    protocol::{PoolAddresses, TokenPair},
};

// Instruction discriminators
const INITIALIZE_POOL_DISCRIMINATOR: [u8; 8] = [0x5f, 0xb4, 0x0a, 0xac, 0x54, 0xae, 0xe8, 0x28];
const ADD_LIQUIDITY_DISCRIMINATOR: [u8; 8] = [0xb5, 0x9d, 0x59, 0x43, 0x8f, 0xb6, 0x34, 0x48];
const SWAP_TOKEN_DISCRIMINATOR: [u8; 8] = [0x81, 0xb9, 0x34, 0x7d, 0x80, 0x2a, 0x54, 0xe3];
const REMOVE_LIQUIDITY_DISCRIMINATOR: [u8; 8] = [0x50, 0x55, 0xd1, 0x48, 0x18, 0xce, 0xb1, 0x6c];

/// Parameters for initializing a pool
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct InitializePoolParams {
    pub fee_bps: u16,
    pub proto_fee_bps: u16,
}

impl_instruction!(InitializePoolParams, INITIALIZE_POOL_DISCRIMINATOR);

/// Parameters for adding liquidity
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct AddLiquidityParams {
    pub amount_a: u64,
    pub amount_b: u64,
}

impl_instruction!(AddLiquidityParams, ADD_LIQUIDITY_DISCRIMINATOR);

/// Parameters for a swap
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct SwapTokenParams {
    pub amount_in: u64,
    pub minimum_out: u64,
}

impl_instruction!(SwapTokenParams, SWAP_TOKEN_DISCRIMINATOR);

/// Parameters for removing liquidity
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct RemoveLiquidityParams {
    pub lp_amount: u64,
}

impl_instruction!(RemoveLiquidityParams, REMOVE_LIQUIDITY_DISCRIMINATOR);

/// A decoded AMM instruction
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AmmInstruction {
    InitializePool(InitializePoolParams),
    AddLiquidity(AddLiquidityParams),
    SwapToken(SwapTokenParams),
    RemoveLiquidity(RemoveLiquidityParams),
}

impl AmmInstruction {
    /// Decode instruction data produced by [`AmmInstructions`]
    pub fn decode(data: &[u8]) -> Option<Self> {
        if data.len() < 8 {
            return None;
        }
        let (discriminator, mut body) = data.split_at(8);
        let decoded = match <[u8; 8]>::try_from(discriminator).ok()? {
            INITIALIZE_POOL_DISCRIMINATOR => {
                AmmInstruction::InitializePool(BorshDeserialize::deserialize(&mut body).ok()?)
            }
            ADD_LIQUIDITY_DISCRIMINATOR => {
                AmmInstruction::AddLiquidity(BorshDeserialize::deserialize(&mut body).ok()?)
            }
            SWAP_TOKEN_DISCRIMINATOR => {
                AmmInstruction::SwapToken(BorshDeserialize::deserialize(&mut body).ok()?)
            }
            REMOVE_LIQUIDITY_DISCRIMINATOR => {
                AmmInstruction::RemoveLiquidity(BorshDeserialize::deserialize(&mut body).ok()?)
            }
            _ => return None,
        };
        Some(decoded)
    }
}

/// Accounts shared by the liquidity and swap instructions
#[derive(Clone, Copy, Debug)]
pub struct UserPoolAccounts {
    pub user: Pubkey,
    pub user_ata_a: Pubkey,
    pub user_ata_b: Pubkey,
}

/// Instruction encoder bound to one AMM program id
pub struct AmmInstructions {
    program_id: Pubkey,
}

impl AmmInstructions {
    pub fn new(program_id: Pubkey) -> Self {
        Self { program_id }
    }

    /// Build initialize pool instruction
    pub fn initialize_pool(
        &self,
        initializer: Pubkey,
        pair: &TokenPair,
        addresses: &PoolAddresses,
        params: InitializePoolParams,
    ) -> SdkResult<Instruction> {
        Ok(AmmInstructionBuilder::new(self.program_id)
            .add_signer(initializer)
            .add_readonly(pair.mint_a())
            .add_readonly(pair.mint_b())
            .add_writable(addresses.pool)
            .add_writable(addresses.lp_mint)
            .add_writable(addresses.vault_a)
            .add_writable(addresses.vault_b)
            .add_readonly(addresses.pool_auth)
            .add_readonly(system_program::id())
            .add_readonly(spl_token::id())
            .with_data(params.build_data()?)
            .build())
    }

    /// Build add liquidity instruction
    pub fn add_liquidity(
        &self,
        user: &UserPoolAccounts,
        user_lp_ata: Pubkey,
        addresses: &PoolAddresses,
        params: AddLiquidityParams,
    ) -> SdkResult<Instruction> {
        Ok(AmmInstructionBuilder::new(self.program_id)
            .add_signer(user.user)
            .add_writable(addresses.pool)
            .add_writable(addresses.vault_a)
            .add_writable(addresses.vault_b)
            .add_writable(addresses.lp_mint)
            .add_readonly(addresses.pool_auth)
            .add_writable(user.user_ata_a)
            .add_writable(user.user_ata_b)
            .add_writable(user_lp_ata)
            .add_readonly(spl_token::id())
            .with_data(params.build_data()?)
            .build())
    }

    /// Build swap instruction
    pub fn swap_token(
        &self,
        user: &UserPoolAccounts,
        addresses: &PoolAddresses,
        params: SwapTokenParams,
    ) -> SdkResult<Instruction> {
        Ok(AmmInstructionBuilder::new(self.program_id)
            .add_signer(user.user)
            .add_writable(addresses.pool)
            .add_writable(addresses.vault_a)
            .add_writable(addresses.vault_b)
            .add_writable(user.user_ata_a)
            .add_writable(user.user_ata_b)
            .add_readonly(addresses.pool_auth)
            .add_readonly(spl_token::id())
            .with_data(params.build_data()?)
            .build())
    }

    /// Build remove liquidity instruction
    pub fn remove_liquidity(
        &self,
        user: &UserPoolAccounts,
        user_lp_ata: Pubkey,
        addresses: &PoolAddresses,
        params: RemoveLiquidityParams,
    ) -> SdkResult<Instruction> {
        Ok(AmmInstructionBuilder::new(self.program_id)
            .add_signer(user.user)
            .add_writable(addresses.pool)
            .add_writable(addresses.vault_a)
            .add_writable(addresses.vault_b)
            .add_writable(user.user_ata_a)
            .add_writable(user.user_ata_b)
            .add_writable(user_lp_ata)
            .add_writable(addresses.lp_mint)
            .add_readonly(addresses.pool_auth)
            .add_readonly(spl_token::id())
            .with_data(params.build_data()?)
            .build())
    }
}
