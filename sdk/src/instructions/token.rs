//! SPL token and system instructions used around the AMM call

use solana_sdk::{instruction::Instruction, pubkey::Pubkey, system_instruction};
use spl_associated_token_account::instruction::create_associated_token_account;

use crate::core::SdkResult;

/// Create `owner`'s associated token account for `mint`, paid by `payer`
pub fn create_owned_account(payer: &Pubkey, owner: &Pubkey, mint: &Pubkey) -> Instruction {
    create_associated_token_account(payer, owner, mint, &spl_token::id())
}

/// Move native lamports into a wrapped-native token account
pub fn native_transfer(from: &Pubkey, to: &Pubkey, lamports: u64) -> Instruction {
    system_instruction::transfer(from, to, lamports)
}

/// Reconcile a wrapped-native account's lamports into its token balance
pub fn sync_native(account: &Pubkey) -> SdkResult<Instruction> {
    Ok(spl_token::instruction::sync_native(&spl_token::id(), account)?)
}

/// Close a token account, returning its lamports to `destination`
pub fn close_account(
    account: &Pubkey,
    destination: &Pubkey,
    owner: &Pubkey,
) -> SdkResult<Instruction> {
    Ok(spl_token::instruction::close_account(
        &spl_token::id(),
        account,
        destination,
        owner,
        &[],
    )?)
}
