//! Native coin wrap/unwrap planning

use std::sync::Arc;

use solana_sdk::pubkey::Pubkey;
use spl_associated_token_account::get_associated_token_address;
use tracing::debug;

use crate::{
    client::{AccountProber, InstructionKind, InstructionSet},
    core::{native_wrapper_mint, SdkResult},
    instructions::{close_account, native_transfer, sync_native},
};

/// Emits the wrap-in and unwrap-out steps around an AMM instruction
pub struct WrapPlanner {
    prober: Arc<AccountProber>,
    wrapper_mint: Pubkey,
}

impl WrapPlanner {
    pub fn new(prober: Arc<AccountProber>) -> Self {
        Self {
            prober,
            wrapper_mint: native_wrapper_mint(),
        }
    }

    pub fn is_wrapper(&self, mint: &Pubkey) -> bool {
        *mint == self.wrapper_mint
    }

    /// Fund `owner`'s wrapped-native account with `lamports` when `mint` is the wrapper.
    ///
    /// Emits create (if absent), transfer, sync in that order. Returns whether
    /// anything was planned.
    pub async fn plan_wrap_in(
        &self,
        plan: &mut InstructionSet,
        owner: &Pubkey,
        mint: &Pubkey,
        lamports: u64,
    ) -> SdkResult<bool> {
        if !self.is_wrapper(mint) {
            return Ok(false);
        }

        let account = get_associated_token_address(owner, mint);
        debug!("Wrapping {} lamports into {}", lamports, account);

        self.prober
            .ensure_owned_account(plan, owner, owner, mint)
            .await?;
        plan.push(
            InstructionKind::NativeTransfer { account, lamports },
            native_transfer(owner, &account, lamports),
        );
        plan.push(InstructionKind::SyncNative { account }, sync_native(&account)?);
        Ok(true)
    }

    /// Drain `owner`'s wrapped-native account back to lamports when `mint` is the wrapper.
    ///
    /// Must be planned after the AMM instruction that pays into the account.
    pub fn plan_unwrap_out(
        &self,
        plan: &mut InstructionSet,
        owner: &Pubkey,
        mint: &Pubkey,
    ) -> SdkResult<bool> {
        if !self.is_wrapper(mint) {
            return Ok(false);
        }

        let account = get_associated_token_address(owner, mint);
        debug!("Unwrapping {} back to {}", account, owner);

        plan.push(InstructionKind::SyncNative { account }, sync_native(&account)?);
        plan.push(
            InstructionKind::CloseAccount { account },
            close_account(&account, owner, owner)?,
        );
        Ok(true)
    }
}
