//! Ordered instruction plans produced by the sequencers

use std::collections::HashSet;
use std::fmt;

use solana_sdk::{instruction::Instruction, pubkey::Pubkey};
use tracing::debug;

use crate::{
    core::{Operation, SdkError, SdkResult},
    instructions::AmmInstruction,
};

/// What a planned instruction does
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InstructionKind {
    /// Create `owner`'s associated token account for `mint`
    CreateOwnedAccount { account: Pubkey, mint: Pubkey },
    /// Move native lamports into a wrapped-native account
    NativeTransfer { account: Pubkey, lamports: u64 },
    SyncNative { account: Pubkey },
    CloseAccount { account: Pubkey },
    /// One of the AMM program's own instructions
    Amm(AmmInstruction),
}

impl fmt::Display for InstructionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstructionKind::CreateOwnedAccount { account, mint } => {
                write!(f, "create token account {} (mint {})", account, mint)
            }
            InstructionKind::NativeTransfer { account, lamports } => {
                write!(f, "transfer {} lamports to {}", lamports, account)
            }
            InstructionKind::SyncNative { account } => write!(f, "sync native {}", account),
            InstructionKind::CloseAccount { account } => write!(f, "close {}", account),
            InstructionKind::Amm(AmmInstruction::InitializePool(p)) => write!(
                f,
                "initialize pool (fee {} bps, protocol fee {} bps)",
                p.fee_bps, p.proto_fee_bps
            ),
            InstructionKind::Amm(AmmInstruction::AddLiquidity(p)) => {
                write!(f, "add liquidity ({} / {})", p.amount_a, p.amount_b)
            }
            InstructionKind::Amm(AmmInstruction::SwapToken(p)) => {
                write!(f, "swap {} (min out {})", p.amount_in, p.minimum_out)
            }
            InstructionKind::Amm(AmmInstruction::RemoveLiquidity(p)) => {
                write!(f, "remove liquidity ({} LP)", p.lp_amount)
            }
        }
    }
}

/// An instruction together with its decoded meaning
#[derive(Clone, Debug)]
pub struct PlannedInstruction {
    pub kind: InstructionKind,
    pub instruction: Instruction,
}

/// Ordered instructions for a single atomic transaction.
///
/// Order is significant and is preserved all the way to submission. The set
/// also remembers which owned accounts were already ensured so a later phase
/// never probes or creates the same account twice.
#[derive(Clone, Debug, Default)]
pub struct InstructionSet {
    entries: Vec<PlannedInstruction>,
    ensured: HashSet<Pubkey>,
}

impl InstructionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an instruction
    pub fn push(&mut self, kind: InstructionKind, instruction: Instruction) {
        debug!("Planned: {}", kind);
        if let InstructionKind::CreateOwnedAccount { account, .. } = &kind {
            self.ensured.insert(*account);
        }
        self.entries.push(PlannedInstruction { kind, instruction });
    }

    /// Append an AMM program instruction, labelled by decoding its data
    pub fn push_amm(&mut self, instruction: Instruction) -> SdkResult<()> {
        let decoded = AmmInstruction::decode(&instruction.data).ok_or_else(|| {
            SdkError::Serialization("instruction data is not an AMM instruction".to_string())
        })?;
        self.push(InstructionKind::Amm(decoded), instruction);
        Ok(())
    }

    /// Record an account confirmed to exist on-chain
    pub fn mark_ensured(&mut self, account: Pubkey) {
        self.ensured.insert(account);
    }

    /// Whether `account` is known to exist or is already scheduled for creation
    pub fn is_ensured(&self, account: &Pubkey) -> bool {
        self.ensured.contains(account)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[PlannedInstruction] {
        &self.entries
    }

    pub fn kinds(&self) -> Vec<&InstructionKind> {
        self.entries.iter().map(|e| &e.kind).collect()
    }

    pub fn instructions(&self) -> Vec<Instruction> {
        self.entries.iter().map(|e| e.instruction.clone()).collect()
    }

    /// Whether the set closes a wrapped-native account
    pub fn closes_account(&self) -> bool {
        self.entries
            .iter()
            .any(|e| matches!(e.kind, InstructionKind::CloseAccount { .. }))
    }
}

/// A fully sequenced operation, ready for the pipeline
#[derive(Clone, Debug)]
pub struct OperationPlan {
    pub operation: Operation,
    pub pool: Pubkey,
    pub instructions: InstructionSet,
}

impl OperationPlan {
    pub fn new(operation: Operation, pool: Pubkey, instructions: InstructionSet) -> Self {
        Self {
            operation,
            pool,
            instructions,
        }
    }

    /// Whether executing the plan returns wrapped native coin to lamports
    pub fn unwraps_native(&self) -> bool {
        self.instructions.closes_account()
    }
}
