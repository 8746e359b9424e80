//! AMM Client SDK
//!
//! Turns high-level pool actions into ordered, fully resolved instruction
//! sets for the constant-product AMM program and submits them. Provides:
//! - Deterministic pool and vault address derivation
//! - Account probing and owned token account creation
//! - Native coin wrap/unwrap around the AMM call
//! - Simulate, sign and send in one pipeline

pub mod client;
pub mod config;
pub mod core;
pub mod instructions;
pub mod protocol;
pub mod rpc;
pub mod testing;

pub use client::{AmmClient, InstructionKind, InstructionSet, OperationPlan, ProbeFailurePolicy};
pub use config::SdkConfig;
pub use core::{
    AddLiquidityRequest, InitPoolRequest, OperationReceipt, PoolInfo, PoolState,
    RemoveLiquidityRequest, SdkError, SdkResult, SwapDirection, SwapRequest,
};
pub use rpc::{LightRpcClient, RpcTransport, SigningIdentity};
