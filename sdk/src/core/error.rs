//! SDK error types

use solana_program::program_error::ProgramError;
use thiserror::Error;

/// SDK error type
#[derive(Error, Debug)]
pub enum SdkError {
    /// Malformed, missing or non-positive user input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Duplicate or malformed asset identifiers
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No signing identity is connected
    #[error("Wallet not connected")]
    Unauthenticated,

    /// Nothing to withdraw
    #[error("Insufficient balance: {0}")]
    InsufficientBalance(String),

    /// The signing identity declined the transaction
    #[error("Transaction rejected by signer")]
    UserRejected,

    /// RPC or network failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Simulation reported an error
    #[error("Simulation failed: {0}")]
    SimulationFailed(String),

    /// Pool account does not exist
    #[error("Pool not found: {0}")]
    PoolNotFound(String),

    /// Serialization or account decoding error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Signer could not produce a signature
    #[error("Signing error: {0}")]
    Signing(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Another operation is still running on this client
    #[error("Another operation is already in flight")]
    OperationInFlight,
}

impl SdkError {
    /// Errors that are final feedback to the user rather than infrastructure failures
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            SdkError::Validation(_)
                | SdkError::InvalidInput(_)
                | SdkError::Unauthenticated
                | SdkError::InsufficientBalance(_)
                | SdkError::UserRejected
                | SdkError::OperationInFlight
        )
    }
}

impl From<std::io::Error> for SdkError {
    fn from(err: std::io::Error) -> Self {
        SdkError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for SdkError {
    fn from(err: serde_json::Error) -> Self {
        SdkError::Serialization(err.to_string())
    }
}

impl From<ureq::Error> for SdkError {
    fn from(err: ureq::Error) -> Self {
        SdkError::Transport(err.to_string())
    }
}

impl From<ProgramError> for SdkError {
    fn from(err: ProgramError) -> Self {
        SdkError::Serialization(err.to_string())
    }
}

pub type SdkResult<T> = Result<T, SdkError>;
