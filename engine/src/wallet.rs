//! Player wallet boundary.
//!
//! The wallet is an external service; the engine only ever sees it through
//! this trait. A declined operation is a normal response, not an error.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("wallet service failure: {0}")]
pub struct WalletError(pub String);

/// Outcome of a wallet operation that reached the service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalletResponse {
    pub success: bool,
    /// Authoritative balance after the operation.
    pub balance: u64,
    pub message: Option<String>,
}

impl WalletResponse {
    pub fn approved(balance: u64) -> Self {
        Self {
            success: true,
            balance,
            message: None,
        }
    }

    pub fn declined(balance: u64, message: impl Into<String>) -> Self {
        Self {
            success: false,
            balance,
            message: Some(message.into()),
        }
    }
}

/// External funds custodian. `Err` means the service itself was unreachable
/// or misbehaved; a declined debit comes back as `success: false`.
#[async_trait]
pub trait WalletGateway: Send + Sync {
    async fn debit(&self, amount: u64) -> Result<WalletResponse, WalletError>;
    async fn credit(&self, amount: u64) -> Result<WalletResponse, WalletError>;
}
