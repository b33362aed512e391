use baize_types::ChipShortfall;
use thiserror::Error;

/// Errors surfaced by the session engine.
///
/// RNG failures never appear here: they are recovered internally with a local
/// fallback draw. Every mutating operation validates before it mutates, so a
/// returned error means the ledger and game state are unchanged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The required chips are not in the inventory. No state change.
    #[error("insufficient chips (need {needed}, have {available})")]
    InsufficientChips { needed: u64, available: u64 },

    /// The wallet declined a debit. No chips were purchased.
    #[error("wallet declined debit of {amount}: {reason}")]
    InsufficientFunds { amount: u64, reason: String },

    /// The wallet call itself failed (network/service). Ledger unchanged.
    #[error("wallet service failure: {0}")]
    WalletService(String),

    /// An action was requested outside its legal state or precondition.
    /// No state transition occurs.
    #[error("{action} not allowed: {detail}")]
    IllegalAction {
        action: &'static str,
        detail: String,
    },

    /// The shoe ran out of cards mid-round. Should not occur with a full
    /// shuffled shoe; indicates a corrupted round.
    #[error("shoe exhausted")]
    ShoeExhausted,
}

impl SessionError {
    pub(crate) fn illegal(action: &'static str, detail: impl Into<String>) -> Self {
        SessionError::IllegalAction {
            action,
            detail: detail.into(),
        }
    }
}

impl From<ChipShortfall> for SessionError {
    fn from(err: ChipShortfall) -> Self {
        SessionError::InsufficientChips {
            needed: u64::from(err.needed).saturating_mul(err.denomination.value()),
            available: u64::from(err.available).saturating_mul(err.denomination.value()),
        }
    }
}
