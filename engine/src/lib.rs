//! Baize table-game session engine.
//!
//! This crate contains the chip-economy ledger and the two stateful table-game
//! protocols (roulette spin resolution, blackjack hand play) behind a common
//! session orchestrator.
//!
//! ## Determinism requirements
//! - Round randomness derives only from the seed supplied by the RNG
//!   collaborator; the local fallback draw is used solely when that
//!   collaborator fails or times out.
//! - No wall-clock time inside settlement logic; pacing delays live in the
//!   orchestrator and are cancellable.
//!
//! ## Ledger invariants
//! - Chip counts never go negative; removal is precondition-checked.
//! - `total_chip_value() + balance` changes only through wallet responses and
//!   round settlements, never spontaneously.
//!
//! The primary entrypoint is [`SessionOrchestrator`].

pub mod bets;
pub mod blackjack;
pub mod cards;
pub mod config;
pub mod ledger;
pub mod pacing;
pub mod rng;
pub mod roulette;
pub mod session;
pub mod store;
pub mod wallet;

mod error;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

#[cfg(test)]
mod integration_tests;

pub use bets::{Bet, BetKind, BetRegistry, RoundSettlement};
pub use blackjack::{
    BlackjackEngine, BlackjackPhase, DealerStep, HandStatus, RoundSummary, TurnFlow,
};
pub use cards::{Card, Hand, Rank, Shoe, Suit};
pub use config::{BlackjackRules, PacingConfig, TableConfig, TimeoutConfig};
pub use error::SessionError;
pub use ledger::ChipEconomyLedger;
pub use pacing::{cancel_pair, pause, CancelHandle, CancelToken};
pub use rng::{GameRng, RngProvider, RngProviderError, RngSeed};
pub use roulette::{RouletteEngine, RoulettePhase};
pub use session::{GameEngine, SessionOrchestrator};
pub use store::{SessionStore, StoreError};
pub use wallet::{WalletError, WalletGateway, WalletResponse};
