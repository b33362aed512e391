//! Per-table session shell.
//!
//! The orchestrator owns the ledger and the collaborator handles; game
//! engines compose with it rather than inheriting shared behavior. It is the
//! only place that talks to the wallet, the RNG provider, and the store.
//!
//! Pacing pauses (dealer draws, end-of-round resets) run against this
//! session's cancellation token, so closing the session stops any pending
//! sequence before it can touch the ledger again.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

use crate::bets::{BetKind, RoundSettlement};
use crate::blackjack::{BlackjackEngine, DealerStep, RoundSummary, TurnFlow};
use crate::cards::Shoe;
use crate::config::TableConfig;
use crate::error::SessionError;
use crate::ledger::ChipEconomyLedger;
use crate::pacing::{cancel_pair, pause, CancelHandle, CancelToken};
use crate::rng::{round_rng, GameRng, RngProvider};
use crate::roulette::RouletteEngine;
use crate::store::SessionStore;
use crate::wallet::{WalletGateway, WalletResponse};
use baize_types::{
    Denomination, GameKind, PlayerAction, RoundOutcome, SessionEvent, SessionSnapshot,
};

/// The capability every table game exposes to the session shell.
pub trait GameEngine {
    fn kind(&self) -> GameKind;

    /// Return staged wagers to the ledger; legal only between rounds.
    fn reset_bets(&mut self, ledger: &mut ChipEconomyLedger) -> Result<u64, SessionError>;
}

impl GameEngine for RouletteEngine {
    fn kind(&self) -> GameKind {
        GameKind::Roulette
    }

    fn reset_bets(&mut self, ledger: &mut ChipEconomyLedger) -> Result<u64, SessionError> {
        self.clear_bets(ledger)
    }
}

impl GameEngine for BlackjackEngine {
    fn kind(&self) -> GameKind {
        GameKind::Blackjack
    }

    fn reset_bets(&mut self, ledger: &mut ChipEconomyLedger) -> Result<u64, SessionError> {
        BlackjackEngine::reset_bets(self, ledger)
    }
}

pub struct SessionOrchestrator<G: GameEngine> {
    table_id: String,
    config: TableConfig,
    engine: G,
    ledger: ChipEconomyLedger,
    wallet: Arc<dyn WalletGateway>,
    rng: Arc<dyn RngProvider>,
    store: Arc<dyn SessionStore>,
    events: mpsc::UnboundedSender<SessionEvent>,
    selected: Denomination,
    wallet_in_flight: bool,
    cancel: CancelHandle,
    token: CancelToken,
}

impl<G: GameEngine> SessionOrchestrator<G> {
    /// Open a session, restoring any persisted ledger state for this table.
    /// A load failure starts the session empty rather than refusing it.
    pub async fn start(
        table_id: impl Into<String>,
        config: TableConfig,
        engine: G,
        wallet: Arc<dyn WalletGateway>,
        rng: Arc<dyn RngProvider>,
        store: Arc<dyn SessionStore>,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let table_id = table_id.into();
        let snapshot = match store.load(&table_id).await {
            Ok(found) => found.unwrap_or_default(),
            Err(err) => {
                warn!(%table_id, %err, "failed to load session state, starting empty");
                SessionSnapshot::default()
            }
        };
        info!(
            %table_id,
            balance = snapshot.balance,
            chip_value = snapshot.chips.total_value(),
            "session opened"
        );
        let (events, receiver) = mpsc::unbounded_channel();
        let (cancel, token) = cancel_pair();
        let session = Self {
            table_id,
            config,
            engine,
            ledger: ChipEconomyLedger::from_snapshot(snapshot),
            wallet,
            rng,
            store,
            events,
            selected: Denomination::One,
            wallet_in_flight: false,
            cancel,
            token,
        };
        (session, receiver)
    }

    pub fn game(&self) -> GameKind {
        self.engine.kind()
    }

    pub fn selected_denomination(&self) -> Denomination {
        self.selected
    }

    pub fn select_denomination(&mut self, denomination: Denomination) {
        self.selected = denomination;
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.ledger.snapshot()
    }

    /// Observe ledger mutations, for presentation refresh.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.ledger.subscribe()
    }

    /// Buy `count` chips of `denomination` against the wallet. At most one
    /// wallet operation may be in flight per session; a second request while
    /// one is pending is rejected rather than queued.
    pub async fn buy_chips(
        &mut self,
        denomination: Denomination,
        count: u32,
    ) -> Result<(), SessionError> {
        if count == 0 {
            return Err(SessionError::illegal("buy_chips", "count must be positive"));
        }
        let amount = denomination.value() * u64::from(count);
        let response = self.wallet_call(WalletOp::Debit, amount).await?;
        if !response.success {
            self.ledger.set_balance(response.balance);
            return Err(SessionError::InsufficientFunds {
                amount,
                reason: response
                    .message
                    .unwrap_or_else(|| "declined by wallet".to_string()),
            });
        }
        self.ledger.set_balance(response.balance);
        self.ledger.add_chips(denomination, count);
        self.persist().await;
        self.emit(SessionEvent::ChipsPurchased {
            total_value: amount,
            balance: response.balance,
        });
        Ok(())
    }

    /// Cash the whole chip inventory back to the wallet. Chips leave the
    /// ledger only after the wallet confirms the credit.
    pub async fn withdraw_chips(&mut self) -> Result<(), SessionError> {
        let amount = self.ledger.total_chip_value();
        if amount == 0 {
            return Err(SessionError::illegal("withdraw", "no chips to withdraw"));
        }
        let response = self.wallet_call(WalletOp::Credit, amount).await?;
        if !response.success {
            return Err(SessionError::WalletService(
                response
                    .message
                    .unwrap_or_else(|| "credit declined".to_string()),
            ));
        }
        self.ledger.drain_chips();
        self.ledger.set_balance(response.balance);
        self.persist().await;
        self.emit(SessionEvent::ChipsWithdrawn {
            total_value: amount,
            balance: response.balance,
        });
        Ok(())
    }

    /// Return staged wagers to the ledger.
    pub async fn reset_bets(&mut self) -> Result<u64, SessionError> {
        let refunded = self.engine.reset_bets(&mut self.ledger)?;
        self.persist().await;
        Ok(refunded)
    }

    /// Stop any pending paced sequence. The ledger can no longer be mutated
    /// by in-flight dealer play or round resets after this returns.
    pub fn close(&self) {
        self.cancel.cancel();
        info!(table_id = %self.table_id, "session closed");
    }

    async fn wallet_call(
        &mut self,
        op: WalletOp,
        amount: u64,
    ) -> Result<WalletResponse, SessionError> {
        if self.wallet_in_flight {
            return Err(SessionError::illegal(
                "wallet",
                "a wallet operation is already in flight",
            ));
        }
        let wallet = Arc::clone(&self.wallet);
        let deadline = self.config.timeouts.wallet;
        self.wallet_in_flight = true;
        // Cleared on every exit path, including the caller dropping this
        // future mid-await.
        let _latch = LatchGuard {
            flag: &mut self.wallet_in_flight,
        };
        let call = async move {
            match op {
                WalletOp::Debit => wallet.debit(amount).await,
                WalletOp::Credit => wallet.credit(amount).await,
            }
        };
        match tokio::time::timeout(deadline, call).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(err)) => Err(SessionError::WalletService(err.to_string())),
            Err(_) => Err(SessionError::WalletService(
                "wallet request timed out".to_string(),
            )),
        }
    }

    async fn persist(&self) {
        let snapshot = self.ledger.snapshot();
        if let Err(err) = self.store.save(&self.table_id, &snapshot).await {
            warn!(table_id = %self.table_id, %err, "failed to persist session state");
        }
    }

    fn emit(&self, event: SessionEvent) {
        // A dropped receiver just means nobody is listening.
        let _ = self.events.send(event);
    }

    async fn fresh_rng(&self) -> GameRng {
        round_rng(self.rng.as_ref(), self.config.timeouts.rng, &self.table_id).await
    }

    async fn paced(&self, duration: Duration) -> bool {
        pause(duration, &self.token).await
    }
}

#[derive(Clone, Copy)]
enum WalletOp {
    Debit,
    Credit,
}

/// Clears the in-flight flag when dropped, so an abandoned wallet future
/// cannot leave the session rejecting wallet operations forever.
struct LatchGuard<'a> {
    flag: &'a mut bool,
}

impl Drop for LatchGuard<'_> {
    fn drop(&mut self) {
        *self.flag = false;
    }
}

impl SessionOrchestrator<RouletteEngine> {
    /// Stake one chip of the selected denomination on `kind`.
    pub async fn place_bet(&mut self, kind: BetKind) -> Result<(), SessionError> {
        let denomination = self.selected;
        self.engine.place_bet(&mut self.ledger, denomination, kind)?;
        self.persist().await;
        self.emit(SessionEvent::BetPlaced {
            game: GameKind::Roulette,
            denomination: denomination.value(),
        });
        Ok(())
    }

    /// Spin the wheel and settle the book. The RNG provider is asked for a
    /// seed; on failure or timeout the round completes with a local draw.
    pub async fn spin(&mut self) -> Result<RoundSettlement, SessionError> {
        self.engine.check_spin()?;
        self.emit(SessionEvent::RoundStarted {
            game: GameKind::Roulette,
        });
        // The phase transition waits until the seed is in hand, so a caller
        // dropping this future mid-await cannot strand the book in Spinning.
        let mut rng = self.fresh_rng().await;
        let outcome = rng.wheel_outcome();
        self.engine.begin_spin()?;
        let settlement = self.engine.resolve_spin(&mut self.ledger, outcome)?;
        self.persist().await;
        self.emit(SessionEvent::RoundResolved {
            game: GameKind::Roulette,
            outcome: RoundOutcome::WheelNumber(settlement.winning_number),
            total_won: settlement.total_won,
            total_wagered: settlement.total_wagered,
        });
        Ok(settlement)
    }
}

impl SessionOrchestrator<BlackjackEngine> {
    /// Move one chip of the selected denomination onto the table.
    pub async fn wager_chip(&mut self) -> Result<(), SessionError> {
        let denomination = self.selected;
        self.engine.wager_chip(&mut self.ledger, denomination)?;
        self.persist().await;
        self.emit(SessionEvent::BetPlaced {
            game: GameKind::Blackjack,
            denomination: denomination.value(),
        });
        Ok(())
    }

    /// Deal a fresh round from a newly shuffled shoe. A natural on either
    /// side settles immediately.
    pub async fn deal(&mut self) -> Result<TurnFlow, SessionError> {
        let mut rng = self.fresh_rng().await;
        let shoe = Shoe::shuffled(&mut rng);
        let flow = self.engine.deal(&mut self.ledger, shoe)?;
        self.emit(SessionEvent::RoundStarted {
            game: GameKind::Blackjack,
        });
        if let TurnFlow::Settled(summary) = &flow {
            let summary = summary.clone();
            self.finish_round(summary).await;
        }
        Ok(flow)
    }

    /// Apply one player action. When the action hands play to the dealer,
    /// the dealer's draws run here, paced and cancellable, through to
    /// settlement.
    pub async fn action(&mut self, action: PlayerAction) -> Result<TurnFlow, SessionError> {
        let flow = match action {
            PlayerAction::Hit => self.engine.hit(&mut self.ledger)?,
            PlayerAction::Stand => self.engine.stand(&mut self.ledger)?,
            PlayerAction::Double => self.engine.double(&mut self.ledger)?,
            PlayerAction::Surrender => self.engine.surrender(&mut self.ledger)?,
            PlayerAction::Split => self.engine.split(&mut self.ledger)?,
            PlayerAction::Insurance => {
                self.engine.insurance(&mut self.ledger)?;
                TurnFlow::Playing
            }
        };
        self.emit(SessionEvent::ActionTaken {
            game: GameKind::Blackjack,
            action,
        });
        match flow {
            TurnFlow::DealerTurn => self.dealer_turn().await,
            TurnFlow::Settled(summary) => {
                self.finish_round(summary.clone()).await;
                Ok(TurnFlow::Settled(summary))
            }
            TurnFlow::Playing => Ok(TurnFlow::Playing),
        }
    }

    /// Draw for the dealer with a pause between cards, then settle. If the
    /// session is closed mid-sequence the round is abandoned unsettled and
    /// the ledger is left untouched.
    async fn dealer_turn(&mut self) -> Result<TurnFlow, SessionError> {
        loop {
            match self.engine.dealer_step()? {
                DealerStep::Drew(_) => {
                    if !self.paced(self.config.pacing.dealer_draw).await {
                        return Ok(TurnFlow::DealerTurn);
                    }
                }
                DealerStep::Done => break,
            }
        }
        let summary = self.engine.settle(&mut self.ledger)?;
        self.finish_round(summary.clone()).await;
        Ok(TurnFlow::Settled(summary))
    }

    /// Persist, emit the result, and after the display pause re-arm the
    /// table for the next round. A cancelled pause skips the re-arm.
    async fn finish_round(&mut self, summary: RoundSummary) {
        self.persist().await;
        self.emit(SessionEvent::RoundResolved {
            game: GameKind::Blackjack,
            outcome: RoundOutcome::HandValues {
                player: summary.player_values.clone(),
                dealer: summary.dealer_value,
            },
            total_won: summary.total_won,
            total_wagered: summary.total_wagered,
        });
        if self.paced(self.config.pacing.round_reset).await {
            if let Err(err) = self.engine.reset_round() {
                warn!(table_id = %self.table_id, %err, "failed to re-arm table");
            }
        }
    }
}
