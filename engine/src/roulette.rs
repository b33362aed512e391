//! Single-player European roulette table.
//!
//! The wheel has 37 pockets (0-36). Stakes move out of the ledger at
//! placement; resolution credits winners and re-arms the table for the next
//! betting window in the same call.

use crate::bets::{Bet, BetKind, BetRegistry, RoundSettlement};
use crate::error::SessionError;
use crate::ledger::ChipEconomyLedger;
use baize_types::{Denomination, WHEEL_OUTCOMES};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoulettePhase {
    Betting,
    Spinning,
}

#[derive(Debug, Default)]
pub struct RouletteEngine {
    phase: RoulettePhase,
    registry: BetRegistry,
}

impl Default for RoulettePhase {
    fn default() -> Self {
        RoulettePhase::Betting
    }
}

impl RouletteEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> RoulettePhase {
        self.phase
    }

    pub fn bets(&self) -> &[Bet] {
        self.registry.bets()
    }

    pub fn total_stake(&self) -> u64 {
        self.registry.total_stake()
    }

    /// Stake one chip of `denomination` on `kind`. Allowed while betting and
    /// while the wheel is in motion; late bets ride on the spin in flight.
    pub fn place_bet(
        &mut self,
        ledger: &mut ChipEconomyLedger,
        denomination: Denomination,
        kind: BetKind,
    ) -> Result<(), SessionError> {
        kind.validate()?;
        ledger.remove_chips(denomination, 1)?;
        self.registry.place(Bet::new(denomination, kind));
        Ok(())
    }

    /// Validate a spin request without transitioning: rejected when no bets
    /// are down or a spin is already in progress.
    pub fn check_spin(&self) -> Result<(), SessionError> {
        if self.phase == RoulettePhase::Spinning {
            return Err(SessionError::illegal("spin", "a spin is already in progress"));
        }
        if self.registry.is_empty() {
            return Err(SessionError::illegal("spin", "no bets placed"));
        }
        Ok(())
    }

    /// Commit the book to a spin; the phase is untouched on rejection.
    pub fn begin_spin(&mut self) -> Result<(), SessionError> {
        self.check_spin()?;
        self.phase = RoulettePhase::Spinning;
        Ok(())
    }

    /// Settle the committed book against `outcome` and reopen betting.
    /// An off-wheel outcome is rejected with the book and phase untouched.
    pub fn resolve_spin(
        &mut self,
        ledger: &mut ChipEconomyLedger,
        outcome: u8,
    ) -> Result<RoundSettlement, SessionError> {
        if self.phase != RoulettePhase::Spinning {
            return Err(SessionError::illegal("resolve", "no spin in progress"));
        }
        if outcome >= WHEEL_OUTCOMES {
            return Err(SessionError::illegal(
                "resolve",
                format!("pocket {outcome} is off the wheel"),
            ));
        }
        let settlement = self.registry.resolve(ledger, outcome);
        tracing::info!(
            winning_number = settlement.winning_number,
            total_won = settlement.total_won,
            total_wagered = settlement.total_wagered,
            "roulette round resolved"
        );
        self.phase = RoulettePhase::Betting;
        Ok(settlement)
    }

    /// Return all staked chips to the ledger. Only legal between spins.
    pub fn clear_bets(&mut self, ledger: &mut ChipEconomyLedger) -> Result<u64, SessionError> {
        if self.phase != RoulettePhase::Betting {
            return Err(SessionError::illegal("clear_bets", "spin in progress"));
        }
        Ok(self.registry.refund(ledger))
    }
}
