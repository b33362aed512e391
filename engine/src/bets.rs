//! Roulette bet book-keeping.
//!
//! Bets are recorded at placement time and settled in one pass once the
//! wheel outcome is known. Stakes leave the ledger when the bet is placed,
//! so settlement only ever credits.

use crate::error::SessionError;
use crate::ledger::ChipEconomyLedger;
use baize_types::{
    Denomination, DOZEN_COLUMN_MULTIPLIER, EVEN_MONEY_MULTIPLIER, STRAIGHT_MULTIPLIER,
    WHEEL_OUTCOMES,
};

/// Red pockets on a European wheel.
const RED_NUMBERS: [u8; 18] = [
    1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BetKind {
    /// Single pocket, zero included.
    Straight(u8),
    Red,
    Black,
    Even,
    Odd,
    /// 1-18
    Low,
    /// 19-36
    High,
    /// Dozen index 0..=2 covering 1-12, 13-24, 25-36.
    Dozen(u8),
    /// Column index 0..=2; column `c` covers numbers where n % 3 == c + 1 (mod 3).
    Column(u8),
}

impl BetKind {
    pub fn validate(self) -> Result<(), SessionError> {
        match self {
            BetKind::Straight(n) if n >= WHEEL_OUTCOMES => {
                Err(SessionError::illegal("place_bet", format!("pocket {n} is off the wheel")))
            }
            BetKind::Dozen(d) if d > 2 => {
                Err(SessionError::illegal("place_bet", format!("dozen index {d} out of range")))
            }
            BetKind::Column(c) if c > 2 => {
                Err(SessionError::illegal("place_bet", format!("column index {c} out of range")))
            }
            _ => Ok(()),
        }
    }

    /// Whether this bet covers `outcome`. Zero loses every outside bet.
    pub fn covers(self, outcome: u8) -> bool {
        match self {
            BetKind::Straight(n) => outcome == n,
            _ if outcome == 0 => false,
            BetKind::Red => RED_NUMBERS.contains(&outcome),
            BetKind::Black => !RED_NUMBERS.contains(&outcome),
            BetKind::Even => outcome % 2 == 0,
            BetKind::Odd => outcome % 2 == 1,
            BetKind::Low => outcome <= 18,
            BetKind::High => outcome >= 19,
            BetKind::Dozen(d) => (outcome - 1) / 12 == d,
            BetKind::Column(c) => outcome % 3 == (c + 1) % 3,
        }
    }

    pub fn payout_multiplier(self) -> u64 {
        match self {
            BetKind::Straight(_) => STRAIGHT_MULTIPLIER,
            BetKind::Dozen(_) | BetKind::Column(_) => DOZEN_COLUMN_MULTIPLIER,
            BetKind::Red
            | BetKind::Black
            | BetKind::Even
            | BetKind::Odd
            | BetKind::Low
            | BetKind::High => EVEN_MONEY_MULTIPLIER,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bet {
    pub denomination: Denomination,
    pub kind: BetKind,
}

impl Bet {
    pub fn new(denomination: Denomination, kind: BetKind) -> Self {
        Self { denomination, kind }
    }

    pub fn stake(&self) -> u64 {
        self.denomination.value()
    }

    /// Total credit for a winning bet: the stake back plus the payout.
    pub fn winning_return(&self) -> u64 {
        self.stake() * (self.kind.payout_multiplier() + 1)
    }
}

/// Result of settling one round of bets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundSettlement {
    pub winning_number: u8,
    /// Total value credited back, stakes included.
    pub total_won: u64,
    pub total_wagered: u64,
    pub winning_bet_count: usize,
}

#[derive(Debug, Default)]
pub struct BetRegistry {
    bets: Vec<Bet>,
}

impl BetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn place(&mut self, bet: Bet) {
        self.bets.push(bet);
    }

    pub fn bets(&self) -> &[Bet] {
        &self.bets
    }

    pub fn len(&self) -> usize {
        self.bets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bets.is_empty()
    }

    pub fn total_stake(&self) -> u64 {
        self.bets.iter().map(Bet::stake).sum()
    }

    /// Settle every bet against `winning` and clear the book. A credit
    /// failure on one bet is logged and skipped; the others still settle.
    pub fn resolve(&mut self, ledger: &mut ChipEconomyLedger, winning: u8) -> RoundSettlement {
        let total_wagered = self.total_stake();
        let mut total_won = 0u64;
        let mut winning_bet_count = 0usize;
        for bet in self.bets.drain(..) {
            if !bet.kind.covers(winning) {
                continue;
            }
            let credit = bet.winning_return();
            match ledger.credit_value(credit) {
                Ok(()) => {
                    total_won += credit;
                    winning_bet_count += 1;
                }
                Err(err) => {
                    tracing::warn!(?bet, %err, "failed to credit winning bet, skipping");
                }
            }
        }
        RoundSettlement {
            winning_number: winning,
            total_won,
            total_wagered,
            winning_bet_count,
        }
    }

    /// Return every stake to the ledger and clear the book.
    pub fn refund(&mut self, ledger: &mut ChipEconomyLedger) -> u64 {
        let mut refunded = 0u64;
        for bet in self.bets.drain(..) {
            ledger.add_chips(bet.denomination, 1);
            refunded += bet.stake();
        }
        refunded
    }
}
