//! Single-player blackjack.
//!
//! The engine is a synchronous state machine; the orchestrator injects the
//! shoe and paces the dealer's draws. Wagers leave the ledger at placement,
//! so every settlement path only credits.
//!
//! House rules live in [`BlackjackRules`]; the table dealer hits soft 17 by
//! default.

use crate::cards::{Card, Hand, Rank, Shoe};
use crate::config::BlackjackRules;
use crate::error::SessionError;
use crate::ledger::ChipEconomyLedger;
use baize_types::{Denomination, BLACKJACK_TARGET, DEALER_STAND_VALUE, INSURANCE_MULTIPLIER};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlackjackPhase {
    Betting,
    Playing,
    DealerTurn,
    GameOver,
}

/// Where a single player hand stands inside the round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandStatus {
    Playing,
    Standing,
    Busted,
    Surrendered,
}

/// What the caller should do next after a player action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TurnFlow {
    /// A player hand still has decisions to make.
    Playing,
    /// All live hands are standing; run the dealer.
    DealerTurn,
    /// The round ended without dealer play.
    Settled(RoundSummary),
}

/// Final accounting for one round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundSummary {
    pub player_values: Vec<u8>,
    pub dealer_value: u8,
    /// Value credited back to the ledger at settlement, stakes included.
    pub total_won: u64,
    pub total_wagered: u64,
}

/// One card drawn, or the dealer is done. Returned per-step so the caller
/// can pace the reveal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DealerStep {
    Drew(Card),
    Done,
}

#[derive(Debug)]
struct PlayerHand {
    hand: Hand,
    bet: u64,
    doubled: bool,
    was_split: bool,
    status: HandStatus,
}

impl PlayerHand {
    fn new(bet: u64) -> Self {
        Self {
            hand: Hand::new(),
            bet,
            doubled: false,
            was_split: false,
            status: HandStatus::Playing,
        }
    }
}

#[derive(Debug)]
struct Round {
    shoe: Shoe,
    hands: Vec<PlayerHand>,
    active: usize,
    dealer: Hand,
}

pub struct BlackjackEngine {
    rules: BlackjackRules,
    phase: BlackjackPhase,
    current_bet: u64,
    insurance_bet: u64,
    insurance_offered: bool,
    round: Option<Round>,
}

impl BlackjackEngine {
    pub fn new(rules: BlackjackRules) -> Self {
        Self {
            rules,
            phase: BlackjackPhase::Betting,
            current_bet: 0,
            insurance_bet: 0,
            insurance_offered: false,
            round: None,
        }
    }

    pub fn phase(&self) -> BlackjackPhase {
        self.phase
    }

    pub fn current_bet(&self) -> u64 {
        self.current_bet
    }

    pub fn insurance_bet(&self) -> u64 {
        self.insurance_bet
    }

    pub fn insurance_offered(&self) -> bool {
        self.insurance_offered && self.insurance_bet == 0
    }

    pub fn dealer_hand(&self) -> Option<&Hand> {
        self.round.as_ref().map(|r| &r.dealer)
    }

    pub fn player_values(&self) -> Vec<u8> {
        self.round
            .as_ref()
            .map(|r| r.hands.iter().map(|h| h.hand.value()).collect())
            .unwrap_or_default()
    }

    /// Move one chip from the ledger onto the table.
    pub fn wager_chip(
        &mut self,
        ledger: &mut ChipEconomyLedger,
        denomination: Denomination,
    ) -> Result<(), SessionError> {
        if self.phase != BlackjackPhase::Betting {
            return Err(SessionError::illegal("wager", "round in progress"));
        }
        ledger.remove_chips(denomination, 1)?;
        self.current_bet += denomination.value();
        Ok(())
    }

    /// Return the staged wager to the ledger. Only legal before the deal.
    pub fn reset_bets(&mut self, ledger: &mut ChipEconomyLedger) -> Result<u64, SessionError> {
        if self.phase != BlackjackPhase::Betting {
            return Err(SessionError::illegal("reset_bets", "round in progress"));
        }
        let refunded = self.current_bet;
        ledger.credit_value(refunded)?;
        self.current_bet = 0;
        Ok(refunded)
    }

    /// Deal player-dealer-player-dealer and evaluate naturals. A natural on
    /// either side ends the round immediately: both is a push, a player
    /// natural pays three to two (floored), a dealer natural takes the wager.
    pub fn deal(
        &mut self,
        ledger: &mut ChipEconomyLedger,
        mut shoe: Shoe,
    ) -> Result<TurnFlow, SessionError> {
        if self.phase != BlackjackPhase::Betting {
            return Err(SessionError::illegal("deal", "round in progress"));
        }
        if self.current_bet == 0 {
            return Err(SessionError::illegal("deal", "no wager placed"));
        }

        let mut player = PlayerHand::new(self.current_bet);
        let mut dealer = Hand::new();
        player.hand.push(draw(&mut shoe)?);
        dealer.push(draw(&mut shoe)?);
        player.hand.push(draw(&mut shoe)?);
        dealer.push(draw(&mut shoe)?);

        let player_natural = player.hand.is_blackjack();
        let dealer_natural = dealer.is_blackjack();
        let holds_ace_up = dealer.up_card().map(|c| c.rank == Rank::Ace).unwrap_or(false);

        self.round = Some(Round {
            shoe,
            hands: vec![player],
            active: 0,
            dealer,
        });

        if player_natural || dealer_natural {
            let bet = self.current_bet;
            let credit = match (player_natural, dealer_natural) {
                (true, true) => bet,
                (true, false) => bet + bet * 3 / 2,
                _ => 0,
            };
            ledger.credit_value(credit)?;
            self.phase = BlackjackPhase::GameOver;
            return Ok(TurnFlow::Settled(self.summarize(credit)));
        }

        self.insurance_offered = holds_ace_up;
        self.phase = BlackjackPhase::Playing;
        Ok(TurnFlow::Playing)
    }

    pub fn hit(&mut self, ledger: &mut ChipEconomyLedger) -> Result<TurnFlow, SessionError> {
        self.require_playing("hit")?;
        let round = self.round.as_mut().ok_or_else(no_round)?;
        let card = draw(&mut round.shoe)?;
        let hand = &mut round.hands[round.active];
        hand.hand.push(card);
        if hand.hand.is_busted() {
            hand.status = HandStatus::Busted;
        } else if hand.hand.value() == BLACKJACK_TARGET {
            hand.status = HandStatus::Standing;
        } else {
            return Ok(TurnFlow::Playing);
        }
        self.advance(ledger)
    }

    pub fn stand(&mut self, ledger: &mut ChipEconomyLedger) -> Result<TurnFlow, SessionError> {
        self.require_playing("stand")?;
        let round = self.round.as_mut().ok_or_else(no_round)?;
        round.hands[round.active].status = HandStatus::Standing;
        self.advance(ledger)
    }

    /// Double the wager on a two-card hand, take exactly one card, and end
    /// the hand. The matching stake is debited by value, making change if
    /// needed.
    pub fn double(&mut self, ledger: &mut ChipEconomyLedger) -> Result<TurnFlow, SessionError> {
        self.require_playing("double")?;
        let round = self.round.as_mut().ok_or_else(no_round)?;
        let hand = &round.hands[round.active];
        if hand.hand.len() != 2 || hand.doubled {
            return Err(SessionError::illegal("double", "only a fresh two-card hand may double"));
        }
        if hand.was_split && !self.rules.double_after_split {
            return Err(SessionError::illegal("double", "doubling after a split is not allowed"));
        }
        ledger.debit_value(hand.bet)?;

        let card = draw(&mut round.shoe)?;
        let hand = &mut round.hands[round.active];
        hand.bet *= 2;
        hand.doubled = true;
        hand.hand.push(card);
        hand.status = if hand.hand.is_busted() {
            HandStatus::Busted
        } else {
            HandStatus::Standing
        };
        self.advance(ledger)
    }

    /// Forfeit half the wager (floored) and end the hand; the other half
    /// returns to the ledger immediately.
    pub fn surrender(&mut self, ledger: &mut ChipEconomyLedger) -> Result<TurnFlow, SessionError> {
        self.require_playing("surrender")?;
        let round = self.round.as_mut().ok_or_else(no_round)?;
        let hand = &mut round.hands[round.active];
        if hand.hand.len() != 2 {
            return Err(SessionError::illegal("surrender", "only a two-card hand may surrender"));
        }
        if hand.was_split {
            return Err(SessionError::illegal("surrender", "a split hand may not surrender"));
        }
        let returned = hand.bet - hand.bet / 2;
        hand.status = HandStatus::Surrendered;
        ledger.credit_value(returned)?;
        self.advance(ledger)
    }

    /// Take insurance for half the main wager. Offered once per round, only
    /// while the dealer shows an Ace.
    pub fn insurance(&mut self, ledger: &mut ChipEconomyLedger) -> Result<(), SessionError> {
        self.require_playing("insurance")?;
        if !self.insurance_offered {
            return Err(SessionError::illegal("insurance", "insurance is not offered"));
        }
        if self.insurance_bet > 0 {
            return Err(SessionError::illegal("insurance", "insurance already taken"));
        }
        let amount = self.current_bet / 2;
        if amount == 0 {
            return Err(SessionError::illegal("insurance", "wager too small to insure"));
        }
        ledger.debit_value(amount)?;
        self.insurance_bet = amount;
        Ok(())
    }

    /// Split a two-card pair of equal counting value into two hands, each
    /// carrying the original wager and receiving one card. Split hands may
    /// not be re-split.
    pub fn split(&mut self, ledger: &mut ChipEconomyLedger) -> Result<TurnFlow, SessionError> {
        self.require_playing("split")?;
        let round = self.round.as_mut().ok_or_else(no_round)?;
        if round.hands.len() != 1 {
            return Err(SessionError::illegal("split", "hand has already been split"));
        }
        let first = &round.hands[0];
        if first.hand.len() != 2 {
            return Err(SessionError::illegal("split", "only a two-card hand may split"));
        }
        let cards = first.hand.cards();
        if cards[0].base_value() != cards[1].base_value() {
            return Err(SessionError::illegal("split", "cards are not of equal value"));
        }
        ledger.debit_value(first.bet)?;

        let round = self.round.as_mut().ok_or_else(no_round)?;
        let moved = round.hands[0].hand.pop().ok_or_else(no_round)?;
        let mut second = PlayerHand::new(round.hands[0].bet);
        second.hand.push(moved);
        round.hands[0].was_split = true;
        second.was_split = true;
        round.hands.push(second);
        for i in 0..2 {
            let card = draw(&mut round.shoe)?;
            let hand = &mut round.hands[i];
            hand.hand.push(card);
            if hand.hand.value() == BLACKJACK_TARGET {
                hand.status = HandStatus::Standing;
            }
        }
        self.advance(ledger)
    }

    /// One dealer draw per call so the caller can pace the reveal. The
    /// dealer draws below seventeen and, under the house rule, on soft
    /// seventeen.
    pub fn dealer_step(&mut self) -> Result<DealerStep, SessionError> {
        if self.phase != BlackjackPhase::DealerTurn {
            return Err(SessionError::illegal("dealer_step", "not the dealer's turn"));
        }
        let round = self.round.as_mut().ok_or_else(no_round)?;
        let value = round.dealer.value();
        let must_draw = value < DEALER_STAND_VALUE
            || (value == DEALER_STAND_VALUE
                && round.dealer.is_soft()
                && self.rules.dealer_hits_soft_17);
        if !must_draw {
            return Ok(DealerStep::Done);
        }
        let card = draw(&mut round.shoe)?;
        round.dealer.push(card);
        Ok(DealerStep::Drew(card))
    }

    /// Settle every hand against the dealer once the dealer is done drawing.
    /// Insurance settles independently, paying two to one when the dealer's
    /// final hand is a blackjack.
    pub fn settle(&mut self, ledger: &mut ChipEconomyLedger) -> Result<RoundSummary, SessionError> {
        if self.phase != BlackjackPhase::DealerTurn {
            return Err(SessionError::illegal("settle", "dealer has not played"));
        }
        let credit = self.settlement_credit();
        ledger.credit_value(credit)?;
        self.phase = BlackjackPhase::GameOver;
        Ok(self.summarize(credit))
    }

    fn settlement_credit(&self) -> u64 {
        let Some(round) = self.round.as_ref() else {
            return 0;
        };
        let dealer_value = round.dealer.value();
        let dealer_busted = round.dealer.is_busted();
        let mut credit = 0u64;
        for hand in &round.hands {
            credit += match hand.status {
                HandStatus::Busted | HandStatus::Surrendered => 0,
                _ => {
                    let value = hand.hand.value();
                    if dealer_busted || value > dealer_value {
                        hand.bet * 2
                    } else if value == dealer_value {
                        hand.bet
                    } else {
                        0
                    }
                }
            };
        }
        if self.insurance_bet > 0 && round.dealer.is_blackjack() {
            credit += self.insurance_bet * (INSURANCE_MULTIPLIER + 1);
        }
        credit
    }

    /// Clear the round and reopen betting. Idempotent: calling it again from
    /// `Betting` is a no-op.
    pub fn reset_round(&mut self) -> Result<(), SessionError> {
        match self.phase {
            BlackjackPhase::GameOver | BlackjackPhase::Betting => {
                self.phase = BlackjackPhase::Betting;
                self.current_bet = 0;
                self.insurance_bet = 0;
                self.insurance_offered = false;
                self.round = None;
                Ok(())
            }
            _ => Err(SessionError::illegal("reset", "round still in play")),
        }
    }

    /// Actions currently accepted for the active hand.
    pub fn legal_actions(&self) -> Vec<&'static str> {
        if self.phase != BlackjackPhase::Playing {
            return Vec::new();
        }
        let Some(round) = self.round.as_ref() else {
            return Vec::new();
        };
        let hand = &round.hands[round.active];
        let mut actions = vec!["hit", "stand"];
        if hand.hand.len() == 2 && !hand.doubled {
            if !hand.was_split || self.rules.double_after_split {
                actions.push("double");
            }
            if !hand.was_split {
                actions.push("surrender");
            }
        }
        if round.hands.len() == 1 && hand.hand.len() == 2 {
            let cards = hand.hand.cards();
            if cards[0].base_value() == cards[1].base_value() {
                actions.push("split");
            }
        }
        if self.insurance_offered() {
            actions.push("insurance");
        }
        actions
    }

    fn require_playing(&self, action: &'static str) -> Result<(), SessionError> {
        if self.phase != BlackjackPhase::Playing {
            return Err(SessionError::illegal(action, "no hand in play"));
        }
        Ok(())
    }

    /// Hand the turn to the next live hand, or finish the round.
    fn advance(&mut self, ledger: &mut ChipEconomyLedger) -> Result<TurnFlow, SessionError> {
        let round = self.round.as_mut().ok_or_else(no_round)?;
        if let Some(next) = round
            .hands
            .iter()
            .position(|h| h.status == HandStatus::Playing)
        {
            round.active = next;
            return Ok(TurnFlow::Playing);
        }
        if round.hands.iter().any(|h| h.status == HandStatus::Standing) {
            self.phase = BlackjackPhase::DealerTurn;
            return Ok(TurnFlow::DealerTurn);
        }
        // Every hand busted or surrendered; the dealer never plays.
        self.phase = BlackjackPhase::DealerTurn;
        let summary = self.settle(ledger)?;
        Ok(TurnFlow::Settled(summary))
    }

    fn summarize(&self, total_won: u64) -> RoundSummary {
        let (player_values, dealer_value, bets) = match self.round.as_ref() {
            Some(round) => (
                round.hands.iter().map(|h| h.hand.value()).collect(),
                round.dealer.value(),
                round.hands.iter().map(|h| h.bet).sum::<u64>(),
            ),
            None => (Vec::new(), 0, 0),
        };
        RoundSummary {
            player_values,
            dealer_value,
            total_won,
            total_wagered: bets + self.insurance_bet,
        }
    }
}

fn draw(shoe: &mut Shoe) -> Result<Card, SessionError> {
    shoe.draw().ok_or(SessionError::ShoeExhausted)
}

fn no_round() -> SessionError {
    SessionError::illegal("play", "no round in progress")
}
