//! Outbound domain events.
//!
//! The session orchestrator emits these for consumption by presentation and
//! telemetry. Events are serialized as JSON by those collaborators; nothing
//! in the engine depends on their wire form.

use serde::{Deserialize, Serialize};

/// Which table game a session hosts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    Roulette,
    Blackjack,
}

/// A player action inside a blackjack round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerAction {
    Hit,
    Stand,
    Double,
    Surrender,
    Insurance,
    Split,
}

/// The outcome attached to a round-resolved event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundOutcome {
    /// Roulette: the winning wheel number.
    WheelNumber(u8),
    /// Blackjack: final hand values (one per player hand) and dealer value.
    HandValues { player: Vec<u8>, dealer: u8 },
}

/// Domain events dispatched outward by the session orchestrator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    BetPlaced {
        game: GameKind,
        denomination: u64,
    },
    ChipsPurchased {
        total_value: u64,
        balance: u64,
    },
    ChipsWithdrawn {
        total_value: u64,
        balance: u64,
    },
    RoundStarted {
        game: GameKind,
    },
    RoundResolved {
        game: GameKind,
        outcome: RoundOutcome,
        total_won: u64,
        total_wagered: u64,
    },
    ActionTaken {
        game: GameKind,
        action: PlayerAction,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_shape() {
        let event = SessionEvent::RoundResolved {
            game: GameKind::Roulette,
            outcome: RoundOutcome::WheelNumber(17),
            total_won: 180,
            total_wagered: 5,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""event":"round_resolved""#));
        assert!(json.contains(r#""game":"roulette""#));

        let back: SessionEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
