//! Per-table configuration with casino defaults.

use std::time::Duration;

/// Blackjack house rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlackjackRules {
    /// Dealer draws on soft 17. Deliberate house rule, on by default.
    pub dealer_hits_soft_17: bool,
    /// Doubling a split hand is allowed.
    pub double_after_split: bool,
}

impl Default for BlackjackRules {
    fn default() -> Self {
        Self {
            dealer_hits_soft_17: true,
            double_after_split: true,
        }
    }
}

/// Fixed-duration pauses used for presentation pacing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PacingConfig {
    /// Pause between sequential dealer draws.
    pub dealer_draw: Duration,
    /// Display pause between settlement and the reset to betting.
    pub round_reset: Duration,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            dealer_draw: Duration::from_millis(600),
            round_reset: Duration::from_secs(2),
        }
    }
}

impl PacingConfig {
    /// No pauses at all; used by tests.
    pub fn zero() -> Self {
        Self {
            dealer_draw: Duration::ZERO,
            round_reset: Duration::ZERO,
        }
    }
}

/// Timeouts attached to collaborator calls. A hung wallet or RNG service must
/// not stall a round indefinitely.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeoutConfig {
    pub wallet: Duration,
    pub rng: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            wallet: Duration::from_secs(5),
            rng: Duration::from_secs(3),
        }
    }
}

/// Complete table configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TableConfig {
    pub blackjack: BlackjackRules,
    pub pacing: PacingConfig,
    pub timeouts: TimeoutConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TableConfig::default();
        assert!(config.blackjack.dealer_hits_soft_17);
        assert!(config.blackjack.double_after_split);
        assert!(config.timeouts.wallet > Duration::ZERO);
        assert!(config.timeouts.rng > Duration::ZERO);
    }

    #[test]
    fn test_zero_pacing() {
        let pacing = PacingConfig::zero();
        assert_eq!(pacing.dealer_draw, Duration::ZERO);
        assert_eq!(pacing.round_reset, Duration::ZERO);
    }
}
