/// Fixed chip denomination set for a table session.
pub const CHIP_DENOMINATIONS: [u64; 4] = [1, 5, 25, 100];

/// Number of outcomes on a European roulette wheel (0..=36).
pub const WHEEL_OUTCOMES: u8 = 37;

/// Payout multiplier for a straight (single-number) roulette bet (35:1).
pub const STRAIGHT_MULTIPLIER: u64 = 35;

/// Payout multiplier for dozen and column roulette bets (2:1).
pub const DOZEN_COLUMN_MULTIPLIER: u64 = 2;

/// Payout multiplier for even-money roulette bets (red/black/odd/even/low/high).
pub const EVEN_MONEY_MULTIPLIER: u64 = 1;

/// Target hand value in blackjack.
pub const BLACKJACK_TARGET: u8 = 21;

/// Dealer stands at or above this value (subject to the soft-17 rule).
pub const DEALER_STAND_VALUE: u8 = 17;

/// Insurance pays 2:1 when the dealer's final hand is a blackjack.
pub const INSURANCE_MULTIPLIER: u64 = 2;
