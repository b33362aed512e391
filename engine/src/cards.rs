//! Playing cards, hands, and the dealing shoe.
//!
//! Hand value is always derived, never mutated directly: it is the maximum
//! total ≤ 21 achievable by counting aces as 11 or 1; when no such total
//! exists it is the minimal (busted) total.

use crate::rng::GameRng;
use baize_types::BLACKJACK_TARGET;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Suit {
    Hearts,
    Diamonds,
    Clubs,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rank {
    Ace,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Ace,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
    ];

    /// Initial counting value: Ace 11, faces 10.
    pub fn base_value(self) -> u8 {
        match self {
            Rank::Ace => 11,
            Rank::Two => 2,
            Rank::Three => 3,
            Rank::Four => 4,
            Rank::Five => 5,
            Rank::Six => 6,
            Rank::Seven => 7,
            Rank::Eight => 8,
            Rank::Nine => 9,
            Rank::Ten | Rank::Jack | Rank::Queen | Rank::King => 10,
        }
    }
}

/// A single card. Immutable once drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Self { suit, rank }
    }

    pub fn base_value(self) -> u8 {
        self.rank.base_value()
    }
}

/// An ordered sequence of cards with derived value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Remove and return the last card (used when splitting a pair).
    pub fn pop(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    pub fn clear(&mut self) {
        self.cards.clear();
    }

    /// Sum ranks with aces at 11, then demote aces to 1 while busted.
    fn value_and_soft(&self) -> (u8, bool) {
        let mut value: u16 = 0;
        let mut aces: u8 = 0;
        for card in &self.cards {
            if card.rank == Rank::Ace {
                aces += 1;
            }
            value += u16::from(card.base_value());
        }
        while value > u16::from(BLACKJACK_TARGET) && aces > 0 {
            value -= 10;
            aces -= 1;
        }
        let is_soft = aces > 0 && value <= u16::from(BLACKJACK_TARGET);
        (value.min(255) as u8, is_soft)
    }

    pub fn value(&self) -> u8 {
        self.value_and_soft().0
    }

    /// True iff an ace is still counted as 11.
    pub fn is_soft(&self) -> bool {
        self.value_and_soft().1
    }

    pub fn is_busted(&self) -> bool {
        self.value() > BLACKJACK_TARGET
    }

    /// A natural: exactly two cards totalling 21.
    pub fn is_blackjack(&self) -> bool {
        self.cards.len() == 2 && self.value() == BLACKJACK_TARGET
    }

    /// First card, i.e. the dealer's up-card.
    pub fn up_card(&self) -> Option<Card> {
        self.cards.first().copied()
    }
}

impl FromIterator<Card> for Hand {
    fn from_iter<I: IntoIterator<Item = Card>>(iter: I) -> Self {
        Self {
            cards: iter.into_iter().collect(),
        }
    }
}

/// The dealing shoe for one round. Cards are drawn front-to-back and never
/// replaced within a round.
#[derive(Clone, Debug)]
pub struct Shoe {
    cards: Vec<Card>,
}

impl Shoe {
    /// A full 52-card deck shuffled by the round RNG.
    pub fn shuffled(rng: &mut GameRng) -> Self {
        let mut cards = standard_deck();
        rng.shuffle(&mut cards);
        Self { cards }
    }

    /// A shoe that deals the given cards in order. Test/presentation hook.
    pub fn stacked(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    pub fn draw(&mut self) -> Option<Card> {
        if self.cards.is_empty() {
            None
        } else {
            Some(self.cards.remove(0))
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

fn standard_deck() -> Vec<Card> {
    let mut cards = Vec::with_capacity(52);
    for suit in Suit::ALL {
        for rank in Rank::ALL {
            cards.push(Card::new(rank, suit));
        }
    }
    cards
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::RngSeed;

    fn hand(ranks: &[Rank]) -> Hand {
        ranks
            .iter()
            .map(|&rank| Card::new(rank, Suit::Spades))
            .collect()
    }

    #[test]
    fn test_hard_hand_value() {
        assert_eq!(hand(&[Rank::Ten, Rank::Seven]).value(), 17);
        assert!(!hand(&[Rank::Ten, Rank::Seven]).is_soft());
    }

    #[test]
    fn test_soft_hand_value() {
        let h = hand(&[Rank::Ace, Rank::Six]);
        assert_eq!(h.value(), 17);
        assert!(h.is_soft());
    }

    #[test]
    fn test_ace_demotion() {
        // A + 6 + 9: ace demotes to 1 for 16.
        let h = hand(&[Rank::Ace, Rank::Six, Rank::Nine]);
        assert_eq!(h.value(), 16);
        assert!(!h.is_soft());
    }

    #[test]
    fn test_multiple_aces() {
        // A + A: 11 + 1 = 12, still soft.
        let h = hand(&[Rank::Ace, Rank::Ace]);
        assert_eq!(h.value(), 12);
        assert!(h.is_soft());

        // A + A + 9: 21, soft.
        let h = hand(&[Rank::Ace, Rank::Ace, Rank::Nine]);
        assert_eq!(h.value(), 21);
        assert!(h.is_soft());
    }

    #[test]
    fn test_maximum_total_under_21_is_chosen() {
        // A + 8: 19 preferred over 9.
        assert_eq!(hand(&[Rank::Ace, Rank::Eight]).value(), 19);
    }

    #[test]
    fn test_busted_hand_uses_minimum_total() {
        let h = hand(&[Rank::Ten, Rank::Nine, Rank::Five]);
        assert_eq!(h.value(), 24);
        assert!(h.is_busted());

        // With an ace the minimum total counts the ace as 1.
        let h = hand(&[Rank::Ace, Rank::Ten, Rank::Nine, Rank::Five]);
        assert_eq!(h.value(), 25);
        assert!(h.is_busted());
    }

    #[test]
    fn test_blackjack_detection() {
        assert!(hand(&[Rank::Ace, Rank::King]).is_blackjack());
        assert!(hand(&[Rank::Ace, Rank::Ten]).is_blackjack());
        // 21 with three cards is not a natural.
        assert!(!hand(&[Rank::Seven, Rank::Seven, Rank::Seven]).is_blackjack());
    }

    #[test]
    fn test_shuffled_shoe_is_full_deck() {
        let mut rng = GameRng::from_seed(&RngSeed::new("shoe"));
        let mut shoe = Shoe::shuffled(&mut rng);
        assert_eq!(shoe.len(), 52);

        let mut drawn = Vec::new();
        while let Some(card) = shoe.draw() {
            assert!(!drawn.contains(&card), "duplicate card: {card:?}");
            drawn.push(card);
        }
        assert_eq!(drawn.len(), 52);
    }

    #[test]
    fn test_stacked_shoe_draw_order() {
        let first = Card::new(Rank::Ace, Suit::Hearts);
        let second = Card::new(Rank::King, Suit::Clubs);
        let mut shoe = Shoe::stacked(vec![first, second]);
        assert_eq!(shoe.draw(), Some(first));
        assert_eq!(shoe.draw(), Some(second));
        assert_eq!(shoe.draw(), None);
    }
}
