use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Hearts,
    Diamonds,
    Clubs,
    Spades,
}

impl Suit {
    pub const ALL: [Self; 4] = [Self::Hearts, Self::Diamonds, Self::Clubs, Self::Spades];
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Hearts => "♥",
            Self::Diamonds => "♦",
            Self::Clubs => "♣",
            Self::Spades => "♠",
        };
        write!(f, "{repr}")
    }
}

/// Placeholder for card values.
pub type Value = u8;

/// A card is a tuple of a uInt8 value (A=1u8, J=11u8, Q=12u8, K=13u8)
/// and a suit.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Card(pub Value, pub Suit);

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let value = match self.0 {
            1 => "A",
            11 => "J",
            12 => "Q",
            13 => "K",
            v => &v.to_string(),
        };
        let repr = format!("{value}/{}", self.1);
        write!(f, "{repr:>4}")
    }
}

impl Card {
    pub const fn value(&self) -> Value {
        self.0
    }

    pub const fn suit(&self) -> Suit {
        self.1
    }

    const fn is_ace(&self) -> bool {
        self.0 == 1
    }

    const fn is_face(&self) -> bool {
        self.0 >= 11
    }

    const fn is_number(&self) -> bool {
        self.0 >= 2 && self.0 <= 10
    }

    /// Ranking used to resolve challenges. A lone ace beats a face card,
    /// a lone face card beats a number card, and everything else compares
    /// by raw value with suits never breaking ties. The resulting order is
    /// deliberately cyclic: A > K, K > 5, yet 5 > A.
    pub fn compare(&self, other: &Self) -> Ordering {
        if self.is_ace() && other.is_face() {
            return Ordering::Greater;
        }
        if other.is_ace() && self.is_face() {
            return Ordering::Less;
        }
        if self.is_face() && other.is_number() {
            return Ordering::Greater;
        }
        if other.is_face() && self.is_number() {
            return Ordering::Less;
        }
        self.0.cmp(&other.0)
    }
}

pub const DECK_SIZE: usize = 52;

/// A full deck. Shuffled once per game start, then dealt in contiguous
/// slices so that `52 mod player_count` trailing cards are simply never
/// dealt. Those leftovers stay here and re-enter only on the next shuffle.
#[derive(Debug)]
pub struct Deck {
    cards: [Card; DECK_SIZE],
    deal_idx: usize,
}

impl Default for Deck {
    fn default() -> Self {
        let mut cards = [Card(1, Suit::Hearts); DECK_SIZE];
        for (i, value) in (1u8..=13u8).enumerate() {
            for (j, suit) in Suit::ALL.into_iter().enumerate() {
                cards[4 * i + j] = Card(value, suit);
            }
        }
        Self { cards, deal_idx: 0 }
    }
}

impl Deck {
    /// Fisher-Yates via `SliceRandom`, so every permutation is equally
    /// likely.
    pub fn shuffle(&mut self) {
        self.cards.shuffle(&mut rand::rng());
        self.deal_idx = 0;
    }

    /// Deal the next `count` contiguous cards.
    ///
    /// # Panics
    ///
    /// Panics if fewer than `count` undealt cards remain. Callers size
    /// their requests off `remaining`.
    pub fn deal(&mut self, count: usize) -> Vec<Card> {
        let hand = self.cards[self.deal_idx..self.deal_idx + count].to_vec();
        self.deal_idx += count;
        hand
    }

    pub fn remaining(&self) -> usize {
        DECK_SIZE - self.deal_idx
    }

    pub fn cards(&self) -> &[Card; DECK_SIZE] {
        &self.cards
    }
}

/// Opaque player identity, stable for the lifetime of a connection.
pub type PlayerId = uuid::Uuid;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Cards still hidden in hand; mutated only by placement.
    pub hand: Vec<Card>,
    /// Cards banked from won pots; only ever grows.
    pub collection: Vec<Card>,
    /// Reserved for a future ready-check flow. Nothing toggles it yet.
    pub ready: bool,
}

impl Player {
    pub fn new(id: PlayerId, name: String) -> Self {
        Self {
            id,
            name,
            hand: Vec::new(),
            collection: Vec::new(),
            ready: false,
        }
    }
}
