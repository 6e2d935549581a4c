//! Property-based tests for the card ranking relation.

use std::cmp::Ordering;

use hilo::{Card, Suit, Value};
use proptest::prelude::*;

fn arb_suit() -> impl Strategy<Value = Suit> {
    prop_oneof![
        Just(Suit::Hearts),
        Just(Suit::Diamonds),
        Just(Suit::Clubs),
        Just(Suit::Spades),
    ]
}

fn arb_card() -> impl Strategy<Value = Card> {
    (1u8..=13, arb_suit()).prop_map(|(value, suit)| Card(value, suit))
}

fn is_face(value: Value) -> bool {
    value >= 11
}

fn is_number(value: Value) -> bool {
    (2..=10).contains(&value)
}

proptest! {
    /// Swapping the operands must reverse the ordering.
    #[test]
    fn compare_is_antisymmetric(a in arb_card(), b in arb_card()) {
        prop_assert_eq!(a.compare(&b), b.compare(&a).reverse());
    }

    /// Suits never influence the outcome.
    #[test]
    fn suits_are_irrelevant(
        value_a in 1u8..=13,
        value_b in 1u8..=13,
        suit_a in arb_suit(),
        suit_b in arb_suit(),
        suit_c in arb_suit(),
        suit_d in arb_suit(),
    ) {
        let first = Card(value_a, suit_a).compare(&Card(value_b, suit_b));
        let second = Card(value_a, suit_c).compare(&Card(value_b, suit_d));
        prop_assert_eq!(first, second);
    }

    /// Same value is always a tie, whatever the suits.
    #[test]
    fn equal_values_tie(value in 1u8..=13, a in arb_suit(), b in arb_suit()) {
        prop_assert_eq!(Card(value, a).compare(&Card(value, b)), Ordering::Equal);
    }

    /// An ace beats every face card and loses to every number card.
    #[test]
    fn ace_beats_faces_loses_to_numbers(value in 2u8..=13, a in arb_suit(), b in arb_suit()) {
        let ace = Card(1, a);
        let other = Card(value, b);
        if is_face(value) {
            prop_assert_eq!(ace.compare(&other), Ordering::Greater);
        } else {
            prop_assert_eq!(ace.compare(&other), Ordering::Less);
        }
    }

    /// Any face card beats any number card.
    #[test]
    fn faces_beat_numbers(face in 11u8..=13, number in 2u8..=10, a in arb_suit(), b in arb_suit()) {
        prop_assert_eq!(Card(face, a).compare(&Card(number, b)), Ordering::Greater);
    }

    /// Inside one category the raw value decides.
    #[test]
    fn within_category_value_decides(
        value_a in 1u8..=13,
        value_b in 1u8..=13,
        a in arb_suit(),
        b in arb_suit(),
    ) {
        let same_category = (is_face(value_a) && is_face(value_b))
            || (is_number(value_a) && is_number(value_b))
            || (value_a == 1 && value_b == 1);
        prop_assume!(same_category);
        prop_assert_eq!(Card(value_a, a).compare(&Card(value_b, b)), value_a.cmp(&value_b));
    }
}
