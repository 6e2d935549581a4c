//! The per-room round state machine.
//!
//! A [`GameRoom`] owns everything for one room: the players, the shared
//! piles, the placement bookkeeping, and the collector/challenger rotation.
//! Every operation validates all of its preconditions before mutating
//! anything, so a rejected action always leaves the room unchanged.

use log::debug;
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, collections::HashMap, fmt};
use thiserror::Error;

use super::entities::{Card, DECK_SIZE, Deck, Player, PlayerId};

pub const DEFAULT_MIN_PLAYERS: usize = 4;
pub const DEFAULT_MAX_PLAYERS: usize = 8;

/// Room identifier chosen by clients; the first join to an id creates it.
pub type RoomId = String;

/// Errors reported back to the acting player. All of these are
/// recoverable: the room state is untouched and play continues.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum GameError {
    #[error("not allowed in the current phase")]
    InvalidTransition,
    #[error("only the collector can do that")]
    UnauthorizedActor,
    #[error("room is full")]
    RoomFull,
    #[error("room does not exist")]
    RoomNotFound,
    #[error("need {required}+ players to start")]
    InsufficientPlayers { required: usize },
    #[error("no such card in hand")]
    InvalidCardReference,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    Waiting,
    Playing,
    /// Declared for the wire format; no rule ever reaches it because the
    /// game has no win condition yet.
    Finished,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundPhase {
    Placement,
    Challenge,
    /// Declared for the wire format; collection happens inside `collect`
    /// without ever resting in this phase.
    Collection,
}

/// The collector's call when resolving a challenge.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Prediction {
    Higher,
    Lower,
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Higher => "higher",
            Self::Lower => "lower",
        };
        write!(f, "{repr}")
    }
}

/// Fixed once every player has placed: who compares against whom.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ChallengePairing {
    pub collector: PlayerId,
    pub challenger: PlayerId,
}

/// How a challenge resolved.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ChallengeOutcome {
    /// Equal cards burn to the discard pile; only the two contestants owe
    /// replacement cards before the challenge can rerun.
    Tie,
    /// The collector keeps the reins and may keep challenging or collect.
    CollectorWins,
    /// The challenger takes over; every other player's table card moves
    /// into the pot pile.
    ChallengerWins { new_collector: PlayerId },
}

impl fmt::Display for ChallengeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Tie => "tie",
            Self::CollectorWins => "collector wins",
            Self::ChallengerWins { .. } => "challenger wins",
        };
        write!(f, "{repr}")
    }
}

/// Per-player counts included in every snapshot. Hand contents never
/// appear here.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PlayerSummary {
    pub id: PlayerId,
    pub name: String,
    pub hand_count: usize,
    pub collection_count: usize,
    pub has_played_card: bool,
}

/// Read-only view broadcast identically to every player in the room.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RoomSnapshot {
    pub room_id: RoomId,
    pub game_state: GameState,
    pub round_phase: RoundPhase,
    pub players: Vec<PlayerSummary>,
    pub current_collector: Option<PlayerId>,
    pub current_challenger: Option<PlayerId>,
    pub pot_pile_count: usize,
    pub discard_pile_count: usize,
    pub collector_prediction: Option<Prediction>,
}

/// One room's live game state.
///
/// Fields are public in the plain-aggregate style: the room is data with
/// behavior attached, not an object hierarchy. Mutation still goes through
/// the operation methods; the async room actor serializes access.
#[derive(Debug)]
pub struct GameRoom {
    pub id: RoomId,
    pub players: HashMap<PlayerId, Player>,
    pub game_state: GameState,
    pub round_phase: RoundPhase,
    /// One face-down card per player, cleared when a round resolves.
    pub played_cards: HashMap<PlayerId, Card>,
    /// Cards at stake, banked by the collector on `collect`.
    pub pot_pile: Vec<Card>,
    /// Cards permanently removed from play after ties.
    pub discard_pile: Vec<Card>,
    /// Seating frozen at game start; rotation walks this, wrapping.
    pub player_order: Vec<PlayerId>,
    pub current_collector: Option<PlayerId>,
    pub current_challenger: Option<PlayerId>,
    pub collector_prediction: Option<Prediction>,
    /// Join order; becomes `player_order` when the game starts.
    seating: Vec<PlayerId>,
    deck: Deck,
    min_players: usize,
    max_players: usize,
}

impl GameRoom {
    pub fn new(id: RoomId) -> Self {
        Self::with_limits(id, DEFAULT_MIN_PLAYERS, DEFAULT_MAX_PLAYERS)
    }

    pub fn with_limits(id: RoomId, min_players: usize, max_players: usize) -> Self {
        Self {
            id,
            players: HashMap::with_capacity(max_players),
            game_state: GameState::Waiting,
            round_phase: RoundPhase::Placement,
            played_cards: HashMap::with_capacity(max_players),
            pot_pile: Vec::new(),
            discard_pile: Vec::new(),
            player_order: Vec::new(),
            current_collector: None,
            current_challenger: None,
            collector_prediction: None,
            seating: Vec::with_capacity(max_players),
            deck: Deck::default(),
            min_players,
            max_players,
        }
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Add a player. Joining an id already in the room is a no-op.
    pub fn add_player(&mut self, id: PlayerId, name: String) -> Result<(), GameError> {
        if self.players.contains_key(&id) {
            return Ok(());
        }
        if self.players.len() >= self.max_players {
            return Err(GameError::RoomFull);
        }
        self.players.insert(id, Player::new(id, name));
        self.seating.push(id);
        Ok(())
    }

    /// Remove a player, returning whether the room is now empty.
    ///
    /// `player_order` is never edited once the game has started: rotation
    /// simply steps over a vanished id. The leaver's placed card, if any,
    /// stays on the table as it would have in a physical game.
    pub fn remove_player(&mut self, id: PlayerId) -> bool {
        self.players.remove(&id);
        self.seating.retain(|p| *p != id);
        self.players.is_empty()
    }

    /// Shuffle, deal `floor(52 / n)` cards to each seat, and enter the
    /// placement phase with the first seat collecting. The `52 mod n`
    /// remainder is never dealt and never enters any pile.
    pub fn start_game(&mut self) -> Result<(), GameError> {
        if self.game_state != GameState::Waiting {
            return Err(GameError::InvalidTransition);
        }
        if self.players.len() < self.min_players {
            return Err(GameError::InsufficientPlayers {
                required: self.min_players,
            });
        }

        self.deck = Deck::default();
        self.deck.shuffle();
        self.player_order = self.seating.clone();

        let cards_per_player = DECK_SIZE / self.player_order.len();
        for id in &self.player_order {
            if let Some(player) = self.players.get_mut(id) {
                player.hand = self.deck.deal(cards_per_player);
            }
        }

        self.current_collector = Some(self.player_order[0]);
        self.current_challenger = None;
        self.collector_prediction = None;
        self.game_state = GameState::Playing;
        self.round_phase = RoundPhase::Placement;
        debug!(
            "room {}: game started with {} players, {} cards undealt",
            self.id,
            self.player_order.len(),
            self.deck.remaining()
        );
        Ok(())
    }

    /// Place the card at `card_index` from the player's hand face down.
    ///
    /// Accepted during placement, and also during an unresolved challenge
    /// for any player whose card was consumed (the tie path and the fresh
    /// round after an upset). Once every player has a card down, the room
    /// enters the challenge phase and the pairing is returned so the
    /// transport can announce it.
    pub fn place_card(
        &mut self,
        player_id: PlayerId,
        card_index: usize,
    ) -> Result<Option<ChallengePairing>, GameError> {
        if self.game_state != GameState::Playing {
            return Err(GameError::InvalidTransition);
        }
        if self.played_cards.contains_key(&player_id) {
            return Err(GameError::InvalidTransition);
        }
        match self.round_phase {
            RoundPhase::Placement => {}
            RoundPhase::Challenge if self.members_with_cards() < self.players.len() => {}
            _ => return Err(GameError::InvalidTransition),
        }
        let player = self
            .players
            .get_mut(&player_id)
            .ok_or(GameError::UnauthorizedActor)?;
        if card_index >= player.hand.len() {
            return Err(GameError::InvalidCardReference);
        }

        let card = player.hand.remove(card_index);
        self.played_cards.insert(player_id, card);

        if self.members_with_cards() == self.players.len() {
            let collector = self
                .current_collector
                .ok_or(GameError::InvalidTransition)?;
            let challenger = self.seat_after(collector);
            self.round_phase = RoundPhase::Challenge;
            self.current_challenger = Some(challenger);
            return Ok(Some(ChallengePairing {
                collector,
                challenger,
            }));
        }
        Ok(None)
    }

    /// Resolve the pending challenge. Only the current collector may call
    /// this, and only once every player's card is down.
    pub fn challenge(
        &mut self,
        caller: PlayerId,
        prediction: Prediction,
    ) -> Result<ChallengeOutcome, GameError> {
        if self.game_state != GameState::Playing || self.round_phase != RoundPhase::Challenge {
            return Err(GameError::InvalidTransition);
        }
        if self.current_collector != Some(caller) {
            return Err(GameError::UnauthorizedActor);
        }
        let challenger = self
            .current_challenger
            .ok_or(GameError::InvalidTransition)?;
        let (collector_card, challenger_card) = match (
            self.played_cards.get(&caller),
            self.played_cards.get(&challenger),
        ) {
            (Some(c), Some(h)) => (*c, *h),
            // Replacement cards from a tie are still owed.
            _ => return Err(GameError::InvalidTransition),
        };

        self.collector_prediction = Some(prediction);
        let comparison = collector_card.compare(&challenger_card);
        debug!(
            "room {}: challenge {collector_card} vs {challenger_card}, called {prediction}",
            self.id
        );

        if comparison == Ordering::Equal {
            self.played_cards.remove(&caller);
            self.played_cards.remove(&challenger);
            self.discard_pile.push(collector_card);
            self.discard_pile.push(challenger_card);
            return Ok(ChallengeOutcome::Tie);
        }

        let collector_wins = matches!(
            (prediction, comparison),
            (Prediction::Higher, Ordering::Greater) | (Prediction::Lower, Ordering::Less)
        );
        if collector_wins {
            // Cards stay on the table; the collector chooses between
            // another challenge round and banking the pot.
            return Ok(ChallengeOutcome::CollectorWins);
        }

        self.current_collector = Some(challenger);
        for (id, card) in self.played_cards.drain() {
            if id != challenger {
                self.pot_pile.push(card);
            }
        }
        self.current_challenger = None;
        Ok(ChallengeOutcome::ChallengerWins {
            new_collector: challenger,
        })
    }

    /// Bank the entire pot pile into the collector's collection, clear the
    /// table, and pass the collector role one seat along. Returns how many
    /// cards were collected.
    pub fn collect(&mut self, caller: PlayerId) -> Result<usize, GameError> {
        if self.game_state != GameState::Playing {
            return Err(GameError::InvalidTransition);
        }
        if self.current_collector != Some(caller) {
            return Err(GameError::UnauthorizedActor);
        }
        let collector = self
            .players
            .get_mut(&caller)
            .ok_or(GameError::UnauthorizedActor)?;

        let collected = self.pot_pile.len();
        collector.collection.append(&mut self.pot_pile);
        self.played_cards.clear();
        self.current_collector = Some(self.seat_after(caller));
        self.current_challenger = None;
        self.round_phase = RoundPhase::Placement;
        Ok(collected)
    }

    /// Counts-only view, identical for every recipient. Never includes
    /// hand contents or which card anyone placed.
    pub fn snapshot(&self) -> RoomSnapshot {
        let order = if self.player_order.is_empty() {
            &self.seating
        } else {
            &self.player_order
        };
        let mut players: Vec<PlayerSummary> = order
            .iter()
            .filter_map(|id| self.players.get(id))
            .map(|player| PlayerSummary {
                id: player.id,
                name: player.name.clone(),
                hand_count: player.hand.len(),
                collection_count: player.collection.len(),
                has_played_card: self.played_cards.contains_key(&player.id),
            })
            .collect();
        // Mid-game joiners are seated but not in the frozen order.
        for id in &self.seating {
            if !order.contains(id)
                && let Some(player) = self.players.get(id)
            {
                players.push(PlayerSummary {
                    id: player.id,
                    name: player.name.clone(),
                    hand_count: player.hand.len(),
                    collection_count: player.collection.len(),
                    has_played_card: self.played_cards.contains_key(&player.id),
                });
            }
        }

        RoomSnapshot {
            room_id: self.id.clone(),
            game_state: self.game_state,
            round_phase: self.round_phase,
            players,
            current_collector: self.current_collector,
            current_challenger: self.current_challenger,
            pot_pile_count: self.pot_pile.len(),
            discard_pile_count: self.discard_pile.len(),
            collector_prediction: self.collector_prediction,
        }
    }

    /// Placed cards owned by players still in the room. A leaver's parked
    /// card stays in `played_cards` but must not count toward a full
    /// table, or their empty seat would wedge every later round.
    fn members_with_cards(&self) -> usize {
        self.played_cards
            .keys()
            .filter(|id| self.players.contains_key(id))
            .count()
    }

    /// Seat immediately after `id` in the frozen order, wrapping. A
    /// vanished id resolves to the first seat.
    fn seat_after(&self, id: PlayerId) -> PlayerId {
        let next = self
            .player_order
            .iter()
            .position(|p| *p == id)
            .map(|i| (i + 1) % self.player_order.len())
            .unwrap_or(0);
        self.player_order[next]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room_with(n: usize) -> GameRoom {
        let mut room = GameRoom::new("test".into());
        for i in 0..n {
            room.add_player(PlayerId::new_v4(), format!("player-{i}"))
                .unwrap();
        }
        room
    }

    #[test]
    fn start_needs_four_players() {
        let mut room = room_with(3);
        assert_eq!(
            room.start_game(),
            Err(GameError::InsufficientPlayers { required: 4 })
        );
        assert_eq!(room.game_state, GameState::Waiting);
    }

    #[test]
    fn start_twice_is_rejected() {
        let mut room = room_with(4);
        room.start_game().unwrap();
        assert_eq!(room.start_game(), Err(GameError::InvalidTransition));
    }

    #[test]
    fn start_deals_floor_of_deck() {
        let mut room = room_with(5);
        room.start_game().unwrap();
        for player in room.players.values() {
            assert_eq!(player.hand.len(), 10);
        }
        assert_eq!(room.current_collector, Some(room.player_order[0]));
        assert_eq!(room.round_phase, RoundPhase::Placement);
    }

    #[test]
    fn ninth_player_is_rejected() {
        let mut room = room_with(8);
        let late = PlayerId::new_v4();
        assert_eq!(
            room.add_player(late, "late".into()),
            Err(GameError::RoomFull)
        );
        assert_eq!(room.player_count(), 8);
    }

    #[test]
    fn rejoin_is_a_noop() {
        let mut room = room_with(4);
        let existing = room.player_order_preview()[0];
        room.add_player(existing, "again".into()).unwrap();
        assert_eq!(room.player_count(), 4);
    }

    #[test]
    fn place_requires_playing_state() {
        let mut room = room_with(4);
        let id = room.player_order_preview()[0];
        assert_eq!(
            room.place_card(id, 0),
            Err(GameError::InvalidTransition)
        );
    }

    #[test]
    fn place_rejects_bad_index() {
        let mut room = room_with(4);
        room.start_game().unwrap();
        let id = room.player_order[0];
        assert_eq!(
            room.place_card(id, 13),
            Err(GameError::InvalidCardReference)
        );
        assert_eq!(room.players[&id].hand.len(), 13);
    }

    #[test]
    fn double_placement_is_rejected() {
        let mut room = room_with(4);
        room.start_game().unwrap();
        let id = room.player_order[0];
        room.place_card(id, 0).unwrap();
        assert_eq!(room.place_card(id, 0), Err(GameError::InvalidTransition));
        assert_eq!(room.players[&id].hand.len(), 12);
    }

    #[test]
    fn full_table_enters_challenge_with_next_seat() {
        let mut room = room_with(4);
        room.start_game().unwrap();
        let order = room.player_order.clone();
        assert_eq!(room.place_card(order[0], 0).unwrap(), None);
        assert_eq!(room.place_card(order[1], 0).unwrap(), None);
        assert_eq!(room.place_card(order[2], 0).unwrap(), None);
        let pairing = room.place_card(order[3], 0).unwrap().unwrap();
        assert_eq!(pairing.collector, order[0]);
        assert_eq!(pairing.challenger, order[1]);
        assert_eq!(room.round_phase, RoundPhase::Challenge);
        assert_eq!(room.current_challenger, Some(order[1]));
    }

    #[test]
    fn challenge_before_full_table_is_rejected() {
        let mut room = room_with(4);
        room.start_game().unwrap();
        let order = room.player_order.clone();
        room.place_card(order[0], 0).unwrap();
        assert_eq!(
            room.challenge(order[0], Prediction::Higher),
            Err(GameError::InvalidTransition)
        );
    }

    #[test]
    fn only_collector_may_challenge_or_collect() {
        let mut room = room_with(4);
        room.start_game().unwrap();
        let order = room.player_order.clone();
        for id in &order {
            room.place_card(*id, 0).unwrap();
        }
        assert_eq!(
            room.challenge(order[2], Prediction::Higher),
            Err(GameError::UnauthorizedActor)
        );
        assert_eq!(room.collect(order[2]), Err(GameError::UnauthorizedActor));
    }

    #[test]
    fn collect_rotates_and_wraps() {
        let mut room = room_with(4);
        room.start_game().unwrap();
        let order = room.player_order.clone();
        for expected in [order[1], order[2], order[3], order[0], order[1]] {
            let collector = room.current_collector.unwrap();
            room.collect(collector).unwrap();
            assert_eq!(room.current_collector, Some(expected));
            assert_eq!(room.round_phase, RoundPhase::Placement);
        }
    }

    #[test]
    fn snapshot_carries_counts_only() {
        let mut room = room_with(4);
        room.start_game().unwrap();
        let order = room.player_order.clone();
        room.place_card(order[0], 0).unwrap();

        let snapshot = room.snapshot();
        assert_eq!(snapshot.players.len(), 4);
        let first = &snapshot.players[0];
        assert_eq!(first.id, order[0]);
        assert_eq!(first.hand_count, 12);
        assert!(first.has_played_card);
        assert!(!snapshot.players[1].has_played_card);

        // The serialized form must not leak which cards anyone holds.
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(!json.contains("hearts"));
        assert!(!json.contains("spades"));
    }

    impl GameRoom {
        fn player_order_preview(&self) -> Vec<PlayerId> {
            self.seating.clone()
        }
    }
}
