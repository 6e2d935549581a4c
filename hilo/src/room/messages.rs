//! Room actor message types.

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};

use crate::game::{
    ChallengeOutcome, GameError, Prediction, RoomSnapshot,
    entities::{Card, PlayerId},
};

/// Messages that can be sent to a [`RoomActor`](super::RoomActor). Every
/// request carries a oneshot slot so the result reaches only the caller;
/// everything the rest of the room should hear goes out as [`RoomEvent`]s
/// through the subscriber channels.
#[derive(Debug)]
pub enum RoomMessage {
    /// Join the room and subscribe to its events.
    Join {
        player_id: PlayerId,
        name: String,
        subscriber: mpsc::Sender<RoomEvent>,
        response: oneshot::Sender<Result<RoomSnapshot, GameError>>,
    },

    /// Leave the room. The last player out closes it.
    Leave {
        player_id: PlayerId,
        response: oneshot::Sender<LeaveOutcome>,
    },

    /// Shuffle, deal, and begin play.
    StartGame {
        player_id: PlayerId,
        response: oneshot::Sender<Result<(), GameError>>,
    },

    /// Place the card at `card_index` face down.
    PlaceCard {
        player_id: PlayerId,
        card_index: usize,
        response: oneshot::Sender<Result<(), GameError>>,
    },

    /// Resolve the pending challenge (collector only).
    Challenge {
        player_id: PlayerId,
        prediction: Prediction,
        response: oneshot::Sender<Result<ChallengeOutcome, GameError>>,
    },

    /// Bank the pot pile (collector only).
    Collect {
        player_id: PlayerId,
        response: oneshot::Sender<Result<usize, GameError>>,
    },

    /// Current broadcast-safe view.
    GetSnapshot {
        response: oneshot::Sender<RoomSnapshot>,
    },

    /// Stop receiving events without leaving the game.
    Unsubscribe { player_id: PlayerId },
}

/// Result of a leave request.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LeaveOutcome {
    pub was_member: bool,
    /// When true the actor is shutting down and the registry must drop
    /// its handle.
    pub room_now_empty: bool,
}

/// Events fanned out to subscribed players. All variants are broadcast to
/// the whole room except `HandDealt`, which goes only to the hand's owner.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoomEvent {
    /// Fresh broadcast-safe view; sent after every accepted mutation.
    GameState { snapshot: RoomSnapshot },

    GameStarted,

    /// Private: the receiving player's own cards.
    HandDealt { hand: Vec<Card> },

    /// Every card is down; the collector must now call higher or lower.
    ChallengePhase {
        collector: PlayerId,
        challenger: PlayerId,
    },

    /// The two contested cards are revealed to the whole room here; this
    /// is the only event that ever exposes card faces publicly.
    ChallengeResult {
        outcome: ChallengeOutcome,
        prediction: Prediction,
        collector_card: Card,
        challenger_card: Card,
    },

    CardsCollected { collector: PlayerId, count: usize },

    /// The room is gone; no further events will arrive.
    RoomClosed,
}
