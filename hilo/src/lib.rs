//! # Hilo
//!
//! A multiplayer trick-comparison card game ("collector vs. challenger")
//! where 4-8 players share one deck.
//!
//! Each round, every player places a card face down. The current collector
//! then predicts whether their card beats the next seat's card under a
//! non-standard ranking: aces beat face cards, face cards beat number
//! cards, and number cards beat aces. A correct call lets the collector
//! keep challenging or bank the pot pile into their collection; a wrong
//! call hands the collector role to the challenger; a tie burns both cards
//! to the discard pile.
//!
//! ## Architecture
//!
//! - [`game`]: deck construction, the card-ranking rule, and the per-room
//!   round state machine ([`GameRoom`]).
//! - [`room`]: async room actors. Each room runs in its own tokio task with
//!   an mpsc inbox, so every operation against one room is serialized while
//!   different rooms proceed concurrently. The [`RoomRegistry`] creates a
//!   room on first join and tears it down when the last player leaves.
//!
//! ## Example
//!
//! ```
//! use hilo::{GameRoom, PlayerId};
//!
//! let mut room = GameRoom::new("lobby-1".into());
//! for name in ["alice", "bob", "carol", "dave"] {
//!     room.add_player(PlayerId::new_v4(), name.into()).unwrap();
//! }
//! room.start_game().unwrap();
//! assert_eq!(room.current_collector, Some(room.player_order[0]));
//! ```

/// Core game logic: cards, deck, and the round state machine.
pub mod game;

/// Async room actors and the room registry.
pub mod room;

pub use game::{
    ChallengeOutcome, ChallengePairing, GameError, GameRoom, GameState, PlayerSummary, Prediction,
    RoomId, RoomSnapshot, RoundPhase,
    entities::{Card, Deck, Player, PlayerId, Suit, Value},
};
pub use room::{
    LeaveOutcome, RoomActor, RoomConfig, RoomEvent, RoomHandle, RoomMessage, RoomRegistry,
};
