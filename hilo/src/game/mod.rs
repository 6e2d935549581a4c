//! Game engine: cards, deck handling, and the round state machine.
//!
//! This module provides:
//! - Card and deck primitives with the game's non-standard ranking rule
//! - The per-room round state machine (placement, challenge, collection)
//! - Counts-only snapshots safe to broadcast to every player

pub mod entities;
pub mod state_machine;

pub use state_machine::{
    ChallengeOutcome, ChallengePairing, GameError, GameRoom, GameState, PlayerSummary, Prediction,
    RoomId, RoomSnapshot, RoundPhase,
};
