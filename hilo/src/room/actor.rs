//! Room actor implementation with async message handling.

use std::collections::HashMap;

use tokio::sync::mpsc::{self, error::TrySendError};

use super::{
    config::RoomConfig,
    messages::{LeaveOutcome, RoomEvent, RoomMessage},
};
use crate::game::{GameError, GameRoom, RoomId, entities::PlayerId};

/// Cloneable handle for sending messages to a room actor.
#[derive(Clone)]
pub struct RoomHandle {
    sender: mpsc::Sender<RoomMessage>,
    room_id: RoomId,
}

impl RoomHandle {
    pub fn new(sender: mpsc::Sender<RoomMessage>, room_id: RoomId) -> Self {
        Self { sender, room_id }
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Whether both handles point at the same actor instance. Two rooms
    /// created under the same id at different times compare unequal.
    pub fn same_channel(&self, other: &Self) -> bool {
        self.sender.same_channel(&other.sender)
    }

    /// Send a message to the room. Fails only if the actor has shut down.
    pub async fn send(&self, message: RoomMessage) -> Result<(), GameError> {
        self.sender
            .send(message)
            .await
            .map_err(|_| GameError::RoomNotFound)
    }
}

/// Actor owning one room's game state. All mutations flow through the
/// inbox, one at a time, which is the entire concurrency story: no other
/// code ever touches the [`GameRoom`].
pub struct RoomActor {
    room: GameRoom,
    inbox: mpsc::Receiver<RoomMessage>,
    subscribers: HashMap<PlayerId, mpsc::Sender<RoomEvent>>,
    closed: bool,
}

impl RoomActor {
    pub fn new(id: RoomId, config: RoomConfig) -> (Self, RoomHandle) {
        let (sender, inbox) = mpsc::channel(100);
        let actor = Self {
            room: GameRoom::with_limits(id.clone(), config.min_players, config.max_players),
            inbox,
            subscribers: HashMap::with_capacity(config.max_players),
            closed: false,
        };
        let handle = RoomHandle::new(sender, id);
        (actor, handle)
    }

    /// Run the room actor event loop until the last player leaves.
    pub async fn run(mut self) {
        log::info!("room {} open", self.room.id);

        while let Some(message) = self.inbox.recv().await {
            self.handle_message(message);
            if self.closed {
                break;
            }
        }

        self.broadcast(RoomEvent::RoomClosed);
        log::info!("room {} closed", self.room.id);
    }

    fn handle_message(&mut self, message: RoomMessage) {
        match message {
            RoomMessage::Join {
                player_id,
                name,
                subscriber,
                response,
            } => {
                let result = self.handle_join(player_id, name, subscriber);
                let _ = response.send(result);
            }

            RoomMessage::Leave {
                player_id,
                response,
            } => {
                let result = self.handle_leave(player_id);
                let _ = response.send(result);
            }

            RoomMessage::StartGame {
                player_id,
                response,
            } => {
                let result = self.handle_start(player_id);
                let _ = response.send(result);
            }

            RoomMessage::PlaceCard {
                player_id,
                card_index,
                response,
            } => {
                let result = self.handle_place(player_id, card_index);
                let _ = response.send(result);
            }

            RoomMessage::Challenge {
                player_id,
                prediction,
                response,
            } => {
                let result = self.handle_challenge(player_id, prediction);
                let _ = response.send(result);
            }

            RoomMessage::Collect {
                player_id,
                response,
            } => {
                let result = self.handle_collect(player_id);
                let _ = response.send(result);
            }

            RoomMessage::GetSnapshot { response } => {
                let _ = response.send(self.room.snapshot());
            }

            RoomMessage::Unsubscribe { player_id } => {
                self.subscribers.remove(&player_id);
                log::debug!("player {player_id} unsubscribed from room {}", self.room.id);
            }
        }
    }

    fn handle_join(
        &mut self,
        player_id: PlayerId,
        name: String,
        subscriber: mpsc::Sender<RoomEvent>,
    ) -> Result<crate::game::RoomSnapshot, GameError> {
        self.room.add_player(player_id, name)?;
        self.subscribers.insert(player_id, subscriber);
        log::info!(
            "player {player_id} joined room {} ({} seated)",
            self.room.id,
            self.room.player_count()
        );
        let snapshot = self.room.snapshot();
        self.broadcast(RoomEvent::GameState {
            snapshot: snapshot.clone(),
        });
        Ok(snapshot)
    }

    fn handle_leave(&mut self, player_id: PlayerId) -> LeaveOutcome {
        let was_member = self.room.players.contains_key(&player_id);
        self.subscribers.remove(&player_id);
        if !was_member {
            return LeaveOutcome {
                was_member: false,
                room_now_empty: false,
            };
        }

        let room_now_empty = self.room.remove_player(player_id);
        log::info!("player {player_id} left room {}", self.room.id);
        if room_now_empty {
            self.closed = true;
        } else {
            let snapshot = self.room.snapshot();
            self.broadcast(RoomEvent::GameState { snapshot });
        }
        LeaveOutcome {
            was_member: true,
            room_now_empty,
        }
    }

    fn handle_start(&mut self, player_id: PlayerId) -> Result<(), GameError> {
        if !self.room.players.contains_key(&player_id) {
            return Err(GameError::UnauthorizedActor);
        }
        self.room.start_game()?;

        self.broadcast(RoomEvent::GameStarted);
        let snapshot = self.room.snapshot();
        self.broadcast(RoomEvent::GameState { snapshot });

        // Hands are private: each one goes only to its owner.
        let hands: Vec<(PlayerId, Vec<_>)> = self
            .room
            .players
            .values()
            .map(|player| (player.id, player.hand.clone()))
            .collect();
        for (id, hand) in hands {
            self.send_to(id, RoomEvent::HandDealt { hand });
        }
        Ok(())
    }

    fn handle_place(&mut self, player_id: PlayerId, card_index: usize) -> Result<(), GameError> {
        let pairing = self.room.place_card(player_id, card_index)?;
        let snapshot = self.room.snapshot();
        self.broadcast(RoomEvent::GameState { snapshot });
        if let Some(pairing) = pairing {
            self.broadcast(RoomEvent::ChallengePhase {
                collector: pairing.collector,
                challenger: pairing.challenger,
            });
        }
        Ok(())
    }

    fn handle_challenge(
        &mut self,
        player_id: PlayerId,
        prediction: crate::game::Prediction,
    ) -> Result<crate::game::ChallengeOutcome, GameError> {
        // Snapshot the contested cards up front; resolution may move them.
        let contest = self.room.current_challenger.and_then(|challenger| {
            let collector_card = *self.room.played_cards.get(&player_id)?;
            let challenger_card = *self.room.played_cards.get(&challenger)?;
            Some((collector_card, challenger_card))
        });
        let outcome = self.room.challenge(player_id, prediction)?;
        // A successful challenge implies both cards were on the table.
        if let Some((collector_card, challenger_card)) = contest {
            self.broadcast(RoomEvent::ChallengeResult {
                outcome: outcome.clone(),
                prediction,
                collector_card,
                challenger_card,
            });
        }
        let snapshot = self.room.snapshot();
        self.broadcast(RoomEvent::GameState { snapshot });
        Ok(outcome)
    }

    fn handle_collect(&mut self, player_id: PlayerId) -> Result<usize, GameError> {
        let count = self.room.collect(player_id)?;
        self.broadcast(RoomEvent::CardsCollected {
            collector: player_id,
            count,
        });
        let snapshot = self.room.snapshot();
        self.broadcast(RoomEvent::GameState { snapshot });
        Ok(count)
    }

    /// Fan an event out to every subscriber. A full channel drops that one
    /// event for that player; a closed channel drops the subscriber.
    fn broadcast(&mut self, event: RoomEvent) {
        let room_id = &self.room.id;
        self.subscribers
            .retain(|player_id, sender| match sender.try_send(event.clone()) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    log::warn!("subscriber {player_id} in room {room_id} is slow, dropping event");
                    true
                }
                Err(TrySendError::Closed(_)) => {
                    log::debug!("subscriber {player_id} in room {room_id} disconnected, removing");
                    false
                }
            });
    }

    fn send_to(&mut self, player_id: PlayerId, event: RoomEvent) {
        if let Some(sender) = self.subscribers.get(&player_id)
            && sender.try_send(event).is_err()
        {
            log::warn!(
                "failed to deliver private event to {player_id} in room {}",
                self.room.id
            );
        }
    }
}
