//! Room registry: keyed, shared mutable room directory.
//!
//! Rooms are created lazily on first join to an id and destroyed the
//! instant their last player leaves. The registry only hands out actor
//! handles; it never touches game state itself.

use std::collections::HashMap;

use tokio::sync::{RwLock, mpsc, oneshot};

use super::{
    actor::{RoomActor, RoomHandle},
    config::RoomConfig,
    messages::{LeaveOutcome, RoomEvent, RoomMessage},
};
use crate::game::{GameError, RoomSnapshot, entities::PlayerId};

pub struct RoomRegistry {
    config: RoomConfig,
    rooms: RwLock<HashMap<String, RoomHandle>>,
}

impl RoomRegistry {
    pub fn new(config: RoomConfig) -> Self {
        Self {
            config,
            rooms: RwLock::new(HashMap::new()),
        }
    }

    /// Join `room_id`, creating and spawning the room actor if this is the
    /// first join to that id. The subscriber channel receives the room's
    /// events for as long as the player stays connected.
    pub async fn join_or_create(
        &self,
        room_id: &str,
        player_id: PlayerId,
        name: String,
        subscriber: mpsc::Sender<RoomEvent>,
    ) -> Result<(RoomHandle, RoomSnapshot), GameError> {
        // A handle can go stale if the room emptied out between the lookup
        // and the send; retry once against a fresh actor.
        for _ in 0..2 {
            let handle = {
                let mut rooms = self.rooms.write().await;
                match rooms.get(room_id) {
                    Some(handle) => handle.clone(),
                    None => {
                        let (actor, handle) =
                            RoomActor::new(room_id.to_string(), self.config);
                        tokio::spawn(actor.run());
                        rooms.insert(room_id.to_string(), handle.clone());
                        log::info!("created room {room_id}");
                        handle
                    }
                }
            };

            let (tx, rx) = oneshot::channel();
            let sent = handle
                .send(RoomMessage::Join {
                    player_id,
                    name: name.clone(),
                    subscriber: subscriber.clone(),
                    response: tx,
                })
                .await;
            if sent.is_err() {
                self.remove(room_id, &handle).await;
                continue;
            }
            return match rx.await {
                Ok(Ok(snapshot)) => Ok((handle, snapshot)),
                Ok(Err(err)) => Err(err),
                Err(_) => {
                    self.remove(room_id, &handle).await;
                    continue;
                }
            };
        }
        Err(GameError::RoomNotFound)
    }

    pub async fn get(&self, room_id: &str) -> Option<RoomHandle> {
        let rooms = self.rooms.read().await;
        rooms.get(room_id).cloned()
    }

    /// Leave a room, tearing it down if this was the last player.
    pub async fn leave(
        &self,
        room_id: &str,
        player_id: PlayerId,
    ) -> Result<LeaveOutcome, GameError> {
        let handle = self.get(room_id).await.ok_or(GameError::RoomNotFound)?;

        let (tx, rx) = oneshot::channel();
        handle
            .send(RoomMessage::Leave {
                player_id,
                response: tx,
            })
            .await?;
        let outcome = rx.await.map_err(|_| GameError::RoomNotFound)?;

        if outcome.room_now_empty {
            self.remove(room_id, &handle).await;
            log::info!("destroyed empty room {room_id}");
        }
        Ok(outcome)
    }

    pub async fn room_count(&self) -> usize {
        let rooms = self.rooms.read().await;
        rooms.len()
    }

    /// Remove the mapping for `room_id` only while it still holds
    /// `handle`. A concurrent join can replace a dying room's handle with
    /// a fresh actor between our last send and this removal; that new
    /// room must stay reachable.
    async fn remove(&self, room_id: &str, handle: &RoomHandle) {
        let mut rooms = self.rooms.write().await;
        if let Some(stored) = rooms.get(room_id)
            && stored.same_channel(handle)
        {
            rooms.remove(room_id);
        }
    }
}
