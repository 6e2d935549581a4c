//! WebSocket handler for real-time room play.
//!
//! One websocket connection is one player in one room. Connecting joins
//! the room (creating it on first join); disconnecting leaves it, and the
//! last player out destroys it.
//!
//! # Connection Flow
//!
//! 1. Client connects via `GET /ws/{room_id}?name=<display name>`
//! 2. Server joins the room and replies with a `joined` message carrying
//!    the player's id and the current room snapshot
//! 3. Server spawns a send task fanning out room events as they happen
//! 4. Incoming client commands are forwarded to the room actor and
//!    answered with `success`/`error` messages
//! 5. On disconnect the player is removed from the room
//!
//! # Example
//!
//! ```javascript
//! const ws = new WebSocket('ws://localhost:8000/ws/kitchen-table?name=ada');
//!
//! ws.onmessage = (event) => {
//!   const data = JSON.parse(event.data);
//!   // data.type is one of: joined, success, error, game_state,
//!   // game_started, hand_dealt, challenge_phase, challenge_result,
//!   // cards_collected, room_closed
//! };
//!
//! ws.send(JSON.stringify({ type: "place_card", card_index: 0 }));
//! ws.send(JSON.stringify({ type: "challenge", prediction: "higher" }));
//! ```

use axum::{
    extract::{
        Path, Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use hilo::{
    ChallengeOutcome, GameError, PlayerId, Prediction, RoomEvent, RoomHandle, RoomMessage,
    RoomSnapshot,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::AppState;
use crate::metrics;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    name: String,
}

/// Client messages received via WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientMessage {
    /// Shuffle, deal, and begin play. Any room member may send this.
    StartGame,
    /// Place the hand card at `card_index` face down.
    PlaceCard { card_index: usize },
    /// Call higher or lower (collector only).
    Challenge { prediction: Prediction },
    /// Bank the pot pile (collector only).
    Collect,
    /// Leave the room without closing the socket.
    Leave,
}

/// Response messages sent to the client. Room events are serialized
/// separately as [`RoomEvent`]s; these cover only the request/response
/// half of the protocol.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ServerResponse {
    Joined {
        player_id: PlayerId,
        snapshot: RoomSnapshot,
    },
    Success {
        message: String,
    },
    Error {
        message: String,
    },
}

/// Upgrade an HTTP connection to a WebSocket joined to `room_id`.
///
/// The display name comes from the `name` query parameter; a blank name
/// is rejected before the upgrade.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Path(room_id): Path<String>,
    Query(query): Query<WsQuery>,
    State(state): State<AppState>,
) -> Response {
    let name = query.name.trim().to_string();
    if name.is_empty() {
        return (StatusCode::BAD_REQUEST, "player name is required").into_response();
    }

    ws.on_upgrade(move |socket| handle_socket(socket, room_id, name, state))
}

/// Handle an established WebSocket connection for one player.
async fn handle_socket(socket: WebSocket, room_id: String, name: String, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let player_id = PlayerId::new_v4();

    metrics::websocket_connections_total();
    info!("WebSocket connected: room={room_id}, player={player_id} ({name})");

    // Subscribe to room events; joining creates the room on first join.
    let (event_tx, mut event_rx) = tokio::sync::mpsc::channel::<RoomEvent>(32);
    let (handle, snapshot) = match state
        .registry
        .join_or_create(&room_id, player_id, name, event_tx)
        .await
    {
        Ok(joined) => joined,
        Err(err) => {
            warn!("join rejected for room {room_id}: {err}");
            let response = ServerResponse::Error {
                message: err.to_string(),
            };
            if let Ok(json) = serde_json::to_string(&response) {
                let _ = sender.send(Message::Text(json.into())).await;
            }
            let _ = sender.close().await;
            return;
        }
    };
    metrics::active_rooms(state.registry.room_count().await);

    let joined = ServerResponse::Joined {
        player_id,
        snapshot,
    };
    if let Ok(json) = serde_json::to_string(&joined)
        && sender.send(Message::Text(json.into())).await.is_err()
    {
        let _ = state.registry.leave(&room_id, player_id).await;
        return;
    }

    // Channel for command responses from the receive loop.
    let (response_tx, mut response_rx) = tokio::sync::mpsc::channel::<String>(32);

    // Send task: interleaves room events with command responses.
    let send_room_id = room_id.clone();
    let send_task = tokio::spawn(async move {
        loop {
            tokio::select! {
                event = event_rx.recv() => {
                    let Some(event) = event else { break };
                    let json = match serde_json::to_string(&event) {
                        Ok(json) => json,
                        Err(err) => {
                            error!("failed to serialize event for room {send_room_id}: {err}");
                            continue;
                        }
                    };
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                    metrics::websocket_messages_sent();
                }
                response = response_rx.recv() => {
                    let Some(json) = response else { break };
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                    metrics::websocket_messages_sent();
                }
            }
        }
    });

    // Receive messages from the client.
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                metrics::websocket_messages_received();

                let response = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(client_msg) => {
                        handle_client_message(client_msg, &handle, &room_id, player_id, &state)
                            .await
                    }
                    Err(err) => {
                        warn!("unparseable message from player {player_id}: {err}");
                        ServerResponse::Error {
                            message: "invalid message format".to_string(),
                        }
                    }
                };

                if let Ok(json) = serde_json::to_string(&response)
                    && response_tx.send(json).await.is_err()
                {
                    break;
                }
            }
            Ok(Message::Close(_)) => {
                info!("WebSocket closed: room={room_id}, player={player_id}");
                break;
            }
            Err(err) => {
                error!("WebSocket error for player {player_id}: {err}");
                break;
            }
            _ => {}
        }
    }

    // Cleanup. Leaving twice is harmless; the room tolerates non-members.
    send_task.abort();
    let _ = state.registry.leave(&room_id, player_id).await;
    metrics::active_rooms(state.registry.room_count().await);

    info!("WebSocket disconnected: room={room_id}, player={player_id}");
}

/// Forward a client command to the room actor and await its reply.
async fn handle_client_message(
    msg: ClientMessage,
    handle: &RoomHandle,
    room_id: &str,
    player_id: PlayerId,
    state: &AppState,
) -> ServerResponse {
    match msg {
        ClientMessage::StartGame => {
            let (tx, rx) = tokio::sync::oneshot::channel();
            let sent = handle
                .send(RoomMessage::StartGame {
                    player_id,
                    response: tx,
                })
                .await;
            match reply(sent, rx).await {
                Ok(()) => {
                    metrics::games_started_total();
                    ServerResponse::Success {
                        message: "game started".to_string(),
                    }
                }
                Err(err) => error_response(err),
            }
        }

        ClientMessage::PlaceCard { card_index } => {
            let (tx, rx) = tokio::sync::oneshot::channel();
            let sent = handle
                .send(RoomMessage::PlaceCard {
                    player_id,
                    card_index,
                    response: tx,
                })
                .await;
            match reply(sent, rx).await {
                Ok(()) => ServerResponse::Success {
                    message: "card placed".to_string(),
                },
                Err(err) => error_response(err),
            }
        }

        ClientMessage::Challenge { prediction } => {
            let (tx, rx) = tokio::sync::oneshot::channel();
            let sent = handle
                .send(RoomMessage::Challenge {
                    player_id,
                    prediction,
                    response: tx,
                })
                .await;
            match reply(sent, rx).await {
                Ok(outcome) => {
                    metrics::challenges_resolved_total(outcome_label(&outcome));
                    ServerResponse::Success {
                        message: format!("challenge resolved: {outcome}"),
                    }
                }
                Err(err) => error_response(err),
            }
        }

        ClientMessage::Collect => {
            let (tx, rx) = tokio::sync::oneshot::channel();
            let sent = handle
                .send(RoomMessage::Collect {
                    player_id,
                    response: tx,
                })
                .await;
            match reply(sent, rx).await {
                Ok(count) => {
                    metrics::cards_collected_total(count);
                    ServerResponse::Success {
                        message: format!("collected {count} cards"),
                    }
                }
                Err(err) => error_response(err),
            }
        }

        ClientMessage::Leave => match state.registry.leave(room_id, player_id).await {
            Ok(_) => {
                metrics::active_rooms(state.registry.room_count().await);
                ServerResponse::Success {
                    message: "left room".to_string(),
                }
            }
            Err(err) => error_response(err),
        },
    }
}

/// Collapse the send result and the oneshot reply into one result.
async fn reply<T>(
    sent: Result<(), GameError>,
    rx: tokio::sync::oneshot::Receiver<Result<T, GameError>>,
) -> Result<T, GameError> {
    sent?;
    rx.await.map_err(|_| GameError::RoomNotFound)?
}

fn error_response(err: GameError) -> ServerResponse {
    ServerResponse::Error {
        message: err.to_string(),
    }
}

fn outcome_label(outcome: &ChallengeOutcome) -> &'static str {
    match outcome {
        ChallengeOutcome::Tie => "tie",
        ChallengeOutcome::CollectorWins => "collector_wins",
        ChallengeOutcome::ChallengerWins { .. } => "challenger_wins",
    }
}
