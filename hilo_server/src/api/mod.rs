//! HTTP/WebSocket API for the game server.
//!
//! The surface is deliberately small: one websocket endpoint per room, a
//! health check, and static file serving for the browser client. All game
//! traffic flows over the websocket; there is no REST API for game state.
//!
//! # Endpoints
//!
//! ```text
//! GET /health                  - Health check (public)
//! GET /ws/{room_id}?name=<nm>  - Join a room over WebSocket
//! GET /*                       - Static files from the configured directory
//! ```
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use hilo::{RoomConfig, RoomRegistry};
//! use hilo_server::api::{AppState, create_router};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let state = AppState {
//!     registry: Arc::new(RoomRegistry::new(RoomConfig::default())),
//! };
//! let app = create_router(state, Path::new("public"));
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod websocket;

use std::path::Path;
use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
};
use hilo::RoomRegistry;
use serde_json::json;
use tower_http::{cors::CorsLayer, services::ServeDir};

/// Application state shared across all handlers and WebSocket
/// connections. Cloned per request; cheap due to the Arc wrapper.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<RoomRegistry>,
}

/// Create the complete router with all endpoints and middleware.
///
/// Requests that match no route fall through to the static file service,
/// which serves the browser client from `static_dir`.
pub fn create_router(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // The websocket route reads the player name from its query string.
        .route("/ws/{room_id}", get(websocket::websocket_handler))
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint for monitoring and load balancers.
///
/// # Example
///
/// ```bash
/// curl http://localhost:8000/health
/// # {"status":"healthy","rooms":{"active_count":3},"timestamp":"2026-08-25T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let room_count = state.registry.room_count().await;

    let response = json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "rooms": {
            "active_count": room_count
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (StatusCode::OK, Json(response))
}
