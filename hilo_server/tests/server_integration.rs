//! Integration tests for HTTP server functionality.
//!
//! Drives the router directly with `tower::ServiceExt::oneshot`; no real
//! socket is opened.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use hilo::{RoomConfig, RoomRegistry};
use http_body_util::BodyExt;
use hilo_server::api::{AppState, create_router};
use tokio::time::timeout;
use tower::ServiceExt; // For `oneshot` method

fn create_test_server() -> (axum::Router, Arc<RoomRegistry>) {
    let registry = Arc::new(RoomRegistry::new(RoomConfig::default()));
    let state = AppState {
        registry: registry.clone(),
    };
    let app = create_router(state, Path::new("public"));
    (app, registry)
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check_endpoint() {
    let (app, _) = create_test_server();

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let health: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["rooms"]["active_count"], 0);
}

#[tokio::test]
async fn test_health_check_completes_quickly() {
    let (app, _) = create_test_server();

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let result = timeout(Duration::from_secs(5), app.oneshot(request)).await;

    assert!(result.is_ok(), "Request should complete within timeout");
    assert_eq!(result.unwrap().unwrap().status(), StatusCode::OK);
}

// ============================================================================
// WebSocket Upgrade Tests
// ============================================================================

#[tokio::test]
async fn test_websocket_requires_upgrade_headers() {
    let (app, _) = create_test_server();

    // A plain GET without the upgrade handshake must be rejected.
    let request = Request::builder()
        .uri("/ws/lobby?name=ada")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert!(
        response.status().is_client_error(),
        "non-upgrade request should be rejected, got {}",
        response.status()
    );
}

#[tokio::test]
async fn test_websocket_requires_player_name() {
    let (app, _) = create_test_server();

    let request = Request::builder()
        .uri("/ws/lobby")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    // Missing `name` query fails extraction before any upgrade logic.
    assert!(
        response.status().is_client_error(),
        "missing name should be rejected, got {}",
        response.status()
    );
}

// ============================================================================
// Error Handling Tests
// ============================================================================

#[tokio::test]
async fn test_404_for_unknown_path() {
    let (app, _) = create_test_server();

    let request = Request::builder()
        .uri("/no/such/file.js")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// CORS Tests
// ============================================================================

#[tokio::test]
async fn test_cors_headers_present() {
    let (app, _) = create_test_server();

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://example.com")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin"),
        "CORS headers should be present"
    );
}

// ============================================================================
// Concurrent Request Tests
// ============================================================================

#[tokio::test]
async fn test_concurrent_health_checks() {
    let (app, _) = create_test_server();

    let mut handles = Vec::new();

    for _ in 0..10 {
        let app_clone = app.clone();
        let handle = tokio::spawn(async move {
            let request = Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap();
            app_clone.oneshot(request).await
        });
        handles.push(handle);
    }

    for handle in handles {
        let response = handle.await.expect("Task should complete").unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

// ============================================================================
// Registry Wiring Tests
// ============================================================================

#[tokio::test]
async fn test_health_reports_room_count() {
    let (app, registry) = create_test_server();

    let player = hilo::PlayerId::new_v4();
    let (tx, _rx) = tokio::sync::mpsc::channel(8);
    registry
        .join_or_create("kitchen-table", player, "ada".to_string(), tx)
        .await
        .unwrap();

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let health: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(health["rooms"]["active_count"], 1);
}
