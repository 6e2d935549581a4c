//! HTTP/WebSocket server for the hilo card game.
//!
//! Rooms live inside a [`hilo::RoomRegistry`]; this crate only adds the
//! transport around it: a websocket endpoint per room, a health check,
//! static file serving for the browser client, and the usual operational
//! plumbing (config, logging, metrics).

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
