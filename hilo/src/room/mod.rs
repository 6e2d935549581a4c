//! Async room actors and the room registry.
//!
//! Each room runs in its own tokio task with an mpsc inbox, so every
//! operation against one room is handled to completion before the next
//! begins while different rooms proceed fully concurrently. The
//! [`RoomRegistry`] owns the id-to-handle map with a create-on-first-join
//! and delete-on-empty lifecycle.

pub mod actor;
pub mod config;
pub mod messages;
pub mod registry;

pub use actor::{RoomActor, RoomHandle};
pub use config::RoomConfig;
pub use messages::{LeaveOutcome, RoomEvent, RoomMessage};
pub use registry::RoomRegistry;
