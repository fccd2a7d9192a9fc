//! Asynchronous model loading for furniture and avatars.
//!
//! Loads run on the tokio runtime and never block the frame loop. Their
//! results come back through a [`pending::CompletionReceiver`] that the room
//! drains once per tick.

pub mod cache;
pub mod manager;
pub mod model;
pub mod pending;

pub use manager::AssetLoader;
pub use model::ModelLoader;
pub use pending::{completion_channel, CompletionReceiver, CompletionSender, LoadCompletion, LoadTarget};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetLoadError {
    #[error("Asset not found: {path}")]
    NotFound { path: String },

    #[error("Failed to read {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("Failed to decode {path}: {reason}")]
    Decode { path: String, reason: String },
}
