//! Hand-off between the network layer and the render thread.
//!
//! The transport (stdin feed, websocket, whatever delivers presence) decodes
//! messages with [`wire`] and pushes them through the single-producer
//! [`queue`]. The room drains the queue once per tick, so all presence state
//! is only ever written from the render thread.

pub mod feed;
pub mod queue;
pub mod wire;

pub use feed::{pump_lines, FeedStats};
pub use queue::{presence_channel, PresenceReceiver, PresenceSender};
pub use wire::{decode_message, encode_player_pose, PosePublisher, WireMessage};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WireError {
    #[error("Message decode failed: {reason}")]
    Decode { reason: String },

    #[error("Presence queue closed")]
    QueueClosed,
}

pub type WireResult<T> = Result<T, WireError>;

impl From<serde_json::Error> for WireError {
    fn from(err: serde_json::Error) -> Self {
        WireError::Decode { reason: err.to_string() }
    }
}
