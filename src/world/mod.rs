//! Presence state for the shared room
//!
//! Everything a remote participant contributes to the local scene lives here:
//! identities, poses, the events the network layer delivers, and the avatar
//! registry that keeps renderables in step with those poses.

pub mod avatar;
pub mod events;
pub mod pose;
pub mod registry;

pub use avatar::{AvatarAppearance, AvatarEntry, PLACEHOLDER_HEAD_MESH};
pub use events::{PeerSnapshot, PeerState, PresenceEvent};
pub use pose::{Pose, PoseError};
pub use registry::{AvatarRegistry, LoadOutcome, ReconcileReport};

use crate::assets::AssetLoadError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Opaque identity of a remote participant, stable for the duration of
/// their presence in the room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identity used when the local viewer's own data is at fault
    pub fn local_viewer() -> Self {
        Self("local".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ParticipantId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PresenceError {
    #[error("Participant {id} is already registered")]
    DuplicateParticipant { id: ParticipantId },

    #[error("Participant {id} is not registered")]
    UnknownParticipant { id: ParticipantId },

    #[error("Malformed pose for {id}: {reason}")]
    MalformedPose { id: ParticipantId, reason: PoseError },

    #[error("Asset load failed for {id}: {source}")]
    AssetLoadFailure { id: ParticipantId, source: AssetLoadError },
}

impl PresenceError {
    /// Contract violations by the caller, as opposed to bad data
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            PresenceError::DuplicateParticipant { .. } | PresenceError::UnknownParticipant { .. }
        )
    }
}

pub type PresenceResult<T> = Result<T, PresenceError>;
