use super::ParticipantId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Events sent from the network layer to the room.
///
/// These are plain data; the room applies them once per tick on the render
/// thread.
#[derive(Debug, Clone, PartialEq)]
pub enum PresenceEvent {
    /// A participant entered the room. Their pose may not be known yet.
    Joined(ParticipantId),
    /// A participant left the room
    Left(ParticipantId),
    /// Latest known poses for some or all participants
    Snapshot(PeerSnapshot),
}

/// Raw per-participant state as delivered by the server.
///
/// Nothing here is validated; validation happens when the snapshot is
/// reconciled so that one bad entry only affects its own participant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeerState {
    pub position: [f32; 3],
    /// Quaternion, `[x, y, z, w]`
    pub rotation: [f32; 4],
}

impl PeerState {
    pub fn new(position: [f32; 3], rotation: [f32; 4]) -> Self {
        Self { position, rotation }
    }
}

/// One synchronization tick worth of peer state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerSnapshot {
    peers: HashMap<ParticipantId, PeerState>,
}

impl PeerSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<ParticipantId>, state: PeerState) {
        self.peers.insert(id.into(), state);
    }

    pub fn with(mut self, id: impl Into<ParticipantId>, state: PeerState) -> Self {
        self.insert(id, state);
        self
    }

    pub fn get(&self, id: &ParticipantId) -> Option<&PeerState> {
        self.peers.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ParticipantId, &PeerState)> {
        self.peers.iter()
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

impl FromIterator<(ParticipantId, PeerState)> for PeerSnapshot {
    fn from_iter<T: IntoIterator<Item = (ParticipantId, PeerState)>>(iter: T) -> Self {
        Self {
            peers: iter.into_iter().collect(),
        }
    }
}

impl PresenceEvent {
    /// Short label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            PresenceEvent::Joined(_) => "joined",
            PresenceEvent::Left(_) => "left",
            PresenceEvent::Snapshot(_) => "snapshot",
        }
    }
}
