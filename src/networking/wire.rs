//! JSON presence messages.
//!
//! Incoming, one message per line:
//!
//! ```json
//! {"type":"join","id":"abc"}
//! {"type":"leave","id":"abc"}
//! {"type":"positions","peers":{"abc":{"position":[0,1,2],"rotation":[0,0,0,1]}}}
//! ```
//!
//! Outgoing, the local player's pose as `[[x,y,z],[qx,qy,qz,qw]]`.

use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use tracing::warn;
use crate::world::{ParticipantId, PeerSnapshot, PeerState, Pose, PresenceEvent};
use super::WireResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WireMessage {
    Join { id: ParticipantId },
    Leave { id: ParticipantId },
    /// Peer entries stay untyped until [`peer_snapshot`] so that one badly
    /// shaped entry does not take the rest of the message down with it
    Positions { peers: HashMap<ParticipantId, serde_json::Value> },
}

/// Keep every peer entry that has the `PeerState` shape; log and drop the rest.
pub fn peer_snapshot(peers: HashMap<ParticipantId, serde_json::Value>) -> PeerSnapshot {
    peers
        .into_iter()
        .filter_map(|(id, value)| match serde_json::from_value::<PeerState>(value) {
            Ok(state) => Some((id, state)),
            Err(e) => {
                warn!("Dropping malformed peer entry for {}: {}", id, e);
                None
            }
        })
        .collect()
}

impl From<WireMessage> for PresenceEvent {
    fn from(message: WireMessage) -> Self {
        match message {
            WireMessage::Join { id } => PresenceEvent::Joined(id),
            WireMessage::Leave { id } => PresenceEvent::Left(id),
            WireMessage::Positions { peers } => PresenceEvent::Snapshot(peer_snapshot(peers)),
        }
    }
}

pub fn decode_message(line: &str) -> WireResult<PresenceEvent> {
    let message: WireMessage = serde_json::from_str(line.trim())?;
    Ok(message.into())
}

pub fn encode_player_pose(pose: &Pose) -> String {
    let (position, rotation) = pose.to_wire();
    serde_json::json!([position, rotation]).to_string()
}

/// Emits the player's pose only when it has changed since the last message
#[derive(Debug, Default)]
pub struct PosePublisher {
    last: Option<([f32; 3], [f32; 4])>,
}

impl PosePublisher {
    pub fn next_message(&mut self, pose: &Pose) -> Option<String> {
        let wire = pose.to_wire();
        if self.last == Some(wire) {
            return None;
        }
        self.last = Some(wire);
        Some(encode_player_pose(pose))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_join_and_leave() {
        assert_eq!(
            decode_message(r#"{"type":"join","id":"abc"}"#).unwrap(),
            PresenceEvent::Joined("abc".into())
        );
        assert_eq!(
            decode_message(r#" {"type":"leave","id":"abc"} "#).unwrap(),
            PresenceEvent::Left("abc".into())
        );
    }

    #[test]
    fn test_decode_positions() {
        let line = r#"{"type":"positions","peers":{"abc":{"position":[1,2,3],"rotation":[0,0,0,1]},"def":{"position":[0,0,0],"rotation":[0,1,0,0]}}}"#;
        let PresenceEvent::Snapshot(snapshot) = decode_message(line).unwrap() else {
            panic!("expected a snapshot");
        };
        assert_eq!(snapshot.len(), 2);
        assert_eq!(
            snapshot.get(&"abc".into()),
            Some(&PeerState::new([1.0, 2.0, 3.0], [0.0, 0.0, 0.0, 1.0]))
        );
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_message("not json").is_err());
        assert!(decode_message(r#"{"type":"dance","id":"abc"}"#).is_err());
        assert!(decode_message(r#"{"type":"positions","peers":[]}"#).is_err());
    }

    #[test]
    fn test_bad_peer_entry_does_not_drop_the_others() {
        let line = concat!(
            r#"{"type":"positions","peers":{"#,
            r#""alice":{"position":[1,2,3],"rotation":[0,0,0,1]},"#,
            r#""bob":{"position":[1,2,3],"rotation":[0,0,1]},"#,
            r#""carol":null,"#,
            r#""dave":"here""#,
            r#"}}"#,
        );
        let PresenceEvent::Snapshot(snapshot) = decode_message(line).unwrap() else {
            panic!("expected a snapshot");
        };
        assert_eq!(snapshot.len(), 1);
        assert_eq!(
            snapshot.get(&"alice".into()),
            Some(&PeerState::new([1.0, 2.0, 3.0], [0.0, 0.0, 0.0, 1.0]))
        );
        assert!(snapshot.get(&"bob".into()).is_none());
    }

    #[test]
    fn test_encode_player_pose() {
        let pose = Pose::from_wire([1.0, 2.0, 3.0], [0.0, 0.0, 0.0, 1.0]).unwrap();
        assert_eq!(encode_player_pose(&pose), "[[1.0,2.0,3.0],[0.0,0.0,0.0,1.0]]");
    }

    #[test]
    fn test_publisher_skips_unchanged_pose() {
        let mut publisher = PosePublisher::default();
        let pose = Pose::from_wire([1.0, 2.0, 3.0], [0.0, 0.0, 0.0, 1.0]).unwrap();
        assert!(publisher.next_message(&pose).is_some());
        assert!(publisher.next_message(&pose).is_none());

        let moved = Pose::from_wire([1.0, 2.0, 3.5], [0.0, 0.0, 0.0, 1.0]).unwrap();
        assert!(publisher.next_message(&moved).is_some());
    }
}
