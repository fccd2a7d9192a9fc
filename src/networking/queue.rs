use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::trace;
use crate::world::{ParticipantId, PeerSnapshot, PresenceEvent};
use super::{WireError, WireResult};

/// Producer side of the presence queue.
///
/// Deliberately not `Clone`: there is exactly one network producer.
pub struct PresenceSender {
    tx: Sender<PresenceEvent>,
}

impl PresenceSender {
    pub fn send(&self, event: PresenceEvent) -> WireResult<()> {
        trace!("Queueing presence event: {}", event.kind());
        self.tx.send(event).map_err(|_| WireError::QueueClosed)
    }

    pub fn participant_joined(&self, id: impl Into<ParticipantId>) -> WireResult<()> {
        self.send(PresenceEvent::Joined(id.into()))
    }

    pub fn participant_left(&self, id: impl Into<ParticipantId>) -> WireResult<()> {
        self.send(PresenceEvent::Left(id.into()))
    }

    pub fn deliver_snapshot(&self, snapshot: PeerSnapshot) -> WireResult<()> {
        self.send(PresenceEvent::Snapshot(snapshot))
    }
}

/// Consumer side, owned by the room
pub struct PresenceReceiver {
    rx: Receiver<PresenceEvent>,
}

impl PresenceReceiver {
    /// Everything queued since the last call, in arrival order
    pub fn drain(&self) -> Vec<PresenceEvent> {
        self.rx.try_iter().collect()
    }

    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}

pub fn presence_channel() -> (PresenceSender, PresenceReceiver) {
    let (tx, rx) = unbounded();
    (PresenceSender { tx }, PresenceReceiver { rx })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::PeerState;

    #[test]
    fn test_drain_preserves_order() {
        let (sender, receiver) = presence_channel();
        sender.participant_joined("alice").unwrap();
        sender
            .deliver_snapshot(PeerSnapshot::new().with("alice", PeerState::new([1.0, 0.0, 0.0], [0.0, 0.0, 0.0, 1.0])))
            .unwrap();
        sender.participant_left("alice").unwrap();
        assert_eq!(receiver.pending(), 3);

        let kinds: Vec<_> = receiver.drain().iter().map(|e| e.kind()).collect();
        assert_eq!(kinds, vec!["joined", "snapshot", "left"]);
        assert!(receiver.drain().is_empty());
    }

    #[test]
    fn test_send_after_receiver_dropped() {
        let (sender, receiver) = presence_channel();
        drop(receiver);
        assert_eq!(sender.participant_joined("alice"), Err(WireError::QueueClosed));
    }

    #[test]
    fn test_sender_moves_across_threads() {
        let (sender, receiver) = presence_channel();
        std::thread::spawn(move || {
            for i in 0..10 {
                sender.participant_joined(format!("peer-{}", i)).unwrap();
            }
        })
        .join()
        .unwrap();
        assert_eq!(receiver.drain().len(), 10);
    }
}
