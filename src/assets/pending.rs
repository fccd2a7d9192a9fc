use crossbeam_channel::{unbounded, Receiver, Sender};
use crate::rendering::scene::{Renderable, Transform};
use crate::world::ParticipantId;
use super::AssetLoadError;

/// What a finished load is for
#[derive(Debug, Clone, PartialEq)]
pub enum LoadTarget {
    /// Static room furniture, placed with a fixed transform
    Furniture { name: String, transform: Transform },
    /// Replacement model for the placeholder of one particular avatar entry
    Avatar { id: ParticipantId, generation: u64 },
}

#[derive(Debug, Clone)]
pub struct LoadCompletion {
    pub target: LoadTarget,
    pub result: Result<Renderable, AssetLoadError>,
}

/// Handed to every spawned load task
#[derive(Clone)]
pub struct CompletionSender {
    tx: Sender<LoadCompletion>,
}

impl CompletionSender {
    /// Deliver a result. A closed receiver means the room is gone, so the
    /// result is dropped.
    pub fn complete(&self, completion: LoadCompletion) -> bool {
        self.tx.send(completion).is_ok()
    }
}

pub struct CompletionReceiver {
    rx: Receiver<LoadCompletion>,
}

impl CompletionReceiver {
    /// Everything that finished since the last call
    pub fn drain(&self) -> Vec<LoadCompletion> {
        self.rx.try_iter().collect()
    }
}

pub fn completion_channel() -> (CompletionSender, CompletionReceiver) {
    let (tx, rx) = unbounded();
    (CompletionSender { tx }, CompletionReceiver { rx })
}
