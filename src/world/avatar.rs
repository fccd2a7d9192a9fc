use crate::rendering::scene::{Renderable, RenderableHandle};
use super::{ParticipantId, Pose};

/// Mesh used until a participant's own model has loaded: a 1.5 x 1 x 0.5 box
/// with the participant's video feed on its front face.
pub const PLACEHOLDER_HEAD_MESH: &str = "box:1.5x1x0.5";

/// What an avatar looks like
#[derive(Debug, Clone, PartialEq)]
pub struct AvatarAppearance {
    pub mesh_id: String,
    /// Video element shown on the head, `<id>_video`
    pub video_feed: String,
}

impl AvatarAppearance {
    pub fn placeholder(id: &ParticipantId) -> Self {
        Self {
            mesh_id: PLACEHOLDER_HEAD_MESH.to_string(),
            video_feed: format!("{}_video", id),
        }
    }

    pub fn renderable(&self) -> Renderable {
        Renderable::new(self.mesh_id.clone(), self.video_feed.clone())
    }

    pub fn assign_mesh(&mut self, mesh_id: impl Into<String>) {
        self.mesh_id = mesh_id.into();
    }
}

/// One remote participant as the registry sees them.
///
/// The entry and its renderable live and die together; only the registry
/// creates or drops entries.
#[derive(Debug, Clone, PartialEq)]
pub struct AvatarEntry {
    pub(crate) id: ParticipantId,
    /// Distinguishes this entry from earlier ones for the same id
    pub(crate) generation: u64,
    pub(crate) renderable: RenderableHandle,
    pub(crate) last_pose: Pose,
    pub(crate) appearance: AvatarAppearance,
}

impl AvatarEntry {
    pub fn id(&self) -> &ParticipantId {
        &self.id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn renderable(&self) -> RenderableHandle {
        self.renderable
    }

    pub fn last_pose(&self) -> Pose {
        self.last_pose
    }

    pub fn appearance(&self) -> &AvatarAppearance {
        &self.appearance
    }
}
