//! Transform store and avatar registry.
//!
//! The registry is the only owner of per-participant state. It never talks to
//! the network and never creates an entry on its own: joins and leaves are
//! explicit calls, and pose snapshots only touch participants that already
//! exist.

use std::collections::HashMap;
use tracing::{debug, error, info, warn};
use crate::assets::AssetLoadError;
use crate::rendering::scene::{Renderable, RenderableHandle, SceneComposition};
use super::avatar::{AvatarAppearance, AvatarEntry};
use super::events::PeerSnapshot;
use super::{ParticipantId, Pose, PresenceError, PresenceResult};

/// Outcome of applying one snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileReport {
    /// Registered participants whose pose was updated
    pub applied: usize,
    /// Snapshot entries for participants that are not registered
    pub ignored: usize,
    /// Per-participant rejections; every other entry was still applied
    pub rejected: Vec<PresenceError>,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Result of an asynchronous avatar model load
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// The model replaced the placeholder
    Attached(RenderableHandle),
    /// The participant left (or left and re-joined) before the load finished
    Discarded,
    /// The load failed and the placeholder stays
    Failed(PresenceError),
}

#[derive(Debug, Default)]
pub struct AvatarRegistry {
    entries: HashMap<ParticipantId, AvatarEntry>,
    /// Bumped on every successful add
    next_generation: u64,
}

impl AvatarRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a participant and put their placeholder avatar in the scene.
    ///
    /// Fails with `DuplicateParticipant` if `id` is already registered, in
    /// which case neither the registry nor the scene is touched.
    pub fn add_participant(
        &mut self,
        scene: &mut dyn SceneComposition,
        id: ParticipantId,
    ) -> PresenceResult<RenderableHandle> {
        if self.entries.contains_key(&id) {
            return Err(PresenceError::DuplicateParticipant { id });
        }

        let appearance = AvatarAppearance::placeholder(&id);
        let renderable = scene.insert(appearance.renderable());
        self.next_generation += 1;
        let generation = self.next_generation;
        info!("👤 Adding avatar for {} (renderable {}, generation {})", id, renderable.id(), generation);

        self.entries.insert(
            id.clone(),
            AvatarEntry {
                id,
                generation,
                renderable,
                last_pose: Pose::neutral(),
                appearance,
            },
        );
        Ok(renderable)
    }

    /// Drop a participant and take their avatar out of the scene.
    pub fn remove_participant(
        &mut self,
        scene: &mut dyn SceneComposition,
        id: &ParticipantId,
    ) -> PresenceResult<()> {
        let entry = self
            .entries
            .remove(id)
            .ok_or_else(|| PresenceError::UnknownParticipant { id: id.clone() })?;

        info!("👤 Removing avatar for {}", id);
        if scene.remove(entry.renderable).is_none() {
            // The scene lost it on its own; the entry is released either way
            error!("Avatar renderable {} for {} was already gone from the scene", entry.renderable.id(), id);
        }
        Ok(())
    }

    /// Apply one snapshot of peer poses.
    ///
    /// Registered participants get their pose overwritten and pushed to their
    /// renderable. Unknown ids are ignored, and registered participants that
    /// are missing from the snapshot keep their last pose.
    pub fn reconcile(&mut self, scene: &mut dyn SceneComposition, snapshot: &PeerSnapshot) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        for (id, state) in snapshot.iter() {
            let Some(entry) = self.entries.get_mut(id) else {
                report.ignored += 1;
                continue;
            };

            let pose = match Pose::from_wire(state.position, state.rotation) {
                Ok(pose) => pose,
                Err(reason) => {
                    warn!("Rejecting pose update for {}: {}", id, reason);
                    report.rejected.push(PresenceError::MalformedPose { id: id.clone(), reason });
                    continue;
                }
            };

            entry.last_pose = pose;
            match scene.transform_mut(entry.renderable) {
                Some(transform) => {
                    transform.position = pose.position();
                    transform.rotation = pose.orientation();
                }
                None => error!("Avatar renderable {} for {} is missing from the scene", entry.renderable.id(), id),
            }
            report.applied += 1;
        }

        if report.ignored > 0 {
            debug!("Snapshot carried {} unregistered participants", report.ignored);
        }
        report
    }

    /// Finish an avatar model load started for the entry of `generation`.
    ///
    /// The participant may have left while the load was in flight, or left
    /// and joined again under a new entry; either way the result is dropped
    /// without error.
    pub fn complete_model_load(
        &mut self,
        scene: &mut dyn SceneComposition,
        id: &ParticipantId,
        generation: u64,
        result: Result<Renderable, AssetLoadError>,
    ) -> LoadOutcome {
        let Some(entry) = self.entries.get_mut(id).filter(|entry| entry.generation == generation) else {
            debug!("Dropping model load for departed participant {} (generation {})", id, generation);
            return LoadOutcome::Discarded;
        };

        let mut model = match result {
            Ok(model) => model,
            Err(source) => {
                warn!("Avatar model for {} failed to load, keeping placeholder: {}", id, source);
                return LoadOutcome::Failed(PresenceError::AssetLoadFailure { id: id.clone(), source });
            }
        };

        model.transform.position = entry.last_pose.position();
        model.transform.rotation = entry.last_pose.orientation();
        // The video feed stays attached to whichever mesh the avatar uses
        model.material_id = entry.appearance.video_feed.clone();
        entry.appearance.assign_mesh(model.mesh_id.clone());

        let handle = scene.insert(model);
        if scene.remove(entry.renderable).is_none() {
            error!("Placeholder renderable {} for {} was already gone from the scene", entry.renderable.id(), id);
        }
        entry.renderable = handle;
        info!("👤 Attached model {} to {}", entry.appearance.mesh_id, id);
        LoadOutcome::Attached(handle)
    }

    /// Read-only copy of every participant's last pose
    pub fn get_all(&self) -> HashMap<ParticipantId, Pose> {
        self.entries
            .iter()
            .map(|(id, entry)| (id.clone(), entry.last_pose))
            .collect()
    }

    /// Generation of the participant's current entry
    pub fn generation(&self, id: &ParticipantId) -> Option<u64> {
        self.entries.get(id).map(|entry| entry.generation)
    }

    pub fn get(&self, id: &ParticipantId) -> Option<&AvatarEntry> {
        self.entries.get(id)
    }

    pub fn pose(&self, id: &ParticipantId) -> Option<Pose> {
        self.entries.get(id).map(|entry| entry.last_pose)
    }

    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::scene::SceneGraph;
    use crate::world::events::PeerState;
    use cgmath::Vector3;

    fn id(s: &str) -> ParticipantId {
        ParticipantId::from(s)
    }

    #[test]
    fn test_add_then_remove_leaves_nothing_behind() {
        let mut scene = SceneGraph::new();
        let mut registry = AvatarRegistry::new();

        let handle = registry.add_participant(&mut scene, id("alice")).unwrap();
        assert!(scene.contains(handle));
        assert_eq!(registry.pose(&id("alice")), Some(Pose::neutral()));

        registry.remove_participant(&mut scene, &id("alice")).unwrap();
        assert!(registry.is_empty());
        assert!(scene.is_empty());
    }

    #[test]
    fn test_duplicate_add_is_rejected_atomically() {
        let mut scene = SceneGraph::new();
        let mut registry = AvatarRegistry::new();
        let first = registry.add_participant(&mut scene, id("alice")).unwrap();

        let err = registry.add_participant(&mut scene, id("alice")).unwrap_err();
        assert_eq!(err, PresenceError::DuplicateParticipant { id: id("alice") });
        assert!(err.is_contract_violation());
        assert_eq!(registry.len(), 1);
        assert_eq!(scene.len(), 1);
        assert_eq!(registry.get(&id("alice")).unwrap().renderable(), first);
    }

    #[test]
    fn test_remove_unknown_fails() {
        let mut scene = SceneGraph::new();
        let mut registry = AvatarRegistry::new();
        assert_eq!(
            registry.remove_participant(&mut scene, &id("ghost")),
            Err(PresenceError::UnknownParticipant { id: id("ghost") })
        );

        registry.add_participant(&mut scene, id("bob")).unwrap();
        registry.remove_participant(&mut scene, &id("bob")).unwrap();
        // Second leave for the same id is a contract violation too
        assert!(registry.remove_participant(&mut scene, &id("bob")).is_err());
    }

    #[test]
    fn test_reconcile_moves_renderable() {
        let mut scene = SceneGraph::new();
        let mut registry = AvatarRegistry::new();
        let handle = registry.add_participant(&mut scene, id("alice")).unwrap();

        let snapshot = PeerSnapshot::new().with("alice", PeerState::new([1.0, 2.0, 3.0], [0.0, 0.0, 0.0, 1.0]));
        let report = registry.reconcile(&mut scene, &snapshot);

        assert_eq!(report.applied, 1);
        assert!(report.is_clean());
        assert_eq!(scene.get(handle).unwrap().transform.position, Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(registry.pose(&id("alice")).unwrap().position(), Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_reconcile_unknown_id_is_a_no_op() {
        let mut scene = SceneGraph::new();
        let mut registry = AvatarRegistry::new();

        let snapshot = PeerSnapshot::new().with("stranger", PeerState::new([5.0, 0.0, 5.0], [0.0, 0.0, 0.0, 1.0]));
        let report = registry.reconcile(&mut scene, &snapshot);

        assert_eq!(report, ReconcileReport { applied: 0, ignored: 1, rejected: vec![] });
        assert!(registry.is_empty());
        assert!(scene.is_empty());
    }

    #[test]
    fn test_absent_participant_keeps_last_pose() {
        let mut scene = SceneGraph::new();
        let mut registry = AvatarRegistry::new();
        registry.add_participant(&mut scene, id("alice")).unwrap();
        registry.add_participant(&mut scene, id("bob")).unwrap();

        let first = PeerSnapshot::new()
            .with("alice", PeerState::new([1.0, 0.0, 0.0], [0.0, 0.0, 0.0, 1.0]))
            .with("bob", PeerState::new([2.0, 0.0, 0.0], [0.0, 0.0, 0.0, 1.0]));
        registry.reconcile(&mut scene, &first);

        let second = PeerSnapshot::new().with("alice", PeerState::new([9.0, 0.0, 0.0], [0.0, 0.0, 0.0, 1.0]));
        registry.reconcile(&mut scene, &second);

        assert!(registry.contains(&id("bob")));
        assert_eq!(registry.pose(&id("bob")).unwrap().position(), Vector3::new(2.0, 0.0, 0.0));
        assert_eq!(registry.pose(&id("alice")).unwrap().position(), Vector3::new(9.0, 0.0, 0.0));
    }

    #[test]
    fn test_malformed_pose_only_affects_its_participant() {
        let mut scene = SceneGraph::new();
        let mut registry = AvatarRegistry::new();
        registry.add_participant(&mut scene, id("alice")).unwrap();
        registry.add_participant(&mut scene, id("bob")).unwrap();

        let snapshot = PeerSnapshot::new()
            .with("alice", PeerState::new([f32::NAN, 0.0, 0.0], [0.0, 0.0, 0.0, 1.0]))
            .with("bob", PeerState::new([3.0, 0.0, 0.0], [0.0, 0.0, 0.0, 0.0]))
            .with("carol", PeerState::new([0.0; 3], [0.0, 0.0, 0.0, 1.0]));
        registry.add_participant(&mut scene, id("carol")).unwrap();

        let report = registry.reconcile(&mut scene, &snapshot);
        assert_eq!(report.applied, 1);
        assert_eq!(report.rejected.len(), 2);
        assert!(report
            .rejected
            .iter()
            .all(|e| matches!(e, PresenceError::MalformedPose { .. })));
        assert_eq!(registry.pose(&id("alice")), Some(Pose::neutral()));
        assert_eq!(registry.pose(&id("bob")), Some(Pose::neutral()));
    }

    #[test]
    fn test_model_load_for_departed_participant_is_discarded() {
        let mut scene = SceneGraph::new();
        let mut registry = AvatarRegistry::new();
        registry.add_participant(&mut scene, id("alice")).unwrap();
        let generation = registry.generation(&id("alice")).unwrap();
        registry.remove_participant(&mut scene, &id("alice")).unwrap();

        let outcome =
            registry.complete_model_load(&mut scene, &id("alice"), generation, Ok(Renderable::new("alice.glb", "model")));
        assert_eq!(outcome, LoadOutcome::Discarded);
        assert!(scene.is_empty());
    }

    #[test]
    fn test_model_load_replaces_placeholder() {
        let mut scene = SceneGraph::new();
        let mut registry = AvatarRegistry::new();
        let placeholder = registry.add_participant(&mut scene, id("alice")).unwrap();
        registry.reconcile(
            &mut scene,
            &PeerSnapshot::new().with("alice", PeerState::new([4.0, 0.0, 1.0], [0.0, 0.0, 0.0, 1.0])),
        );

        let generation = registry.generation(&id("alice")).unwrap();
        let outcome =
            registry.complete_model_load(&mut scene, &id("alice"), generation, Ok(Renderable::new("alice.glb", "model")));
        let LoadOutcome::Attached(handle) = outcome else {
            panic!("expected attachment, got {:?}", outcome);
        };

        assert!(!scene.contains(placeholder));
        assert_eq!(scene.len(), 1);
        let model = scene.get(handle).unwrap();
        assert_eq!(model.mesh_id, "alice.glb");
        assert_eq!(model.material_id, "alice_video");
        assert_eq!(model.transform.position, Vector3::new(4.0, 0.0, 1.0));

        // Removing afterwards releases the model, not the old placeholder
        registry.remove_participant(&mut scene, &id("alice")).unwrap();
        assert!(scene.is_empty());
    }

    #[test]
    fn test_failed_model_load_keeps_placeholder() {
        let mut scene = SceneGraph::new();
        let mut registry = AvatarRegistry::new();
        let placeholder = registry.add_participant(&mut scene, id("alice")).unwrap();

        let error = AssetLoadError::NotFound { path: "alice.glb".to_string() };
        let generation = registry.generation(&id("alice")).unwrap();
        let outcome = registry.complete_model_load(&mut scene, &id("alice"), generation, Err(error.clone()));
        assert_eq!(
            outcome,
            LoadOutcome::Failed(PresenceError::AssetLoadFailure { id: id("alice"), source: error })
        );
        assert!(scene.contains(placeholder));
    }

    #[test]
    fn test_stale_model_load_after_rejoin_is_discarded() {
        let mut scene = SceneGraph::new();
        let mut registry = AvatarRegistry::new();
        registry.add_participant(&mut scene, id("alice")).unwrap();
        let first = registry.generation(&id("alice")).unwrap();
        registry.remove_participant(&mut scene, &id("alice")).unwrap();

        let placeholder = registry.add_participant(&mut scene, id("alice")).unwrap();
        let second = registry.generation(&id("alice")).unwrap();
        assert_ne!(first, second);

        // The load started for the first entry lands after the re-join
        let stale = registry.complete_model_load(&mut scene, &id("alice"), first, Ok(Renderable::new("old.glb", "model")));
        assert_eq!(stale, LoadOutcome::Discarded);
        assert_eq!(registry.get(&id("alice")).unwrap().renderable(), placeholder);
        assert_eq!(scene.len(), 1);

        let fresh = registry.complete_model_load(&mut scene, &id("alice"), second, Ok(Renderable::new("new.glb", "model")));
        let LoadOutcome::Attached(handle) = fresh else {
            panic!("expected attachment, got {:?}", fresh);
        };
        assert!(!scene.contains(placeholder));
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.get(handle).unwrap().mesh_id, "new.glb");
    }

    #[test]
    fn test_model_load_survives_missing_placeholder() {
        let mut scene = SceneGraph::new();
        let mut registry = AvatarRegistry::new();
        let placeholder = registry.add_participant(&mut scene, id("alice")).unwrap();
        let generation = registry.generation(&id("alice")).unwrap();
        // Something else took the placeholder out of the scene
        scene.remove(placeholder);

        let outcome =
            registry.complete_model_load(&mut scene, &id("alice"), generation, Ok(Renderable::new("alice.glb", "model")));
        assert!(matches!(outcome, LoadOutcome::Attached(_)));
        assert_eq!(scene.len(), 1);
        assert_ne!(registry.get(&id("alice")).unwrap().renderable(), placeholder);
    }
}
