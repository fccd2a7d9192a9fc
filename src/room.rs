//! The shared room: presence state, scene and frame loop wired together.
//!
//! A `Room` is driven from a single thread. Everything that happens elsewhere
//! (network messages, finished model loads) arrives through queues that are
//! drained at the start of each frame.

use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, error, info, warn};
use crate::assets::{
    completion_channel, AssetLoader, CompletionReceiver, CompletionSender, LoadCompletion, LoadTarget,
};
use crate::audio::AudioLayer;
use crate::config::{BackdropSettings, FurniturePiece, RoomSettings};
use crate::rendering::light::Environment;
use crate::rendering::scene::{Renderable, RenderableHandle, SceneComposition, SceneGraph, Transform};
use crate::rendering::{FrameReport, FrameScheduler, FrameSignal, FrameTargets, ViewpointControl};
use crate::networking::PresenceReceiver;
use crate::utils::math::{vec3_from_array, yaw_rotation};
use crate::world::{
    AvatarRegistry, LoadOutcome, ParticipantId, PeerSnapshot, Pose, PoseError, PresenceError,
    PresenceEvent, PresenceResult, ReconcileReport,
};

/// What the start-of-frame drain did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrainReport {
    pub events: usize,
    pub poses_applied: usize,
    pub loads_completed: usize,
    pub errors: Vec<PresenceError>,
}

struct AssetPipeline {
    loader: Arc<dyn AssetLoader<Renderable>>,
    runtime: Handle,
}

pub struct Room<V: ViewpointControl, A: AudioLayer> {
    registry: AvatarRegistry,
    scene: SceneGraph,
    viewpoint: V,
    audio: A,
    scheduler: FrameScheduler,
    presence: PresenceReceiver,
    completions: CompletionReceiver,
    completion_tx: CompletionSender,
    assets: Option<AssetPipeline>,
    avatar_model: Option<PathBuf>,
}

fn backdrop_renderable(backdrop: &BackdropSettings) -> Renderable {
    Renderable::new(format!("sphere:{}", backdrop.radius), format!("texture:{}", backdrop.texture))
        .with_transform(Transform::at(vec3_from_array(backdrop.position)).with_rotation(yaw_rotation(backdrop.yaw)))
}

fn furniture_transform(piece: &FurniturePiece) -> Transform {
    Transform::at(vec3_from_array(piece.position))
        .with_rotation(yaw_rotation(piece.yaw))
        .with_scale(vec3_from_array(piece.scale))
}

impl<V: ViewpointControl, A: AudioLayer> Room<V, A> {
    pub fn new(settings: &RoomSettings, viewpoint: V, audio: A, presence: PresenceReceiver) -> Self {
        let mut scene = SceneGraph::new().with_environment(Environment::from_settings(&settings.environment));
        if let Some(backdrop) = &settings.environment.backdrop {
            scene.insert(backdrop_renderable(backdrop));
        }
        let (completion_tx, completions) = completion_channel();

        Self {
            registry: AvatarRegistry::new(),
            scene,
            viewpoint,
            audio,
            scheduler: FrameScheduler::new(&settings.attenuation),
            presence,
            completions,
            completion_tx,
            assets: None,
            avatar_model: settings.assets.avatar_model.as_ref().map(PathBuf::from),
        }
    }

    /// Enable asynchronous model loading on `runtime`.
    pub fn with_assets(mut self, loader: Arc<dyn AssetLoader<Renderable>>, runtime: Handle) -> Self {
        self.assets = Some(AssetPipeline { loader, runtime });
        self
    }

    fn spawn_load(&self, target: LoadTarget, path: PathBuf) -> bool {
        let Some(assets) = &self.assets else {
            warn!("No asset loader configured, not loading {:?}", path);
            return false;
        };
        let loader = Arc::clone(&assets.loader);
        let tx = self.completion_tx.clone();
        assets.runtime.spawn(async move {
            let result = loader.load(&path).await;
            if !tx.complete(LoadCompletion { target, result }) {
                debug!("Room closed before {:?} finished loading", path);
            }
        });
        true
    }

    /// Start loading the static room furniture. Returns how many loads were
    /// started; each piece appears in the scene once its model has loaded.
    pub fn furnish(&mut self, layout: &[FurniturePiece]) -> usize {
        let started = layout
            .iter()
            .filter(|piece| {
                self.spawn_load(
                    LoadTarget::Furniture {
                        name: piece.name.clone(),
                        transform: furniture_transform(piece),
                    },
                    PathBuf::from(&piece.model),
                )
            })
            .count();
        info!("🪑 Furnishing room: {} of {} pieces loading", started, layout.len());
        started
    }

    pub fn add_participant(&mut self, id: ParticipantId) -> PresenceResult<RenderableHandle> {
        let handle = self.registry.add_participant(&mut self.scene, id.clone())?;
        if let (Some(model), Some(generation)) = (self.avatar_model.clone(), self.registry.generation(&id)) {
            self.spawn_load(LoadTarget::Avatar { id, generation }, model);
        }
        Ok(handle)
    }

    pub fn remove_participant(&mut self, id: &ParticipantId) -> PresenceResult<()> {
        self.registry.remove_participant(&mut self.scene, id)
    }

    pub fn reconcile(&mut self, snapshot: &PeerSnapshot) -> ReconcileReport {
        self.registry.reconcile(&mut self.scene, snapshot)
    }

    /// Apply one presence event, collecting whatever went wrong.
    pub fn apply_event(&mut self, event: PresenceEvent, report: &mut DrainReport) {
        report.events += 1;
        let result = match event {
            PresenceEvent::Joined(id) => self.add_participant(id).map(|_| ()),
            PresenceEvent::Left(id) => self.remove_participant(&id),
            PresenceEvent::Snapshot(snapshot) => {
                let reconciled = self.reconcile(&snapshot);
                report.poses_applied += reconciled.applied;
                report.errors.extend(reconciled.rejected);
                Ok(())
            }
        };
        if let Err(e) = result {
            error!("Presence contract violation: {}", e);
            report.errors.push(e);
        }
    }

    /// Route a finished load to the scene or the avatar it belongs to.
    pub fn handle_completion(&mut self, completion: LoadCompletion) -> Option<LoadOutcome> {
        match completion.target {
            LoadTarget::Furniture { name, transform } => {
                match completion.result {
                    Ok(model) => {
                        self.scene.insert(model.with_transform(transform));
                        info!("🪑 Placed {}", name);
                    }
                    Err(e) => warn!("Could not load {}, leaving its slot empty: {}", name, e),
                }
                None
            }
            LoadTarget::Avatar { id, generation } => {
                Some(self.registry.complete_model_load(&mut self.scene, &id, generation, completion.result))
            }
        }
    }

    /// Apply everything queued since the last frame.
    pub fn drain_pending(&mut self) -> DrainReport {
        let mut report = DrainReport::default();
        for event in self.presence.drain() {
            self.apply_event(event, &mut report);
        }
        for completion in self.completions.drain() {
            report.loads_completed += 1;
            if let Some(LoadOutcome::Failed(e)) = self.handle_completion(completion) {
                report.errors.push(e);
            }
        }
        report
    }

    /// One display refresh: drain queued input, then run the frame steps.
    pub fn frame(&mut self, signal: &dyn FrameSignal) -> FrameReport {
        let drained = self.drain_pending();
        if drained.events > 0 || drained.loads_completed > 0 {
            debug!(
                "Drained {} presence events and {} loads ({} errors)",
                drained.events,
                drained.loads_completed,
                drained.errors.len()
            );
        }

        self.scheduler.tick(FrameTargets {
            viewpoint: &mut self.viewpoint,
            avatars: &self.registry,
            scene: &mut self.scene,
            audio: &mut self.audio,
            signal,
        })
    }

    /// The local player's pose, as published to the server
    pub fn player_pose(&self) -> Result<Pose, PoseError> {
        self.viewpoint.pose()
    }

    pub fn registry(&self) -> &AvatarRegistry {
        &self.registry
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn viewpoint(&self) -> &V {
        &self.viewpoint
    }

    pub fn viewpoint_mut(&mut self) -> &mut V {
        &mut self.viewpoint
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }
}
