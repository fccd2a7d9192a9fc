//! The frame loop.
//!
//! One call to [`FrameScheduler::tick`] is one display refresh. Every tick
//! runs the same steps in the same order:
//!
//! 1. advance the frame counter
//! 2. update the viewpoint
//! 3. on every `interval`-th frame, recompute gains and hand them to audio
//! 4. draw the scene once
//! 5. ask the display for the next tick
//!
//! The scheduler never stops itself. A failure in step 3 is logged and that
//! tick's gain update is skipped.

use tracing::{debug, info, warn};
use crate::audio::{AttenuationEngine, AudioLayer};
use crate::config::AttenuationSettings;
use crate::rendering::camera::ViewpointControl;
use crate::rendering::scene::SceneComposition;
use crate::world::{AvatarRegistry, ParticipantId, PresenceError, PresenceResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// No tick has run yet
    NotStarted,
    /// Ticking; there is no way back out
    Running,
}

impl Default for SchedulerState {
    fn default() -> Self {
        SchedulerState::NotStarted
    }
}

impl std::fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchedulerState::NotStarted => write!(f, "NotStarted"),
            SchedulerState::Running => write!(f, "Running"),
        }
    }
}

/// Whatever delivers the display's refresh signal
pub trait FrameSignal {
    fn request_frame(&self);
}

/// Everything one tick reads or writes
pub struct FrameTargets<'a> {
    pub viewpoint: &'a mut dyn ViewpointControl,
    pub avatars: &'a AvatarRegistry,
    pub scene: &'a mut dyn SceneComposition,
    pub audio: &'a mut dyn AudioLayer,
    pub signal: &'a dyn FrameSignal,
}

/// What happened during one tick
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    pub gains_recomputed: bool,
    pub gain_error: Option<PresenceError>,
}

#[derive(Debug)]
pub struct FrameScheduler {
    state: SchedulerState,
    frame_count: u64,
    interval: u64,
    engine: AttenuationEngine,
}

impl FrameScheduler {
    pub fn new(settings: &AttenuationSettings) -> Self {
        Self {
            state: SchedulerState::NotStarted,
            frame_count: 0,
            // An interval of zero would mean "never"; treat it as every frame
            interval: settings.interval_frames.max(1),
            engine: AttenuationEngine::from_settings(settings),
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn is_attenuation_frame(&self, frame: u64) -> bool {
        frame % self.interval == 0
    }

    /// Run one frame.
    pub fn tick(&mut self, targets: FrameTargets<'_>) -> FrameReport {
        if self.state == SchedulerState::NotStarted {
            info!("🎬 Frame loop started (gain interval {} frames)", self.interval);
            self.state = SchedulerState::Running;
        }

        // 1. Advance
        self.frame_count += 1;
        let frame = self.frame_count;

        // 2. Viewpoint
        targets.viewpoint.update();

        // 3. Throttled attenuation
        let mut report = FrameReport {
            frame,
            gains_recomputed: false,
            gain_error: None,
        };
        if self.is_attenuation_frame(frame) {
            match self.recompute_gains(&*targets.viewpoint, targets.avatars) {
                Ok(gains) => {
                    targets.audio.apply_gains(&gains);
                    report.gains_recomputed = true;
                }
                Err(e) => {
                    warn!("Skipping gain update for frame {}: {}", frame, e);
                    report.gain_error = Some(e);
                }
            }
        }

        // 4. Draw
        targets.scene.render(targets.viewpoint.camera());

        // 5. Next tick
        targets.signal.request_frame();

        report
    }

    fn recompute_gains(
        &self,
        viewpoint: &dyn ViewpointControl,
        avatars: &AvatarRegistry,
    ) -> PresenceResult<crate::audio::GainTable> {
        let viewer = viewpoint.pose().map_err(|reason| PresenceError::MalformedPose {
            id: ParticipantId::local_viewer(),
            reason,
        })?;
        let poses = avatars.get_all();
        let gains = self.engine.compute_gains(viewer.position(), &poses)?;
        debug!("Recomputed gains for {} participants", gains.len());
        Ok(gains)
    }
}
