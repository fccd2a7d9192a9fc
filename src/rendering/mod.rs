pub mod camera;
pub mod light;
pub mod scene;
pub mod scheduler;

pub use camera::{Camera, CameraController, FirstPersonViewpoint, ViewpointControl};
pub use scene::{Renderable, RenderableHandle, SceneComposition, SceneGraph, Transform};
pub use scheduler::{FrameReport, FrameScheduler, FrameSignal, FrameTargets, SchedulerState};
