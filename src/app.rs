use crate::audio::VolumeMixer;
use crate::networking::PosePublisher;
use crate::rendering::{FirstPersonViewpoint, FrameSignal};
use crate::room::Room;
use std::sync::Arc;
use tracing::{error, info};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowId};

pub type DesktopRoom = Room<FirstPersonViewpoint, VolumeMixer>;

impl FrameSignal for Window {
    fn request_frame(&self) {
        self.request_redraw();
    }
}

/// Window driver: every `RedrawRequested` is one room frame, and each frame
/// requests the next redraw.
pub struct RoomApp {
    room: DesktopRoom,
    window: Option<Arc<Window>>,
    publisher: PosePublisher,
    title: String,
}

impl RoomApp {
    pub fn new(room: DesktopRoom, title: impl Into<String>) -> Self {
        Self {
            room,
            window: None,
            publisher: PosePublisher::default(),
            title: title.into(),
        }
    }

    fn publish_player_pose(&mut self) {
        match self.room.player_pose() {
            Ok(pose) => {
                if let Some(message) = self.publisher.next_message(&pose) {
                    // stdout is the outgoing half of the presence feed
                    println!("{}", message);
                }
            }
            Err(e) => error!("Not publishing player pose: {}", e),
        }
    }
}

impl ApplicationHandler for RoomApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        match event_loop.create_window(Window::default_attributes().with_title(self.title.clone())) {
            Ok(window) => {
                let window = Arc::new(window);
                let size = window.inner_size();
                self.room.viewpoint_mut().resize(size.width, size.height);
                info!("Window created ({}x{})", size.width, size.height);
                window.request_redraw();
                self.window = Some(window);
            }
            Err(e) => {
                error!("Failed to create window: {}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.clone() else {
            return;
        };
        if window.id() != window_id {
            return;
        }
        if self.room.viewpoint_mut().process_events(&event) {
            return;
        }
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested after {} frames", self.room.scheduler().frame_count());
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                self.room.viewpoint_mut().resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                self.room.frame(&*window);
                self.publish_player_pose();
            }
            _ => {}
        }
    }
}
