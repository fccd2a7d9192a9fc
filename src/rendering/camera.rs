//! Local viewpoint: the camera and the first-person controls that move it.

use crate::config::CameraSettings;
use crate::world::{Pose, PoseError};
use cgmath::{EuclideanSpace, InnerSpace, Point3, Quaternion, Rad, Rotation3, Vector3};
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Keeps the camera from flipping over the vertical
const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// Contract for whatever drives the local viewpoint
pub trait ViewpointControl {
    /// Apply pending input. Called once per tick before drawing.
    fn update(&mut self);

    /// Current viewer pose
    fn pose(&self) -> Result<Pose, PoseError>;

    fn camera(&self) -> &Camera;
}

/// Perspective camera looking down its local -Z axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub eye: Point3<f32>,
    /// Rotation about +Y, radians
    pub yaw: f32,
    /// Rotation about the camera's X axis, radians
    pub pitch: f32,
    pub up: Vector3<f32>,
    pub aspect: f32,
    /// Vertical field of view, degrees
    pub fovy: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    pub fn from_settings(settings: &CameraSettings) -> Self {
        let eye = Point3::new(settings.eye[0], settings.eye[1], settings.eye[2]);
        let target = Point3::new(settings.target[0], settings.target[1], settings.target[2]);
        let mut camera = Self {
            eye,
            yaw: 0.0,
            pitch: 0.0,
            up: Vector3::unit_y(),
            aspect: 16.0 / 9.0,
            fovy: settings.fov_degrees,
            znear: settings.znear,
            zfar: settings.zfar,
        };
        camera.look_at(target);
        camera
    }

    /// Turn the camera toward `target` without moving it.
    pub fn look_at(&mut self, target: Point3<f32>) {
        let dir = target - self.eye;
        if dir.magnitude2() == 0.0 {
            return;
        }
        let horizontal = (dir.x * dir.x + dir.z * dir.z).sqrt();
        self.yaw = (-dir.x).atan2(-dir.z);
        self.pitch = dir.y.atan2(horizontal).clamp(-MAX_PITCH, MAX_PITCH);
    }

    pub fn orientation(&self) -> Quaternion<f32> {
        Quaternion::from_angle_y(Rad(self.yaw)) * Quaternion::from_angle_x(Rad(self.pitch))
    }

    pub fn forward(&self) -> Vector3<f32> {
        self.orientation() * -Vector3::unit_z()
    }

    pub fn target(&self) -> Point3<f32> {
        self.eye + self.forward()
    }

    pub fn pose(&self) -> Result<Pose, PoseError> {
        Pose::new(self.eye.to_vec(), self.orientation())
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_settings(&CameraSettings::default())
    }
}

/// Keyboard first-person controls.
///
/// Key state is collected from window events as they arrive and applied to
/// the camera once per tick in [`CameraController::update_camera`].
#[derive(Debug, Clone, Default)]
pub struct CameraController {
    speed: f32,
    turn_speed: f32,
    forward: bool,
    backward: bool,
    left: bool,
    right: bool,
    ascend: bool,
    descend: bool,
    turn_left: bool,
    turn_right: bool,
    look_up: bool,
    look_down: bool,
}

impl CameraController {
    pub fn new(speed: f32, turn_speed: f32) -> Self {
        Self {
            speed,
            turn_speed,
            ..Default::default()
        }
    }

    pub fn process_events(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput {
                event: KeyEvent {
                    physical_key: PhysicalKey::Code(code),
                    state,
                    ..
                },
                ..
            } => self.process_key(*code, *state),
            _ => false,
        }
    }

    /// Record a key transition. Returns whether the key is one of ours.
    pub fn process_key(&mut self, code: KeyCode, state: ElementState) -> bool {
        let pressed = state == ElementState::Pressed;
        let flag = match code {
            KeyCode::KeyW => &mut self.forward,
            KeyCode::KeyS => &mut self.backward,
            KeyCode::KeyA => &mut self.left,
            KeyCode::KeyD => &mut self.right,
            KeyCode::Space => &mut self.ascend,
            KeyCode::ShiftLeft => &mut self.descend,
            KeyCode::ArrowLeft | KeyCode::KeyQ => &mut self.turn_left,
            KeyCode::ArrowRight | KeyCode::KeyE => &mut self.turn_right,
            KeyCode::ArrowUp => &mut self.look_up,
            KeyCode::ArrowDown => &mut self.look_down,
            _ => return false,
        };
        *flag = pressed;
        true
    }

    pub fn update_camera(&self, camera: &mut Camera) {
        if self.turn_left {
            camera.yaw += self.turn_speed;
        }
        if self.turn_right {
            camera.yaw -= self.turn_speed;
        }
        if self.look_up {
            camera.pitch = (camera.pitch + self.turn_speed).min(MAX_PITCH);
        }
        if self.look_down {
            camera.pitch = (camera.pitch - self.turn_speed).max(-MAX_PITCH);
        }

        // Walk on the horizontal plane regardless of pitch
        let heading = Quaternion::from_angle_y(Rad(camera.yaw));
        let forward = heading * -Vector3::unit_z();
        let right = forward.cross(camera.up).normalize();

        let mut step = Vector3::new(0.0, 0.0, 0.0);
        if self.forward {
            step += forward;
        }
        if self.backward {
            step -= forward;
        }
        if self.right {
            step += right;
        }
        if self.left {
            step -= right;
        }
        if self.ascend {
            step += camera.up;
        }
        if self.descend {
            step -= camera.up;
        }
        if step.magnitude2() > 0.0 {
            camera.eye += step.normalize() * self.speed;
        }
    }
}

/// Camera plus keyboard controls
pub struct FirstPersonViewpoint {
    camera: Camera,
    controller: CameraController,
}

impl FirstPersonViewpoint {
    pub fn new(camera: Camera, controller: CameraController) -> Self {
        Self { camera, controller }
    }

    pub fn from_settings(settings: &CameraSettings) -> Self {
        Self::new(
            Camera::from_settings(settings),
            CameraController::new(settings.move_speed, settings.turn_speed),
        )
    }

    pub fn process_events(&mut self, event: &WindowEvent) -> bool {
        self.controller.process_events(event)
    }

    pub fn controller_mut(&mut self) -> &mut CameraController {
        &mut self.controller
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_viewport(width, height);
    }
}

impl ViewpointControl for FirstPersonViewpoint {
    fn update(&mut self) {
        self.controller.update_camera(&mut self.camera);
    }

    fn pose(&self) -> Result<Pose, PoseError> {
        self.camera.pose()
    }

    fn camera(&self) -> &Camera {
        &self.camera
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_default_camera_faces_the_table() {
        let camera = Camera::default();
        assert_eq!(camera.eye, Point3::new(0.0, 5.0, 8.0));

        // Looking from (0,5,8) toward (0,0,-3)
        let forward = camera.forward();
        let expected = Vector3::new(0.0, -5.0, -11.0).normalize();
        assert!(approx(forward.x, expected.x));
        assert!(approx(forward.y, expected.y));
        assert!(approx(forward.z, expected.z));
    }

    #[test]
    fn test_pose_matches_camera() {
        let camera = Camera::default();
        let pose = camera.pose().unwrap();
        assert_eq!(pose.position(), Vector3::new(0.0, 5.0, 8.0));
        assert!(approx(pose.orientation().magnitude(), 1.0));
    }

    #[test]
    fn test_non_finite_camera_has_no_pose() {
        let mut camera = Camera::default();
        camera.eye.x = f32::NAN;
        assert_eq!(camera.pose(), Err(PoseError::NonFinitePosition));
    }

    #[test]
    fn test_controller_walks_forward() {
        let mut viewpoint = FirstPersonViewpoint::new(Camera::default(), CameraController::new(0.5, 0.02));
        assert!(viewpoint.controller_mut().process_key(KeyCode::KeyW, ElementState::Pressed));
        viewpoint.update();
        // Horizontal movement only: yaw is 0, so forward is -Z
        assert!(approx(viewpoint.camera().eye.z, 7.5));
        assert!(approx(viewpoint.camera().eye.y, 5.0));

        viewpoint.controller_mut().process_key(KeyCode::KeyW, ElementState::Released);
        viewpoint.update();
        assert!(approx(viewpoint.camera().eye.z, 7.5));
    }

    #[test]
    fn test_controller_ignores_unbound_keys() {
        let mut controller = CameraController::new(0.1, 0.02);
        assert!(!controller.process_key(KeyCode::KeyZ, ElementState::Pressed));
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut camera = Camera::default();
        let mut controller = CameraController::new(0.1, 1.0);
        controller.process_key(KeyCode::ArrowUp, ElementState::Pressed);
        for _ in 0..10 {
            controller.update_camera(&mut camera);
        }
        assert!(camera.pitch <= MAX_PITCH);
    }
}
