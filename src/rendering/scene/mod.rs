//! The renderable world avatars are inserted into.
//!
//! Presence code only ever touches a renderable's [`Transform`]; meshes and
//! materials are opaque identifiers owned by whoever built the renderable.

pub mod graph;

pub use graph::SceneGraph;

use crate::rendering::camera::Camera;
use cgmath::{Quaternion, Vector3};

/// Position, rotation and scale of a renderable
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn at(position: Vector3<f32>) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }

    pub fn with_rotation(mut self, rotation: Quaternion<f32>) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vector3<f32>) -> Self {
        self.scale = scale;
        self
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Renderable {
    pub transform: Transform,
    pub mesh_id: String,
    pub material_id: String,
}

impl Renderable {
    pub fn new(mesh_id: impl Into<String>, material_id: impl Into<String>) -> Self {
        Self {
            transform: Transform::identity(),
            mesh_id: mesh_id.into(),
            material_id: material_id.into(),
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }
}

/// Handle to a renderable owned by a [`SceneComposition`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderableHandle(pub(crate) u64);

impl RenderableHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Passive container of everything that gets drawn
pub trait SceneComposition {
    /// Take ownership of a renderable and return its handle
    fn insert(&mut self, renderable: Renderable) -> RenderableHandle;

    /// Remove a renderable, returning it if the handle was live
    fn remove(&mut self, handle: RenderableHandle) -> Option<Renderable>;

    /// Mutable access to a live renderable's transform
    fn transform_mut(&mut self, handle: RenderableHandle) -> Option<&mut Transform>;

    /// Issue one draw of the whole scene from `camera`
    fn render(&mut self, camera: &Camera);
}
