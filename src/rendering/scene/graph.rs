use std::collections::HashMap;
use cgmath::{EuclideanSpace, InnerSpace};
use tracing::trace;
use crate::rendering::camera::Camera;
use crate::rendering::light::Environment;
use crate::rendering::scene::{Renderable, RenderableHandle, SceneComposition, Transform};

/// Counts from the most recent draw
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    pub total: usize,
    pub visible: usize,
}

/// Flat, in-memory scene: every renderable keyed by handle.
pub struct SceneGraph {
    nodes: HashMap<u64, Renderable>,
    next_id: u64,
    environment: Option<Environment>,
    draw_calls: u64,
    last_draw: DrawStats,
}

impl SceneGraph {
    pub fn new() -> Self {
        SceneGraph {
            nodes: HashMap::new(),
            next_id: 1,
            environment: None,
            draw_calls: 0,
            last_draw: DrawStats::default(),
        }
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    pub fn environment(&self) -> Option<&Environment> {
        self.environment.as_ref()
    }

    pub fn get(&self, handle: RenderableHandle) -> Option<&Renderable> {
        self.nodes.get(&handle.0)
    }

    pub fn contains(&self, handle: RenderableHandle) -> bool {
        self.nodes.contains_key(&handle.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn draw_calls(&self) -> u64 {
        self.draw_calls
    }

    pub fn last_draw(&self) -> DrawStats {
        self.last_draw
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneComposition for SceneGraph {
    fn insert(&mut self, renderable: Renderable) -> RenderableHandle {
        let id = self.next_id;
        // Handles are never reused within a session
        self.next_id += 1;
        self.nodes.insert(id, renderable);
        RenderableHandle(id)
    }

    fn remove(&mut self, handle: RenderableHandle) -> Option<Renderable> {
        self.nodes.remove(&handle.0)
    }

    fn transform_mut(&mut self, handle: RenderableHandle) -> Option<&mut Transform> {
        self.nodes.get_mut(&handle.0).map(|node| &mut node.transform)
    }

    fn render(&mut self, camera: &Camera) {
        let eye = camera.eye.to_vec();
        let far_sq = camera.zfar * camera.zfar;
        let visible = self
            .nodes
            .values()
            .filter(|node| (node.transform.position - eye).magnitude2() <= far_sq)
            .count();

        self.draw_calls += 1;
        self.last_draw = DrawStats {
            total: self.nodes.len(),
            visible,
        };
        trace!("Draw #{}: {}/{} renderables in range", self.draw_calls, visible, self.nodes.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::camera::Camera;
    use cgmath::Vector3;

    #[test]
    fn test_insert_and_remove() {
        let mut scene = SceneGraph::new();
        let a = scene.insert(Renderable::new("chair.glb", "default"));
        let b = scene.insert(Renderable::new("table.glb", "default"));
        assert_ne!(a, b);
        assert_eq!(scene.len(), 2);

        let removed = scene.remove(a).unwrap();
        assert_eq!(removed.mesh_id, "chair.glb");
        assert!(scene.remove(a).is_none());
        assert!(!scene.contains(a));
        assert!(scene.contains(b));
    }

    #[test]
    fn test_removed_handle_is_not_reissued() {
        let mut scene = SceneGraph::new();
        let first = scene.insert(Renderable::new("box", "default"));
        scene.remove(first);
        let second = scene.insert(Renderable::new("box", "default"));
        assert_ne!(first, second);
        assert!(second.id() > first.id());
        assert!(scene.get(first).is_none());
    }

    #[test]
    fn test_transform_mut() {
        let mut scene = SceneGraph::new();
        let handle = scene.insert(Renderable::new("box", "default"));
        scene.transform_mut(handle).unwrap().position = Vector3::new(1.0, 2.0, 3.0);
        assert_eq!(scene.get(handle).unwrap().transform.position, Vector3::new(1.0, 2.0, 3.0));

        scene.remove(handle);
        assert!(scene.transform_mut(handle).is_none());
    }

    #[test]
    fn test_render_counts_draws_in_range() {
        let mut scene = SceneGraph::new();
        let camera = Camera::default();
        scene.insert(Renderable::new("near", "default"));
        scene.insert(
            Renderable::new("far", "default")
                .with_transform(Transform::at(Vector3::new(0.0, 0.0, camera.zfar * 2.0))),
        );

        scene.render(&camera);
        scene.render(&camera);
        assert_eq!(scene.draw_calls(), 2);
        assert_eq!(scene.last_draw(), DrawStats { total: 2, visible: 1 });
    }
}
