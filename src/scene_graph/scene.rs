use crate::{
    math::Matrix4,
    rendering::draw_list::GeometrySink,
    scene_graph::scene_node::{Group, SceneNode},
};

/// Owns the root of the scene tree and drives the per-frame traversal.
pub struct Scene {
    root: Group,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            root: Group::new("root"),
        }
    }

    pub fn add(&mut self, node: impl SceneNode + 'static) -> usize {
        self.root.base_mut().add_child(node)
    }

    pub fn root_mut(&mut self) -> &mut Group {
        &mut self.root
    }

    pub fn get_node_by_name(&self, name: &str) -> Option<&dyn SceneNode> {
        let root: &dyn SceneNode = &self.root;
        root.find(name)
    }

    pub fn node_count(&self) -> usize {
        self.root.subtree_len()
    }

    /// Advances every node to time `t`, in seconds since the scene started.
    pub fn update(&mut self, t: f64) {
        self.root.update(t);
    }

    /// Draws the whole tree with `view_projection` as the root's parent transform.
    pub fn draw(&mut self, view_projection: &Matrix4, sink: &mut dyn GeometrySink) {
        self.root.draw(view_projection, sink);
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::{
        rendering::draw_list::DrawList,
        scene_graph::pyramid::{Pyramid, PyramidDesc},
    };

    fn pyramid(name: &str) -> Pyramid {
        Pyramid::new(
            name,
            PyramidDesc {
                radius: 1.0,
                height: 1.0,
                sides: 4,
                tip_color: 0xFFFFFFFF,
                color1: 0xFF0000FF,
                color2: 0x0000FFFF,
            },
        )
        .unwrap()
    }

    #[test]
    fn empty_scene_draws_nothing() {
        let mut scene = Scene::new();
        let mut list = DrawList::new();
        scene.update(0.0);
        scene.draw(&Matrix4::IDENTITY, &mut list);
        assert!(list.is_empty());
        assert_eq!(scene.node_count(), 1);
    }

    #[test]
    fn two_level_translation_propagates() {
        let mut scene = Scene::new();
        scene.root_mut().base_mut().transform =
            Matrix4::from_translation(Vec3::new(5.0, 0.0, 0.0));
        scene.add(
            pyramid("a").with_transform(Matrix4::from_translation(Vec3::new(0.0, -1.0, 2.0))),
        );

        let mut list = DrawList::new();
        scene.draw(&Matrix4::IDENTITY, &mut list);

        for command in list.commands() {
            let offset = command.transform.translation();
            assert!((offset - Vec3::new(5.0, -1.0, 2.0)).length() < 1e-6);
        }
        assert_eq!(list.commands().len(), 2);
    }

    #[test]
    fn lookup_by_name() {
        let mut scene = Scene::new();
        scene.add(pyramid("left"));
        scene.add(pyramid("right"));

        assert_eq!(scene.node_count(), 3);
        assert!(scene.get_node_by_name("right").is_some());
        assert!(scene.get_node_by_name("center").is_none());
    }
}
