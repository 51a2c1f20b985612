use glam::{Vec2, Vec3};

use crate::{
    math::{Matrix3, Matrix4},
    scene_graph::scene_node::{NodeBase, SceneNode},
};

/// Rotates its children about `axis` at a constant angular speed.
///
/// The node's transform is rebuilt from scratch on every update, so any
/// offset belongs on a parent or child node.
pub struct Spinner {
    base: NodeBase,
    axis: Vec3,
    radians_per_second: f32,
}

impl Spinner {
    pub fn new(
        name: impl Into<String>,
        axis: Vec3,
        radians_per_second: f32,
    ) -> anyhow::Result<Self> {
        // Validates the axis up front so update never has to fail.
        Matrix4::from_rotation(axis, 0.0)?;

        Ok(Self {
            base: NodeBase::new(name),
            axis,
            radians_per_second,
        })
    }
}

impl SceneNode for Spinner {
    fn base(&self) -> &NodeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut NodeBase {
        &mut self.base
    }

    fn update(&mut self, t: f64) {
        let angle = (t * self.radians_per_second as f64) as f32;
        if let Err(err) = self.base.transform.set_rotation(self.axis, angle) {
            log::error!("spinner {}: {err:#}", self.base.name);
        }
        self.base.update_children(t);
    }
}

/// Moves its children around `pivot` in the XY plane, keeping `z` fixed.
pub struct Orbit {
    base: NodeBase,
    pivot: Vec2,
    start: Vec2,
    z: f32,
    radians_per_second: f32,
}

impl Orbit {
    pub fn new(
        name: impl Into<String>,
        pivot: Vec2,
        start: Vec3,
        radians_per_second: f32,
    ) -> Self {
        let mut base = NodeBase::new(name);
        base.transform = Matrix4::from_translation(start);

        Self {
            base,
            pivot,
            start: start.truncate(),
            z: start.z,
            radians_per_second,
        }
    }
}

impl SceneNode for Orbit {
    fn base(&self) -> &NodeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut NodeBase {
        &mut self.base
    }

    fn update(&mut self, t: f64) {
        let angle = (t * self.radians_per_second as f64) as f32;
        let position = Matrix3::from_rotation(self.pivot, angle).transform_point(self.start);
        self.base
            .transform
            .set_translation(position.x, position.y, self.z);
        self.base.update_children(t);
    }
}
