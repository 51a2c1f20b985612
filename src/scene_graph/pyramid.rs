use std::f32::consts::TAU;

use anyhow::ensure;
use glam::Vec3;

use crate::{
    math::Matrix4,
    rendering::{
        draw_list::{GeometrySink, Topology},
        vertex::Vertex,
    },
    scene_graph::scene_node::{NodeBase, SceneNode},
};

pub const MIN_SIDES: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PyramidDesc {
    pub radius: f32,
    pub height: f32,
    pub sides: u32,
    pub tip_color: u32,
    pub color1: u32,
    pub color2: u32,
}

/// A cone-like shape drawn from a single triangle fan.
///
/// Vertex 0 is the apex, followed by `sides` rim vertices and a closing
/// vertex that repeats the first rim position. The base is drawn by
/// submitting the same fan again with the apex pulled down to `z = 0`.
pub struct Pyramid {
    base: NodeBase,
    height: f32,
    vertices: Vec<Vertex>,
}

impl Pyramid {
    pub fn new(name: impl Into<String>, desc: PyramidDesc) -> anyhow::Result<Self> {
        let name = name.into();

        ensure!(
            desc.radius.is_finite() && desc.radius >= 0.0,
            "pyramid {name}: radius must be finite and non-negative, got {}",
            desc.radius
        );
        ensure!(
            desc.height.is_finite(),
            "pyramid {name}: height must be finite, got {}",
            desc.height
        );

        let sides = if desc.sides < MIN_SIDES {
            log::warn!(
                "pyramid {name}: {} sides requested, clamping to {MIN_SIDES}",
                desc.sides
            );
            MIN_SIDES
        } else {
            desc.sides
        };

        let vertices = generate_vertices(&desc, sides);

        Ok(Self {
            base: NodeBase::new(name),
            height: desc.height,
            vertices,
        })
    }

    pub fn with_transform(mut self, transform: Matrix4) -> Self {
        self.base.transform = transform;
        self
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn sides(&self) -> usize {
        self.vertices.len() - 2
    }
}

fn generate_vertices(desc: &PyramidDesc, sides: u32) -> Vec<Vertex> {
    let total = sides as usize + 2;
    let rim_color = |parity: usize| {
        if parity % 2 == 0 {
            desc.color1
        } else {
            desc.color2
        }
    };

    let mut vertices = Vec::with_capacity(total);
    vertices.push(Vertex::new(Vec3::new(0.0, 0.0, desc.height), desc.tip_color));

    for i in 0..sides as usize {
        let angle = TAU * i as f32 / sides as f32;
        let (s, c) = angle.sin_cos();
        vertices.push(Vertex::new(
            Vec3::new(desc.radius * c, desc.radius * s, 0.0),
            rim_color(i + 1),
        ));
    }

    vertices.push(Vertex::new(
        Vec3::new(desc.radius, 0.0, 0.0),
        rim_color(total),
    ));

    vertices
}

impl SceneNode for Pyramid {
    fn base(&self) -> &NodeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut NodeBase {
        &mut self.base
    }

    fn draw(&mut self, parent_transform: &Matrix4, sink: &mut dyn GeometrySink) {
        let effective = parent_transform * &self.base.transform;

        sink.submit(&effective, Topology::TriangleFan, &self.vertices);

        self.vertices[0].position.z = 0.0;
        sink.submit(&effective, Topology::TriangleFan, &self.vertices);
        self.vertices[0].position.z = self.height;

        self.base.draw_children(&effective, sink);
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;
    use crate::rendering::draw_list::DrawList;

    const WHITE: u32 = 0xFFFFFFFF;
    const RED: u32 = 0xFF0000FF;
    const GREEN: u32 = 0x00FF00FF;

    fn desc(sides: u32) -> PyramidDesc {
        PyramidDesc {
            radius: 1.0,
            height: 2.0,
            sides,
            tip_color: WHITE,
            color1: RED,
            color2: GREEN,
        }
    }

    fn approx_eq_vec3(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-6
    }

    #[test]
    fn vertex_count_is_sides_plus_two() {
        for sides in [3, 4, 5, 16, 33] {
            let pyramid = Pyramid::new("p", desc(sides)).unwrap();
            assert_eq!(pyramid.vertices().len(), sides as usize + 2);
            assert_eq!(pyramid.sides(), sides as usize);
        }
    }

    #[test]
    fn too_few_sides_are_clamped() {
        for sides in [0, 1, 2] {
            let pyramid = Pyramid::new("p", desc(sides)).unwrap();
            assert_eq!(pyramid.vertices().len(), 5);
        }
    }

    #[test]
    fn invalid_dimensions_are_rejected() {
        let mut negative = desc(4);
        negative.radius = -1.0;
        assert!(Pyramid::new("p", negative).is_err());

        let mut infinite = desc(4);
        infinite.height = f32::INFINITY;
        assert!(Pyramid::new("p", infinite).is_err());

        let mut flat = desc(4);
        flat.radius = 0.0;
        assert!(Pyramid::new("p", flat).is_ok());
    }

    #[test]
    fn four_sided_pyramid_layout() {
        let pyramid = Pyramid::new("p", desc(4)).unwrap();
        let v = pyramid.vertices();

        assert_eq!(v[0], Vertex::new(Vec3::new(0.0, 0.0, 2.0), WHITE));

        let expected_rim = [
            (Vec3::new(1.0, 0.0, 0.0), GREEN),
            (Vec3::new(0.0, 1.0, 0.0), RED),
            (Vec3::new(-1.0, 0.0, 0.0), GREEN),
            (Vec3::new(0.0, -1.0, 0.0), RED),
        ];
        for (vertex, (position, color)) in v[1..5].iter().zip(expected_rim) {
            assert!(approx_eq_vec3(vertex.position, position), "{vertex:?}");
            assert_eq!(vertex.color, color);
        }

        assert_eq!(v[5], Vertex::new(Vec3::new(1.0, 0.0, 0.0), RED));
    }

    #[test]
    fn closing_vertex_color_follows_total_count_parity() {
        // 3 sides -> 5 vertices (odd), 5 sides -> 7 vertices (odd), 6 -> 8 (even)
        assert_eq!(Pyramid::new("p", desc(3)).unwrap().vertices()[4].color, GREEN);
        assert_eq!(Pyramid::new("p", desc(5)).unwrap().vertices()[6].color, GREEN);
        assert_eq!(Pyramid::new("p", desc(6)).unwrap().vertices()[7].color, RED);
    }

    #[test]
    fn rim_lies_on_the_base_circle() {
        let mut wide = desc(7);
        wide.radius = 2.5;
        let pyramid = Pyramid::new("p", wide).unwrap();
        for vertex in &pyramid.vertices()[1..] {
            assert_eq!(vertex.position.z, 0.0);
            assert!((vertex.position.truncate().length() - 2.5).abs() < 1e-5);
        }
    }

    #[test]
    fn draw_submits_side_then_base_and_restores_apex() {
        let mut pyramid = Pyramid::new("p", desc(4)).unwrap();
        let mut list = DrawList::new();
        pyramid.draw(&Matrix4::IDENTITY, &mut list);

        let commands = list.commands();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].topology, Topology::TriangleFan);
        assert_eq!(list.vertices(&commands[0])[0].position.z, 2.0);
        assert_eq!(list.vertices(&commands[1])[0].position.z, 0.0);
        assert_eq!(list.vertices(&commands[1]).len(), 6);

        assert_eq!(pyramid.vertices()[0].position.z, pyramid.height());
        assert_eq!(pyramid.vertices()[0].position.z, 2.0);
    }

    #[test]
    fn draw_uses_the_composed_transform_for_both_passes_and_children() {
        let offset = Matrix4::from_translation(Vec3::new(0.0, 0.0, 1.0));
        let mut pyramid = Pyramid::new("parent", desc(3))
            .unwrap()
            .with_transform(offset);
        pyramid.base_mut().add_child(
            Pyramid::new("child", desc(3))
                .unwrap()
                .with_transform(Matrix4::from_translation(Vec3::X)),
        );

        let camera = Matrix4::from_rotation(Vec3::Z, FRAC_PI_2).unwrap();
        let mut list = DrawList::new();
        pyramid.draw(&camera, &mut list);

        let commands = list.commands();
        assert_eq!(commands.len(), 4);
        assert_eq!(commands[0].transform, commands[1].transform);
        assert!(commands[0].transform.approx_eq(&(camera * offset), 1e-6));
        assert!(approx_eq_vec3(
            commands[2].transform.translation(),
            Vec3::new(0.0, 1.0, 1.0)
        ));
    }
}
