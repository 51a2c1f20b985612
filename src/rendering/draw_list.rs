use std::ops::Range;

use itertools::Itertools;

use crate::{math::Matrix4, rendering::vertex::Vertex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// The first vertex is shared by every triangle formed with each
    /// consecutive pair of the remaining vertices.
    TriangleFan,
}

/// Receives geometry from scene nodes during a draw traversal.
pub trait GeometrySink {
    fn submit(&mut self, transform: &Matrix4, topology: Topology, vertices: &[Vertex]);
}

#[derive(Debug, Clone)]
pub struct DrawCommand {
    pub transform: Matrix4,
    pub topology: Topology,
    pub vertices: Range<u32>,
}

/// Records one frame's worth of submissions.
///
/// Vertices are copied on submit, so later mutation of the caller's buffer
/// does not affect what was recorded.
#[derive(Debug, Default)]
pub struct DrawList {
    vertices: Vec<Vertex>,
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.commands.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn vertices(&self, command: &DrawCommand) -> &[Vertex] {
        &self.vertices[command.vertices.start as usize..command.vertices.end as usize]
    }

    /// Expands every command into a triangle list, returning the vertex data
    /// and the range of it belonging to each command.
    pub fn triangle_lists(&self) -> (Vec<Vertex>, Vec<Range<u32>>) {
        let mut out = Vec::with_capacity(self.vertices.len() * 3);
        let mut ranges = Vec::with_capacity(self.commands.len());

        for command in &self.commands {
            let start = out.len() as u32;
            match command.topology {
                Topology::TriangleFan => expand_fan(self.vertices(command), &mut out),
            }
            ranges.push(start..out.len() as u32);
        }

        (out, ranges)
    }
}

impl GeometrySink for DrawList {
    fn submit(&mut self, transform: &Matrix4, topology: Topology, vertices: &[Vertex]) {
        let start = self.vertices.len() as u32;
        self.vertices.extend_from_slice(vertices);
        self.commands.push(DrawCommand {
            transform: *transform,
            topology,
            vertices: start..self.vertices.len() as u32,
        });
    }
}

fn expand_fan(fan: &[Vertex], out: &mut Vec<Vertex>) {
    let Some((&center, rim)) = fan.split_first() else {
        return;
    };

    for (&a, &b) in rim.iter().tuple_windows() {
        out.extend([center, a, b]);
    }
}
