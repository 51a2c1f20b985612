use std::mem::offset_of;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Interleaved position + packed color vertex.
///
/// `color` is `0xRRGGBBAA`. On the GPU it is read as `Unorm8x4`, which on a
/// little-endian host yields `(a, b, g, r)`; the vertex shader swizzles it back.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub color: u32,
}

impl Vertex {
    pub fn new(position: Vec3, color: u32) -> Self {
        Self { position, color }
    }
}

pub const POSITION_LOCATION: u32 = 0;
pub const COLOR_LOCATION: u32 = 1;

pub const VERTEX_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
    step_mode: wgpu::VertexStepMode::Vertex,
    attributes: &[
        wgpu::VertexAttribute {
            offset: offset_of!(Vertex, position) as wgpu::BufferAddress,
            shader_location: POSITION_LOCATION,
            format: wgpu::VertexFormat::Float32x3,
        },
        wgpu::VertexAttribute {
            offset: offset_of!(Vertex, color) as wgpu::BufferAddress,
            shader_location: COLOR_LOCATION,
            format: wgpu::VertexFormat::Unorm8x4,
        },
    ],
};
