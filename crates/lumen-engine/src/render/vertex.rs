use bytemuck::{Pod, Zeroable};

use crate::device::VertexAttribute;
use crate::paint::Color;

/// Interleaved vertex: position followed by color, seven `f32`s in total.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl Vertex {
    pub const POSITION_LOCATION: u32 = 0;
    pub const COLOR_LOCATION: u32 = 1;

    pub const POSITION_COMPONENTS: u32 = 3;
    pub const COLOR_COMPONENTS: u32 = 4;

    pub const POSITION_OFFSET: u32 = 0;
    pub const COLOR_OFFSET: u32 = Self::POSITION_COMPONENTS * size_of::<f32>() as u32;

    /// Bytes per vertex record.
    pub const STRIDE: u32 = size_of::<Vertex>() as u32;

    #[inline]
    pub const fn new(position: [f32; 3], color: Color) -> Self {
        Self {
            position,
            color: color.to_array(),
        }
    }

    /// Attribute layout for the shader inputs at locations 0 and 1.
    pub const fn attributes() -> [VertexAttribute; 2] {
        [
            VertexAttribute {
                location: Self::POSITION_LOCATION,
                components: Self::POSITION_COMPONENTS,
                stride: Self::STRIDE,
                offset: Self::POSITION_OFFSET,
            },
            VertexAttribute {
                location: Self::COLOR_LOCATION,
                components: Self::COLOR_COMPONENTS,
                stride: Self::STRIDE,
                offset: Self::COLOR_OFFSET,
            },
        ]
    }
}
