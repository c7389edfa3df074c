//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Colors for game elements (classic diep-style palette)
pub mod colors {
    pub const PLAYER: [f32; 4] = [0.0, 0.70, 0.88, 1.0];
    pub const BULLET: [f32; 4] = [0.0, 0.70, 0.88, 1.0];
    pub const SQUARE: [f32; 4] = [1.0, 0.91, 0.41, 1.0];
    pub const TRIANGLE: [f32; 4] = [0.99, 0.46, 0.47, 1.0];
    pub const PENTAGON: [f32; 4] = [0.46, 0.55, 0.99, 1.0];
    pub const BOSS: [f32; 4] = [0.55, 0.26, 0.33, 1.0];
    pub const BARREL: [f32; 4] = [0.60, 0.60, 0.60, 1.0];
    pub const OUTLINE: [f32; 4] = [0.33, 0.33, 0.33, 1.0];
    pub const GRID: [f32; 4] = [0.71, 0.71, 0.71, 1.0];
    pub const BACKGROUND: [f32; 4] = [0.80, 0.80, 0.80, 1.0];
    pub const HEALTH_BG: [f32; 4] = [0.33, 0.33, 0.33, 1.0];
    pub const HEALTH_FILL: [f32; 4] = [0.52, 0.89, 0.49, 1.0];
}
