//! GPU instance layouts for batched items.
//!
//! Convention:
//! - positions and sizes are in pixels (top-left origin, +Y down)
//! - colors are premultiplied
//! - texture rectangles are in texels; shaders normalize by the bound texture size

use bytemuck::{Pod, Zeroable};

/// Textured quad (textures and glyphs), 56 bytes:
///
///  offset  0  dest_center [f32; 2]   loc 1
///  offset  8  dest_size   [f32; 2]   loc 2
///  offset 16  src_min     [f32; 2]   loc 3
///  offset 24  src_size    [f32; 2]   loc 4
///  offset 32  color       [f32; 4]   loc 5
///  offset 48  angle       f32        loc 6  (radians, clockwise on screen)
///  offset 52  effects     u32        loc 7  (`RenderEffects` bits)
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct QuadInstance {
    pub dest_center: [f32; 2],
    pub dest_size: [f32; 2],
    pub src_min: [f32; 2],
    pub src_size: [f32; 2],
    pub color: [f32; 4],
    pub angle: f32,
    pub effects: u32,
}

impl QuadInstance {
    const ATTRS: [wgpu::VertexAttribute; 7] = wgpu::vertex_attr_array![
        1 => Float32x2, // dest_center
        2 => Float32x2, // dest_size
        3 => Float32x2, // src_min
        4 => Float32x2, // src_size
        5 => Float32x4, // color
        6 => Float32,   // angle
        7 => Uint32     // effects
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}

/// Rounded, optionally hollow rectangle with a two-color gradient, 88 bytes:
///
///  offset  0  origin        [f32; 2]  loc 1  (top-left)
///  offset  8  size          [f32; 2]  loc 2
///  offset 16  radii         [f32; 4]  loc 3  (tl, tr, br, bl)
///  offset 32  color0        [f32; 4]  loc 4
///  offset 48  color1        [f32; 4]  loc 5
///  offset 64  grad_p0       [f32; 2]  loc 6
///  offset 72  grad_p1       [f32; 2]  loc 7
///  offset 80  border_filled [f32; 2]  loc 8  (border thickness, 1.0 when filled)
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct RectInstance {
    pub origin: [f32; 2],
    pub size: [f32; 2],
    pub radii: [f32; 4],
    pub color0: [f32; 4],
    pub color1: [f32; 4],
    pub grad_p0: [f32; 2],
    pub grad_p1: [f32; 2],
    pub border_filled: [f32; 2],
}

impl RectInstance {
    const ATTRS: [wgpu::VertexAttribute; 8] = wgpu::vertex_attr_array![
        1 => Float32x2, // origin
        2 => Float32x2, // size
        3 => Float32x4, // radii
        4 => Float32x4, // color0
        5 => Float32x4, // color1
        6 => Float32x2, // grad_p0
        7 => Float32x2, // grad_p1
        8 => Float32x2  // border_filled
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<RectInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}
