use std::fmt::Debug;

use bytemuck::Pod;

use crate::coords::{Rect, Viewport};
use crate::paint::Color;
use crate::shader::ShaderType;

use super::{QuadInstance, RenderEffects};

/// A value stored in a [`BatchBuffer`](super::BatchBuffer) slot.
///
/// `Default` is the empty sentinel: a slot is free exactly when it holds the
/// default value.
pub trait BatchItem: Copy + PartialEq + Default + Debug {
    /// Per-instance GPU data.
    type Instance: Pod;

    /// Program the items of this kind are drawn with.
    const SHADER: ShaderType;

    /// Texture sampled by the item, 0 for untextured items.
    fn texture_id(&self) -> u32;

    fn to_instance(&self) -> Self::Instance;

    #[inline]
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Resets the item to the empty sentinel.
    #[inline]
    fn empty(&mut self) {
        *self = Self::default();
    }
}

/// Encodes a textured quad.
///
/// `size` scales `dest` about its center (1.0 keeps it). `angle` is in
/// degrees, clockwise.
pub(crate) fn quad_instance(
    src: Rect,
    dest: Rect,
    size: f32,
    angle: f32,
    tint: Color,
    effects: RenderEffects,
) -> QuadInstance {
    let dest = dest.normalized().scaled_about_center(size);
    let src = src.normalized();
    QuadInstance {
        dest_center: dest.center().to_array(),
        dest_size: dest.size.to_array(),
        src_min: src.origin.to_array(),
        src_size: src.size.to_array(),
        color: tint.to_array(),
        angle: angle.to_radians(),
        effects: effects.bits(),
    }
}

/// One textured quad.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct TextureBatchItem {
    /// Region of the texture to draw (texels).
    pub src_rect: Rect,
    /// Screen region to draw into (pixels, top-left origin).
    pub dest_rect: Rect,
    /// Scale factor applied about the destination center.
    pub size: f32,
    /// Rotation in degrees, clockwise.
    pub angle: f32,
    pub tint_color: Color,
    pub effects: RenderEffects,
    pub viewport_size: Viewport,
    pub texture_id: u32,
}

impl BatchItem for TextureBatchItem {
    type Instance = QuadInstance;
    const SHADER: ShaderType = ShaderType::Texture;

    #[inline]
    fn texture_id(&self) -> u32 {
        self.texture_id
    }

    fn to_instance(&self) -> QuadInstance {
        quad_instance(self.src_rect, self.dest_rect, self.size, self.angle, self.tint_color, self.effects)
    }
}

/// One glyph quad sampled from a font atlas.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct GlyphBatchItem {
    /// Glyph bounds inside the atlas (texels).
    pub src_rect: Rect,
    pub dest_rect: Rect,
    pub glyph: char,
    pub size: f32,
    pub angle: f32,
    pub tint_color: Color,
    pub effects: RenderEffects,
    pub viewport_size: Viewport,
    /// Atlas texture id.
    pub texture_id: u32,
}

impl BatchItem for GlyphBatchItem {
    type Instance = QuadInstance;
    const SHADER: ShaderType = ShaderType::Font;

    #[inline]
    fn texture_id(&self) -> u32 {
        self.texture_id
    }

    fn to_instance(&self) -> QuadInstance {
        quad_instance(self.src_rect, self.dest_rect, self.size, self.angle, self.tint_color, self.effects)
    }
}
