use crate::coords::Rect;

use super::Color;

/// Direction of a two-color gradient across a rectangle shape.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum ColorGradient {
    /// Solid fill using the shape's color.
    #[default]
    None,
    /// Start color on the left edge, stop color on the right edge.
    Horizontal,
    /// Start color on the top edge, stop color on the bottom edge.
    Vertical,
}

/// Gradient resolved against concrete bounds, in the form shaders consume.
///
/// A solid fill is encoded as identical colors with a zero-length axis; the
/// shader falls back to `color0` when `start == end`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GradientAxis {
    pub color0: [f32; 4],
    pub color1: [f32; 4],
    pub start: [f32; 2],
    pub end: [f32; 2],
}

impl GradientAxis {
    #[inline]
    pub fn solid(color: Color) -> Self {
        let c = color.to_array();
        Self { color0: c, color1: c, start: [0.0; 2], end: [0.0; 2] }
    }

    #[inline]
    pub fn is_solid(&self) -> bool {
        self.start == self.end
    }
}

/// Encodes `kind` over `bounds`.
///
/// `solid` is used only for [`ColorGradient::None`]; `start`/`stop` only for
/// the directional variants.
pub fn resolve_gradient(
    kind: ColorGradient,
    solid: Color,
    start: Color,
    stop: Color,
    bounds: Rect,
) -> GradientAxis {
    let min = bounds.origin;
    let max = bounds.max();
    let center = bounds.center();

    let (p0, p1) = match kind {
        ColorGradient::None => return GradientAxis::solid(solid),
        ColorGradient::Horizontal => ([min.x, center.y], [max.x, center.y]),
        ColorGradient::Vertical => ([center.x, min.y], [center.x, max.y]),
    };

    if p0 == p1 {
        // Zero-width bounds cannot carry an axis; show the start color.
        return GradientAxis::solid(start);
    }

    GradientAxis {
        color0: start.to_array(),
        color1: stop.to_array(),
        start: p0,
        end: p1,
    }
}
