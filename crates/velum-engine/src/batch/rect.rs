use crate::coords::{CornerRadii, Rect, Vec2};
use crate::paint::{resolve_gradient, Color, ColorGradient};
use crate::shader::ShaderType;

use super::{BatchItem, RectInstance};

/// A rectangle to draw, positioned by its center.
///
/// `Default` is the empty batch sentinel (all zero). Use [`RectShape::new`]
/// for a drawable shape: white, filled, 1px border, 1px corner radius.
///
/// Width and height are raised to at least 1 pixel. Corner radii and border
/// thickness are clamped to half the shorter side when encoded.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct RectShape {
    /// Center of the rectangle.
    pub position: Vec2,
    width: f32,
    height: f32,
    pub color: Color,
    pub is_filled: bool,
    /// Border width when not filled.
    pub border_thickness: f32,
    pub corner_radius: CornerRadii,
    pub gradient_type: ColorGradient,
    pub gradient_start: Color,
    pub gradient_stop: Color,
}

pub type RectBatchItem = RectShape;

impl RectShape {
    pub fn new(position: Vec2, width: f32, height: f32) -> Self {
        Self {
            position,
            width: width.max(1.0),
            height: height.max(1.0),
            color: Color::WHITE,
            is_filled: true,
            border_thickness: 1.0,
            corner_radius: CornerRadii::all(1.0),
            gradient_type: ColorGradient::None,
            gradient_start: Color::WHITE,
            gradient_stop: Color::WHITE,
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.height
    }

    #[inline]
    pub fn set_width(&mut self, width: f32) {
        self.width = width.max(1.0);
    }

    #[inline]
    pub fn set_height(&mut self, height: f32) {
        self.height = height.max(1.0);
    }

    #[inline]
    pub fn half_width(&self) -> f32 {
        self.width * 0.5
    }

    #[inline]
    pub fn half_height(&self) -> f32 {
        self.height * 0.5
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.position.x - self.half_width()
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.position.x + self.half_width()
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.position.y - self.half_height()
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.position.y + self.half_height()
    }

    /// Moves the shape so its left edge is at `x`.
    pub fn set_left(&mut self, x: f32) {
        self.position.x = x + self.half_width();
    }

    pub fn set_right(&mut self, x: f32) {
        self.position.x = x - self.half_width();
    }

    pub fn set_top(&mut self, y: f32) {
        self.position.y = y + self.half_height();
    }

    pub fn set_bottom(&mut self, y: f32) {
        self.position.y = y - self.half_height();
    }

    /// Screen bounds (top-left origin).
    pub fn bounds(&self) -> Rect {
        Rect::new(self.left(), self.top(), self.width, self.height)
    }
}

impl BatchItem for RectShape {
    type Instance = RectInstance;
    const SHADER: ShaderType = ShaderType::Rectangle;

    #[inline]
    fn texture_id(&self) -> u32 {
        0
    }

    fn to_instance(&self) -> RectInstance {
        let w = self.width.max(1.0);
        let h = self.height.max(1.0);
        let bounds = Rect::new(self.position.x - w * 0.5, self.position.y - h * 0.5, w, h);
        let half_short = w.min(h) * 0.5;

        let axis = resolve_gradient(
            self.gradient_type,
            self.color,
            self.gradient_start,
            self.gradient_stop,
            bounds,
        );

        let (border, filled) = if self.is_filled {
            (0.0, 1.0)
        } else {
            (self.border_thickness.clamp(1.0, half_short.max(1.0)), 0.0)
        };

        RectInstance {
            origin: bounds.origin.to_array(),
            size: bounds.size.to_array(),
            radii: self.corner_radius.clamped(half_short).to_array(),
            color0: axis.color0,
            color1: axis.color1,
            grad_p0: axis.start,
            grad_p1: axis.end,
            border_filled: [border, filled],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::from_premul(1.0, 0.0, 0.0, 1.0);
    const BLUE: Color = Color::from_premul(0.0, 0.0, 1.0, 1.0);

    #[test]
    fn default_is_empty_but_new_is_not() {
        assert!(RectShape::default().is_empty());
        assert!(!RectShape::new(Vec2::zero(), 1.0, 1.0).is_empty());
    }

    #[test]
    fn size_is_at_least_one_pixel() {
        let mut shape = RectShape::new(Vec2::zero(), 0.0, -5.0);
        assert_eq!((shape.width(), shape.height()), (1.0, 1.0));
        shape.set_width(0.25);
        assert_eq!(shape.width(), 1.0);
        shape.set_height(40.0);
        assert_eq!(shape.height(), 40.0);
    }

    #[test]
    fn edges_follow_center() {
        let mut shape = RectShape::new(Vec2::new(50.0, 40.0), 20.0, 10.0);
        assert_eq!((shape.left(), shape.right()), (40.0, 60.0));
        assert_eq!((shape.top(), shape.bottom()), (35.0, 45.0));

        shape.set_left(0.0);
        assert_eq!(shape.position.x, 10.0);
        shape.set_bottom(100.0);
        assert_eq!(shape.position.y, 95.0);
        assert_eq!(shape.bounds(), Rect::new(0.0, 90.0, 20.0, 10.0));
    }

    #[test]
    fn filled_solid_encoding() {
        let mut shape = RectShape::new(Vec2::new(50.0, 40.0), 20.0, 10.0);
        shape.color = RED;
        let inst = shape.to_instance();

        assert_eq!(inst.origin, [40.0, 35.0]);
        assert_eq!(inst.size, [20.0, 10.0]);
        assert_eq!(inst.color0, RED.to_array());
        assert_eq!(inst.color1, RED.to_array());
        assert_eq!(inst.grad_p0, inst.grad_p1);
        assert_eq!(inst.border_filled, [0.0, 1.0]);
        assert_eq!(inst.radii, [1.0; 4]);
    }

    #[test]
    fn horizontal_gradient_spans_the_shape() {
        let mut shape = RectShape::new(Vec2::new(50.0, 40.0), 20.0, 10.0);
        shape.gradient_type = ColorGradient::Horizontal;
        shape.gradient_start = RED;
        shape.gradient_stop = BLUE;
        let inst = shape.to_instance();

        assert_eq!(inst.grad_p0, [40.0, 40.0]);
        assert_eq!(inst.grad_p1, [60.0, 40.0]);
        assert_eq!(inst.color0, RED.to_array());
        assert_eq!(inst.color1, BLUE.to_array());
    }

    #[test]
    fn border_and_radius_are_clamped_to_half_short_side() {
        let mut shape = RectShape::new(Vec2::zero(), 20.0, 10.0);
        shape.is_filled = false;
        shape.border_thickness = 30.0;
        shape.corner_radius = CornerRadii::new(100.0, 2.0, -3.0, 5.0);
        let inst = shape.to_instance();

        assert_eq!(inst.border_filled, [5.0, 0.0]);
        assert_eq!(inst.radii, [5.0, 2.0, 0.0, 5.0]);
    }

    #[test]
    fn hollow_border_is_at_least_one_pixel() {
        let mut shape = RectShape::new(Vec2::zero(), 20.0, 10.0);
        shape.is_filled = false;
        shape.border_thickness = 0.0;
        assert_eq!(shape.to_instance().border_filled, [1.0, 0.0]);
    }
}
