use super::Vec2;

/// Axis-aligned rectangle in pixels (top-left origin).
///
/// Used for texture source regions (texels) and screen destinations (pixels).
/// The all-zero rectangle is part of the empty batch item sentinel.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    /// Rectangle at the origin with the given size, e.g. a whole texture.
    #[inline]
    pub const fn from_size(w: f32, h: f32) -> Self {
        Self::new(0.0, 0.0, w, h)
    }

    #[inline]
    pub fn max(self) -> Vec2 {
        Vec2::new(self.origin.x + self.size.x, self.origin.y + self.size.y)
    }

    #[inline]
    pub fn center(self) -> Vec2 {
        Vec2::new(
            self.origin.x + self.size.x * 0.5,
            self.origin.y + self.size.y * 0.5,
        )
    }

    /// True when the rectangle covers no area.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    /// True for the all-zero rectangle (`Rect::default()`).
    #[inline]
    pub fn is_zero(self) -> bool {
        self == Self::default()
    }

    /// Normalizes the rectangle so width/height are non-negative.
    #[inline]
    pub fn normalized(self) -> Self {
        let mut x = self.origin.x;
        let mut y = self.origin.y;
        let mut w = self.size.x;
        let mut h = self.size.y;

        if w < 0.0 {
            x += w;
            w = -w;
        }
        if h < 0.0 {
            y += h;
            h = -h;
        }

        Rect::new(x, y, w, h)
    }

    /// Scales the size by `factor`, keeping the center fixed.
    #[inline]
    pub fn scaled_about_center(self, factor: f32) -> Self {
        let c = self.center();
        let w = self.size.x * factor;
        let h = self.size.y * factor;
        Rect::new(c.x - w * 0.5, c.y - h * 0.5, w, h)
    }
}
