/// Per-corner radii for a rectangle shape (pixels).
///
/// Order: top-left, top-right, bottom-right, bottom-left.
/// Renderers clamp each radius to half the shorter rectangle side.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct CornerRadii {
    pub top_left: f32,
    pub top_right: f32,
    pub bottom_right: f32,
    pub bottom_left: f32,
}

impl CornerRadii {
    #[inline]
    pub const fn new(top_left: f32, top_right: f32, bottom_right: f32, bottom_left: f32) -> Self {
        Self { top_left, top_right, bottom_right, bottom_left }
    }

    #[inline]
    pub const fn all(r: f32) -> Self {
        Self { top_left: r, top_right: r, bottom_right: r, bottom_left: r }
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self == Self::default()
    }

    /// Clamps every corner into `[0, max]`.
    #[inline]
    pub fn clamped(self, max: f32) -> Self {
        let c = |r: f32| r.clamp(0.0, max.max(0.0));
        Self::new(c(self.top_left), c(self.top_right), c(self.bottom_right), c(self.bottom_left))
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.top_left, self.top_right, self.bottom_right, self.bottom_left]
    }
}
