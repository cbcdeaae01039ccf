//! Paint model shared by batch items and shaders.
//!
//! Scope:
//! - color representation (linear premultiplied alpha)
//! - two-color gradients for rectangle shapes

pub mod color;
pub mod gradient;

pub use color::Color;
pub use gradient::{resolve_gradient, ColorGradient, GradientAxis};
