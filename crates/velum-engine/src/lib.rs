//! Velum engine crate.
//!
//! Resource caches with lifecycle notifications, plus batched submission of
//! textures, glyphs and rectangles to the GPU.

pub mod batch;
pub mod config;
pub mod content;
pub mod coords;
pub mod logging;
pub mod paint;
pub mod reactive;
pub mod render;
pub mod shader;
