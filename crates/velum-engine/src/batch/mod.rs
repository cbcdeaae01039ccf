//! Draw batching.
//!
//! Render calls become fixed-size items in per-kind [`BatchBuffer`]s. The
//! [`BatchRenderer`] flushes a buffer when it fills up and at `end_batch`,
//! turning it into one instance upload and one draw per run of items that
//! share a texture.

pub mod buffer;
pub mod effects;
pub mod error;
pub mod instance;
pub mod item;
pub mod rect;
pub mod renderer;

pub use buffer::{BatchBuffer, TextureRuns};
pub use effects::RenderEffects;
pub use error::{BatchError, BufferFull};
pub use instance::{QuadInstance, RectInstance};
pub use item::{BatchItem, GlyphBatchItem, TextureBatchItem};
pub use rect::{RectBatchItem, RectShape};
pub use renderer::BatchRenderer;
