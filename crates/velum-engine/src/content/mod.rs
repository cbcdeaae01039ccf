//! Content caches: path-keyed loading and lifetime of textures, sounds and
//! fonts.
//!
//! Each cache validates the path (non-empty, supported extension, file exists)
//! before calling its factory, hands out `Rc` handles, and reports every
//! release on a dispose [`Reactable`](crate::reactive::Reactable) so backends
//! free the GPU or audio memory.

pub mod cache;
pub mod decode;
pub mod error;
pub mod factories;
pub mod font;
pub mod fs;
pub mod resource;
pub mod sound;
pub mod texture;

pub use cache::{FontCache, ResourceCache, SoundCache, TextureCache};
pub use error::ContentError;
pub use factories::{FontdueFontFactory, ImageTextureFactory};
pub use font::{Font, FontKind, GlyphMetrics, PlacedGlyph};
pub use fs::{FileSystem, StdFileSystem};
pub use resource::{CachedResource, ResourceFactory, ResourceKind};
pub use sound::{Sound, SoundFormat, SoundKind};
pub use texture::{ImageData, Ownership, PixelFormat, Texture, TextureKind, TextureUploader};
