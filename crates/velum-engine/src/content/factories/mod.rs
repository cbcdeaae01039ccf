//! Resource factories backed by real decoders.

pub mod font;
pub mod texture;

pub use font::FontdueFontFactory;
pub use texture::ImageTextureFactory;
