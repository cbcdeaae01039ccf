use crate::reactive::DisposeTextureData;

use super::{CachedResource, ContentError, ResourceKind};

/// Who is responsible for releasing a texture.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum Ownership {
    /// Released through its cache.
    #[default]
    Owned,
    /// Owned by another resource (a font atlas); released with that owner.
    Pooled,
}

/// Handle to a GPU texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    id: u32,
    name: String,
    path: String,
    width: u32,
    height: u32,
    ownership: Ownership,
}

impl Texture {
    pub fn new(id: u32, name: impl Into<String>, path: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id,
            name: name.into(),
            path: path.into(),
            width,
            height,
            ownership: Ownership::Owned,
        }
    }

    #[inline]
    pub fn pooled(mut self) -> Self {
        self.ownership = Ownership::Pooled;
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    #[inline]
    pub fn is_pooled(&self) -> bool {
        self.ownership == Ownership::Pooled
    }
}

impl CachedResource for Texture {
    fn id(&self) -> u32 {
        self.id
    }

    fn path(&self) -> &str {
        &self.path
    }
}

/// Cache policy for textures.
#[derive(Debug)]
pub enum TextureKind {}

impl ResourceKind for TextureKind {
    const NAME: &'static str = "texture";
    const SUPPORTED_EXTENSIONS: &'static [&'static str] = &[".png"];

    type Resource = Texture;
    type Dispose = DisposeTextureData;

    fn dispose_data(texture: &Texture) -> Result<DisposeTextureData, ContentError> {
        match texture.ownership {
            Ownership::Owned => Ok(DisposeTextureData::new(texture.id)),
            Ownership::Pooled => Err(ContentError::PooledDisposal {
                kind: Self::NAME,
                path: texture.path.clone(),
            }),
        }
    }
}

/// Texel layout of an [`ImageData`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PixelFormat {
    /// Premultiplied RGBA, 4 bytes per texel.
    Rgba8,
    /// Single coverage channel, 1 byte per texel.
    R8,
}

impl PixelFormat {
    #[inline]
    pub fn bytes_per_pixel(self) -> u32 {
        match self {
            Self::Rgba8 => 4,
            Self::R8 => 1,
        }
    }
}

/// Decoded pixels ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub pixels: Vec<u8>,
}

impl ImageData {
    pub fn new(width: u32, height: u32, format: PixelFormat, pixels: Vec<u8>) -> Self {
        Self { width, height, format, pixels }
    }

    #[inline]
    pub fn bytes_per_row(&self) -> u32 {
        self.width * self.format.bytes_per_pixel()
    }

    /// True when the pixel buffer matches the dimensions and format.
    pub fn is_valid(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.pixels.len() == (self.bytes_per_row() * self.height) as usize
    }
}

/// Uploads decoded pixels to the GPU and returns the new texture id.
///
/// Ids are non-zero; zero is reserved for "no texture".
pub trait TextureUploader {
    fn upload(&mut self, name: &str, image: &ImageData) -> anyhow::Result<u32>;
}
