use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use anyhow::{bail, Result};

use crate::content::{ImageData, PixelFormat, TextureUploader};
use crate::render::TextureStore;

/// A texture owned by [`GpuTextures`].
#[derive(Debug)]
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
    pub label: String,
}

/// Registry of live GPU textures by id.
///
/// Ids start at 1 and are never reused.
#[derive(Debug)]
pub struct GpuTextures {
    next_id: u32,
    entries: HashMap<u32, GpuTexture>,
}

impl Default for GpuTextures {
    fn default() -> Self {
        Self::new()
    }
}

impl GpuTextures {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            entries: HashMap::new(),
        }
    }

    pub fn insert(&mut self, texture: GpuTexture) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.insert(id, texture);
        id
    }

    pub fn get(&self, texture_id: u32) -> Option<&GpuTexture> {
        self.entries.get(&texture_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TextureStore for GpuTextures {
    fn remove_texture(&mut self, texture_id: u32) -> bool {
        match self.entries.remove(&texture_id) {
            Some(entry) => {
                entry.texture.destroy();
                true
            }
            None => false,
        }
    }
}

/// [`TextureUploader`] that creates wgpu textures in a shared [`GpuTextures`].
///
/// RGBA images become `Rgba8UnormSrgb`, coverage images `R8Unorm`.
#[derive(Debug, Clone)]
pub struct WgpuTextureUploader {
    device: wgpu::Device,
    queue: wgpu::Queue,
    textures: Rc<RefCell<GpuTextures>>,
}

impl WgpuTextureUploader {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, textures: Rc<RefCell<GpuTextures>>) -> Self {
        Self {
            device: device.clone(),
            queue: queue.clone(),
            textures,
        }
    }
}

impl TextureUploader for WgpuTextureUploader {
    fn upload(&mut self, name: &str, image: &ImageData) -> Result<u32> {
        if !image.is_valid() {
            bail!(
                "image '{name}' is {}x{} {:?} but carries {} bytes",
                image.width,
                image.height,
                image.format,
                image.pixels.len()
            );
        }

        let limit = self.device.limits().max_texture_dimension_2d;
        if image.width > limit || image.height > limit {
            bail!("image '{name}' ({}x{}) exceeds the {limit}px texture limit", image.width, image.height);
        }

        let format = match image.format {
            PixelFormat::Rgba8 => wgpu::TextureFormat::Rgba8UnormSrgb,
            PixelFormat::R8 => wgpu::TextureFormat::R8Unorm,
        };
        let size = wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        };

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(name),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(image.bytes_per_row()),
                rows_per_image: Some(image.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let id = self.textures.borrow_mut().insert(GpuTexture {
            texture,
            view,
            width: image.width,
            height: image.height,
            label: name.to_owned(),
        });

        log::debug!("uploaded texture '{name}' as {id} ({}x{} {format:?})", image.width, image.height);
        Ok(id)
    }
}
