//! wgpu backend: pipelines, resident textures and frame replay.

mod backend;
mod common;
mod textures;

pub use backend::WgpuBackend;
pub use textures::{GpuTexture, GpuTextures, WgpuTextureUploader};
