//! GPU submission.
//!
//! The batch renderer talks to a [`GpuDevice`]. The wgpu backend records those
//! calls with a [`CommandRecorder`] and replays them into a render pass.
//!
//! Convention:
//! - CPU geometry is in pixels (top-left origin, +Y down).
//! - Vertex shaders convert to NDC using a viewport uniform.

pub mod device;
pub mod disposer;
pub mod gpu;
pub mod recorder;
mod target;

pub use device::GpuDevice;
pub use disposer::{TextureDisposer, TextureStore};
pub use gpu::{GpuTextures, WgpuBackend, WgpuTextureUploader};
pub use recorder::{CommandRecorder, RecordedDraw, RecordedSegment};
pub use target::{RenderCtx, RenderTarget};
