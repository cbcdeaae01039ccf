use crate::config::BatchConfig;
use crate::content::{CachedResource, Font, Texture};
use crate::coords::{Rect, Vec2, Viewport};
use crate::paint::Color;
use crate::render::GpuDevice;
use crate::shader::ShaderManager;

use super::{
    BatchBuffer, BatchError, BatchItem, GlyphBatchItem, RectShape, RenderEffects, TextureBatchItem,
};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum BatchState {
    Idle,
    Batching,
}

#[derive(Debug)]
struct Buffers {
    textures: BatchBuffer<TextureBatchItem>,
    rects: BatchBuffer<RectShape>,
    glyphs: BatchBuffer<GlyphBatchItem>,
}

/// Everything a flush touches besides the buffer being flushed.
struct Submitter<'a, D: GpuDevice + ?Sized> {
    device: &'a mut D,
    shaders: &'a ShaderManager,
    staging: &'a mut Vec<u8>,
    flush_count: &'a mut u64,
}

impl<D: GpuDevice + ?Sized> Submitter<'_, D> {
    /// Adds `item`, flushing `buffer` first when it is full.
    fn add<T: BatchItem>(&mut self, buffer: &mut BatchBuffer<T>, item: T) -> Result<(), BatchError> {
        if buffer.add(item).is_err() {
            self.flush(buffer);
            buffer.add(item)?;
        }
        Ok(())
    }

    /// Uploads and draws `buffer`, then clears it. Empty buffers submit nothing.
    fn flush<T: BatchItem>(&mut self, buffer: &mut BatchBuffer<T>) {
        if !buffer.has_work() {
            return;
        }

        self.shaders.use_shader(T::SHADER, &mut *self.device);

        self.staging.clear();
        for item in buffer.items() {
            self.staging.extend_from_slice(bytemuck::bytes_of(&item.to_instance()));
        }
        self.device.upload_instances(self.staging.as_slice());

        let mut draws = 0usize;
        for (texture_id, range) in buffer.texture_runs() {
            if texture_id != 0 {
                self.device.bind_texture(texture_id);
            }
            self.device.draw_instances(range);
            draws += 1;
        }

        log::trace!("flushed {} {:?} item(s) in {draws} draw(s)", buffer.len(), T::SHADER);

        buffer.clear();
        *self.flush_count += 1;
    }
}

/// Collects draw requests between `begin_batch` and `end_batch` and submits
/// them to the device in as few draws as ordering allows.
///
/// Invariants:
/// - Rendering outside a batch is an error; nothing is queued.
/// - Within one item kind, submission order is preserved. Consecutive items
///   sharing a texture become one draw.
/// - `end_batch` flushes textures, then rectangles, then glyphs, so text
///   lands on top of shapes and shapes on top of sprites.
#[derive(Debug)]
pub struct BatchRenderer<D: GpuDevice> {
    device: D,
    shaders: ShaderManager,
    buffers: Buffers,
    state: BatchState,
    viewport_size: Viewport,
    staging: Vec<u8>,
    flush_count: u64,
}

impl<D: GpuDevice> BatchRenderer<D> {
    pub fn new(device: D, shaders: ShaderManager, config: BatchConfig) -> Self {
        let size = config.batch_size;
        Self {
            device,
            shaders,
            buffers: Buffers {
                textures: BatchBuffer::new(size),
                rects: BatchBuffer::new(size),
                glyphs: BatchBuffer::new(size),
            },
            state: BatchState::Idle,
            viewport_size: Viewport::default(),
            staging: Vec::new(),
            flush_count: 0,
        }
    }

    pub fn begin_batch(&mut self) {
        if self.state == BatchState::Batching {
            log::trace!("begin_batch while batching; continuing current batch");
        }
        self.state = BatchState::Batching;
    }

    /// Flushes everything queued and returns to idle. Does nothing when idle.
    pub fn end_batch(&mut self) {
        if self.state == BatchState::Idle {
            return;
        }

        let (mut submit, buffers) = self.split();
        submit.flush(&mut buffers.textures);
        submit.flush(&mut buffers.rects);
        submit.flush(&mut buffers.glyphs);

        self.state = BatchState::Idle;
    }

    /// Queues `src` of `texture` drawn into `dest`.
    ///
    /// `size` scales `dest` about its center (1.0 keeps it), `angle` rotates
    /// clockwise in degrees.
    #[allow(clippy::too_many_arguments)]
    pub fn render_texture(
        &mut self,
        texture: &Texture,
        src: Rect,
        dest: Rect,
        size: f32,
        angle: f32,
        tint: Color,
        effects: RenderEffects,
    ) -> Result<(), BatchError> {
        self.ensure_batching()?;
        let texture_id = checked_texture_id(texture.id())?;

        let item = TextureBatchItem {
            src_rect: src,
            dest_rect: dest,
            size,
            angle,
            tint_color: tint,
            effects,
            viewport_size: self.viewport_size,
            texture_id,
        };

        let (mut submit, buffers) = self.split();
        submit.add(&mut buffers.textures, item)
    }

    /// Queues the whole `texture` centered on `(x, y)`.
    pub fn render_texture_at(&mut self, texture: &Texture, x: f32, y: f32) -> Result<(), BatchError> {
        self.render_texture_tinted(texture, x, y, Color::WHITE)
    }

    /// Like [`render_texture_at`](Self::render_texture_at) with a tint.
    pub fn render_texture_tinted(
        &mut self,
        texture: &Texture,
        x: f32,
        y: f32,
        tint: Color,
    ) -> Result<(), BatchError> {
        let w = texture.width() as f32;
        let h = texture.height() as f32;
        let dest = Rect::new(x - w * 0.5, y - h * 0.5, w, h);
        self.render_texture(texture, Rect::from_size(w, h), dest, 1.0, 0.0, tint, RenderEffects::empty())
    }

    pub fn render_glyph(&mut self, glyph: GlyphBatchItem) -> Result<(), BatchError> {
        self.ensure_batching()?;
        checked_texture_id(glyph.texture_id)?;

        let (mut submit, buffers) = self.split();
        submit.add(&mut buffers.glyphs, glyph)
    }

    /// Lays out `text` with `font` and queues one glyph per visible character.
    ///
    /// `(x, y)` is the top-left of the first line.
    pub fn render_text(
        &mut self,
        font: &Font,
        text: &str,
        x: f32,
        y: f32,
        tint: Color,
    ) -> Result<(), BatchError> {
        self.ensure_batching()?;
        let texture_id = checked_texture_id(font.id())?;
        let viewport_size = self.viewport_size;

        let (mut submit, buffers) = self.split();
        for placed in font.layout(text, Vec2::new(x, y)) {
            let item = GlyphBatchItem {
                src_rect: placed.src,
                dest_rect: placed.dest,
                glyph: placed.glyph,
                size: 1.0,
                angle: 0.0,
                tint_color: tint,
                effects: RenderEffects::empty(),
                viewport_size,
                texture_id,
            };
            submit.add(&mut buffers.glyphs, item)?;
        }
        Ok(())
    }

    /// Queues `shape`. The empty shape draws nothing.
    pub fn render_rect(&mut self, shape: &RectShape) -> Result<(), BatchError> {
        self.ensure_batching()?;
        if shape.is_empty() {
            return Ok(());
        }

        let (mut submit, buffers) = self.split();
        submit.add(&mut buffers.rects, *shape)
    }

    #[inline]
    pub fn viewport_size(&self) -> Viewport {
        self.viewport_size
    }

    #[inline]
    pub fn set_viewport_size(&mut self, viewport: Viewport) {
        self.viewport_size = viewport;
    }

    #[inline]
    pub fn is_batching(&self) -> bool {
        self.state == BatchState::Batching
    }

    #[inline]
    pub fn device(&self) -> &D {
        &self.device
    }

    #[inline]
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    #[inline]
    pub fn shaders(&self) -> &ShaderManager {
        &self.shaders
    }

    /// Number of buffer flushes submitted so far.
    #[inline]
    pub fn flush_count(&self) -> u64 {
        self.flush_count
    }

    /// Items queued and not yet flushed, per kind: (textures, rects, glyphs).
    pub fn pending(&self) -> (usize, usize, usize) {
        (
            self.buffers.textures.len(),
            self.buffers.rects.len(),
            self.buffers.glyphs.len(),
        )
    }

    fn ensure_batching(&self) -> Result<(), BatchError> {
        match self.state {
            BatchState::Batching => Ok(()),
            BatchState::Idle => Err(BatchError::BatchNotStarted),
        }
    }

    fn split(&mut self) -> (Submitter<'_, D>, &mut Buffers) {
        (
            Submitter {
                device: &mut self.device,
                shaders: &self.shaders,
                staging: &mut self.staging,
                flush_count: &mut self.flush_count,
            },
            &mut self.buffers,
        )
    }
}

#[inline]
fn checked_texture_id(texture_id: u32) -> Result<u32, BatchError> {
    if texture_id == 0 {
        Err(BatchError::InvalidTexture { texture_id })
    } else {
        Ok(texture_id)
    }
}
