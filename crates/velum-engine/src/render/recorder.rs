use std::collections::BTreeSet;
use std::ops::Range;

use crate::shader::ShaderId;

use super::GpuDevice;

/// One `draw_instances` call and the texture bound at the time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedDraw {
    pub texture: Option<u32>,
    pub instances: Range<u32>,
}

/// One instance upload and the draws that read from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedSegment {
    pub program: ShaderId,
    /// Byte range of the upload inside [`CommandRecorder::staged`].
    pub bytes: Range<u64>,
    pub draws: Vec<RecordedDraw>,
}

/// [`GpuDevice`] that only records, for backends that replay a frame later.
///
/// Every upload is appended to one staging buffer so a frame needs a single
/// GPU write. Binding a program clears the bound texture.
#[derive(Debug, Default)]
pub struct CommandRecorder {
    staged: Vec<u8>,
    segments: Vec<RecordedSegment>,
    program: Option<ShaderId>,
    texture: Option<u32>,
    accepting_draws: bool,
}

/// Vertex buffer offsets must be multiples of this.
const OFFSET_ALIGNMENT: usize = 4;

impl CommandRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn staged(&self) -> &[u8] {
        &self.staged
    }

    #[inline]
    pub fn segments(&self) -> &[RecordedSegment] {
        &self.segments
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(|s| s.draws.is_empty())
    }

    /// Distinct textures referenced by recorded draws.
    pub fn texture_ids(&self) -> BTreeSet<u32> {
        self.segments
            .iter()
            .flat_map(|s| s.draws.iter().filter_map(|d| d.texture))
            .collect()
    }

    /// Drops everything recorded. Capacity is kept for the next frame.
    pub fn clear(&mut self) {
        self.staged.clear();
        self.segments.clear();
        self.program = None;
        self.texture = None;
        self.accepting_draws = false;
    }
}

impl GpuDevice for CommandRecorder {
    fn use_program(&mut self, program: ShaderId) {
        self.program = Some(program);
        self.texture = None;
    }

    fn upload_instances(&mut self, bytes: &[u8]) {
        let Some(program) = self.program else {
            log::warn!("instance upload without a program; following draws are dropped");
            self.accepting_draws = false;
            return;
        };

        let padded = self.staged.len().next_multiple_of(OFFSET_ALIGNMENT);
        self.staged.resize(padded, 0);

        let start = self.staged.len() as u64;
        self.staged.extend_from_slice(bytes);
        let end = self.staged.len() as u64;

        self.segments.push(RecordedSegment {
            program,
            bytes: start..end,
            draws: Vec::new(),
        });
        self.accepting_draws = true;
    }

    fn bind_texture(&mut self, texture_id: u32) {
        self.texture = Some(texture_id);
    }

    fn draw_instances(&mut self, instances: Range<u32>) {
        if !self.accepting_draws {
            log::warn!("draw without an instance upload; dropped");
            return;
        }
        if let Some(segment) = self.segments.last_mut() {
            segment.draws.push(RecordedDraw {
                texture: self.texture,
                instances,
            });
        }
    }
}
