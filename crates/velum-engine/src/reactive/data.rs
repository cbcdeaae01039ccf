/// Request to release the GPU texture with the given backend id.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct DisposeTextureData {
    pub texture_id: u32,
}

impl DisposeTextureData {
    #[inline]
    pub const fn new(texture_id: u32) -> Self {
        Self { texture_id }
    }
}

/// Request to release the audio buffer with the given backend id.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct DisposeSoundData {
    pub sound_id: u32,
}

impl DisposeSoundData {
    #[inline]
    pub const fn new(sound_id: u32) -> Self {
        Self { sound_id }
    }
}

/// Application shutdown. Every cache disposes what it still holds.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct ShutDownData;
