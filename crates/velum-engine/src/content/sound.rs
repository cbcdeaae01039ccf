use crate::reactive::DisposeSoundData;

use super::{CachedResource, ContentError, ResourceKind};

/// Encoded audio formats the sound cache accepts.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SoundFormat {
    Ogg,
    Mp3,
}

impl SoundFormat {
    /// Maps an extension (with leading dot, any case) to a format.
    pub fn from_extension(extension: &str) -> Option<Self> {
        if extension.eq_ignore_ascii_case(".ogg") {
            Some(Self::Ogg)
        } else if extension.eq_ignore_ascii_case(".mp3") {
            Some(Self::Mp3)
        } else {
            None
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Ogg => ".ogg",
            Self::Mp3 => ".mp3",
        }
    }
}

/// Handle to an audio buffer owned by the audio backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sound {
    id: u32,
    path: String,
    format: SoundFormat,
}

impl Sound {
    pub fn new(id: u32, path: impl Into<String>, format: SoundFormat) -> Self {
        Self {
            id,
            path: path.into(),
            format,
        }
    }

    #[inline]
    pub fn format(&self) -> SoundFormat {
        self.format
    }
}

impl CachedResource for Sound {
    fn id(&self) -> u32 {
        self.id
    }

    fn path(&self) -> &str {
        &self.path
    }
}

/// Cache policy for sounds.
#[derive(Debug)]
pub enum SoundKind {}

impl ResourceKind for SoundKind {
    const NAME: &'static str = "sound";
    const SUPPORTED_EXTENSIONS: &'static [&'static str] = &[".ogg", ".mp3"];

    type Resource = Sound;
    type Dispose = DisposeSoundData;

    fn dispose_data(sound: &Sound) -> Result<DisposeSoundData, ContentError> {
        Ok(DisposeSoundData::new(sound.id))
    }
}
