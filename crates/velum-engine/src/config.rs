//! Engine configuration structures.
//!
//! Keep these small and `Default`-able. Add knobs only when a caller needs
//! them.

/// Slots per batch buffer when nothing else is configured.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Environment variable read by [`BatchConfig::from_env`].
pub const BATCH_SIZE_ENV: &str = "VELUM_BATCH_SIZE";

/// Batch renderer configuration.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BatchConfig {
    /// Capacity of each batch buffer (one buffer per item kind).
    ///
    /// Reaching this many items of one kind inside a batch triggers a flush.
    pub batch_size: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl BatchConfig {
    /// Reads `VELUM_BATCH_SIZE`, falling back to the default when unset or invalid.
    pub fn from_env() -> Self {
        let raw = std::env::var(BATCH_SIZE_ENV).ok();
        Self {
            batch_size: parse_batch_size(raw.as_deref()),
        }
    }

    #[inline]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }
}

fn parse_batch_size(raw: Option<&str>) -> usize {
    let Some(raw) = raw else {
        return DEFAULT_BATCH_SIZE;
    };

    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => n,
        _ => {
            log::warn!(
                "ignoring {BATCH_SIZE_ENV}={raw:?}; expected a positive integer, using {DEFAULT_BATCH_SIZE}"
            );
            DEFAULT_BATCH_SIZE
        }
    }
}

/// Font atlas configuration used by the font factory.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FontConfig {
    /// Rasterization size in pixels per em.
    pub size_in_points: f32,

    /// Fixed atlas width in texels. Height grows to fit the glyph set.
    pub atlas_width: u32,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            size_in_points: 12.0,
            atlas_width: 512,
        }
    }
}
