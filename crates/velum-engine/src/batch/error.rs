use thiserror::Error;

/// Returned by [`BatchBuffer::add`](super::BatchBuffer::add) when every slot is taken.
#[derive(Error, Debug, Copy, Clone, Eq, PartialEq)]
#[error("batch buffer is full ({capacity} items)")]
pub struct BufferFull {
    pub capacity: usize,
}

#[derive(Error, Debug, Copy, Clone, Eq, PartialEq)]
pub enum BatchError {
    #[error("The batch has not been started. Call begin_batch() before rendering.")]
    BatchNotStarted,

    #[error("The texture id must be greater than 0 (got {texture_id}).")]
    InvalidTexture { texture_id: u32 },

    /// A freshly flushed buffer still refused the item.
    #[error(transparent)]
    BufferFull(#[from] BufferFull),
}
