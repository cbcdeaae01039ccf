use bitflags::bitflags;

bitflags! {
    /// Per-item mirroring applied in the textured shaders.
    ///
    /// The bits are uploaded as-is in the instance `effects` field.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct RenderEffects: u32 {
        const FLIP_HORIZONTALLY = 1 << 0;
        const FLIP_VERTICALLY   = 1 << 1;
    }
}
