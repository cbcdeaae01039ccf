use super::ContentError;

/// A resource held by a [`ResourceCache`](super::ResourceCache).
pub trait CachedResource {
    /// Backend id (GPU texture id, audio buffer id).
    fn id(&self) -> u32;

    /// Path the resource was loaded from; also its cache key.
    fn path(&self) -> &str;
}

/// Builds a resource from a validated path.
///
/// The cache calls this only after the extension and existence checks pass.
pub trait ResourceFactory<R> {
    fn create(&mut self, path: &str) -> Result<R, ContentError>;
}

/// Per-kind policy for a [`ResourceCache`](super::ResourceCache).
///
/// One implementor per resource kind keeps the format rules explicit and
/// testable without a cache.
pub trait ResourceKind: 'static {
    /// Lowercase name used in messages (`"sound"`).
    const NAME: &'static str;

    /// Accepted extensions with the leading dot, compared case-insensitively.
    const SUPPORTED_EXTENSIONS: &'static [&'static str];

    type Resource: CachedResource + 'static;

    /// Payload published when a resource of this kind is released.
    type Dispose: Clone + 'static;

    /// Builds the dispose payload, or refuses when the resource may not be
    /// released on its own.
    fn dispose_data(resource: &Self::Resource) -> Result<Self::Dispose, ContentError>;

    fn supports_extension(extension: &str) -> bool {
        Self::SUPPORTED_EXTENSIONS
            .iter()
            .any(|e| e.eq_ignore_ascii_case(extension))
    }
}
