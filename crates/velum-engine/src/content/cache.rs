use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::rc::{Rc, Weak};

use crate::reactive::{Reactable, Reactor, ShutDownData, Subscription};

use super::error::describe_extensions;
use super::{
    CachedResource, ContentError, FileSystem, FontKind, ResourceFactory, ResourceKind, SoundKind,
    TextureKind,
};

pub type SoundCache = ResourceCache<SoundKind>;
pub type TextureCache = ResourceCache<TextureKind>;
pub type FontCache = ResourceCache<FontKind>;

struct CacheState<K: ResourceKind> {
    items: HashMap<String, Rc<K::Resource>>,
    disposed: bool,
    shutdown_subscription: Option<Subscription<ShutDownData>>,
}

/// Path-keyed cache of loaded resources of one kind.
///
/// Invariants:
/// - At most one resource per key. A hit returns the same `Rc` and never
///   touches the file system or the factory.
/// - Every resource that leaves the cache is announced exactly once on the
///   dispose channel, after its entry has been removed.
/// - Shutdown is one-shot. Afterwards the cache is empty and rejects requests
///   with [`ContentError::Disposed`].
///
/// Not thread-safe; lives on the render thread with the buses it talks to.
pub struct ResourceCache<K: ResourceKind> {
    state: Rc<RefCell<CacheState<K>>>,
    factory: Box<dyn ResourceFactory<K::Resource>>,
    file_system: Rc<dyn FileSystem>,
    dispose_reactable: Reactable<K::Dispose>,
    _kind: PhantomData<K>,
}

impl<K: ResourceKind> ResourceCache<K> {
    /// Creates an empty cache and subscribes it to `shutdown_reactable`.
    pub fn new(
        factory: Box<dyn ResourceFactory<K::Resource>>,
        file_system: Rc<dyn FileSystem>,
        dispose_reactable: Reactable<K::Dispose>,
        shutdown_reactable: &Reactable<ShutDownData>,
    ) -> Self {
        let state = Rc::new(RefCell::new(CacheState::<K> {
            items: HashMap::new(),
            disposed: false,
            shutdown_subscription: None,
        }));

        let on_shutdown = {
            let state = Rc::downgrade(&state);
            let dispose = dispose_reactable.clone();
            move |_: &ShutDownData| shut_down::<K>(&state, &dispose)
        };
        let on_completed = {
            let state = Rc::downgrade(&state);
            move || {
                if let Some(state) = state.upgrade() {
                    // Taken out before dropping so the unsubscribe runs unborrowed.
                    let subscription = state.borrow_mut().shutdown_subscription.take();
                    drop(subscription);
                }
            }
        };

        let subscription =
            shutdown_reactable.subscribe(Reactor::with_completed(on_shutdown, on_completed));
        if subscription.is_active() {
            state.borrow_mut().shutdown_subscription = Some(subscription);
        }

        Self {
            state,
            factory,
            file_system,
            dispose_reactable,
            _kind: PhantomData,
        }
    }

    /// Returns the resource for `path`, loading it on first request.
    pub fn get_item(&mut self, path: &str) -> Result<Rc<K::Resource>, ContentError> {
        if path.is_empty() {
            return Err(ContentError::EmptyPath { kind: K::NAME });
        }

        {
            let state = self.state.borrow();
            if state.disposed {
                return Err(ContentError::Disposed { kind: K::NAME });
            }
            if let Some(hit) = state.items.get(path) {
                return Ok(Rc::clone(hit));
            }
        }

        let extension = self.file_system.extension(path).unwrap_or_default();
        if !K::supports_extension(&extension) {
            return Err(ContentError::UnsupportedFileType {
                kind: K::NAME,
                extension,
                supported: describe_extensions(K::SUPPORTED_EXTENSIONS),
            });
        }

        if !self.file_system.exists(path) {
            return Err(ContentError::FileNotFound {
                kind: K::NAME,
                path: path.to_owned(),
                extension,
            });
        }

        let resource = Rc::new(self.factory.create(path)?);
        log::debug!("loaded {} '{}' (id {})", K::NAME, path, resource.id());

        self.state
            .borrow_mut()
            .items
            .insert(path.to_owned(), Rc::clone(&resource));

        Ok(resource)
    }

    /// Removes `path` from the cache and announces its disposal.
    ///
    /// Unloading an absent key does nothing.
    pub fn unload(&mut self, path: &str) -> Result<(), ContentError> {
        let data = {
            let mut state = self.state.borrow_mut();
            let Some(resource) = state.items.get(path) else {
                return Ok(());
            };
            let data = K::dispose_data(resource)?;
            state.items.remove(path);
            data
        };

        log::debug!("unloaded {} '{}'", K::NAME, path);
        self.dispose_reactable.push_notification(&data);
        Ok(())
    }

    pub fn total_cached_items(&self) -> usize {
        self.state.borrow().items.len()
    }

    /// Cached keys in no particular order.
    pub fn cache_keys(&self) -> Vec<String> {
        self.state.borrow().items.keys().cloned().collect()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.state.borrow().items.contains_key(path)
    }

    pub fn is_disposed(&self) -> bool {
        self.state.borrow().disposed
    }
}

impl<K: ResourceKind> fmt::Debug for ResourceCache<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ResourceCache")
            .field("kind", &K::NAME)
            .field("items", &state.items.len())
            .field("disposed", &state.disposed)
            .finish_non_exhaustive()
    }
}

fn shut_down<K: ResourceKind>(
    state: &Weak<RefCell<CacheState<K>>>,
    dispose: &Reactable<K::Dispose>,
) {
    let Some(state) = state.upgrade() else {
        return;
    };

    let mut drained: Vec<(String, Rc<K::Resource>)> = {
        let mut state = state.borrow_mut();
        if state.disposed {
            return;
        }
        state.disposed = true;
        state.items.drain().collect()
    };
    drained.sort_by(|a, b| a.0.cmp(&b.0));

    log::info!("shutting down {} cache ({} item(s))", K::NAME, drained.len());

    for (path, resource) in drained {
        match K::dispose_data(&resource) {
            Ok(data) => dispose.push_notification(&data),
            Err(err) => log::debug!("dropping {} '{}' without notification: {err}", K::NAME, path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::HashSet;

    use crate::content::font::tests::sample_font;
    use crate::content::{Font, Sound, SoundFormat, Texture};
    use crate::logging::{init_logging, LoggingConfig};
    use crate::render::{TextureDisposer, TextureStore};
    use crate::reactive::{DisposeSoundData, DisposeTextureData};

    const SOUND_PATH: &str = "C:/sounds/test-sound.ogg";

    // ── fakes ────────────────────────────────────────────────────────────

    #[derive(Default)]
    struct FakeFs {
        missing: HashSet<String>,
        exists_calls: Cell<usize>,
    }

    impl FakeFs {
        fn missing(path: &str) -> Self {
            let mut fs = Self::default();
            fs.missing.insert(path.to_owned());
            fs
        }
    }

    impl FileSystem for FakeFs {
        fn exists(&self, path: &str) -> bool {
            self.exists_calls.set(self.exists_calls.get() + 1);
            !self.missing.contains(path)
        }

        fn read(&self, _path: &str) -> std::io::Result<Vec<u8>> {
            Ok(Vec::new())
        }
    }

    struct FakeSoundFactory {
        next_id: u32,
        calls: Rc<Cell<usize>>,
        fail: bool,
    }

    impl ResourceFactory<Sound> for FakeSoundFactory {
        fn create(&mut self, path: &str) -> Result<Sound, ContentError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(ContentError::load("sound", path, anyhow::anyhow!("decoder failed")));
            }
            self.next_id += 1;
            let format = SoundFormat::from_extension(&path[path.len() - 4..]).unwrap_or(SoundFormat::Ogg);
            Ok(Sound::new(self.next_id, path, format))
        }
    }

    struct FakeTextureFactory {
        next_id: u32,
        pooled: HashSet<String>,
    }

    impl ResourceFactory<Texture> for FakeTextureFactory {
        fn create(&mut self, path: &str) -> Result<Texture, ContentError> {
            self.next_id += 1;
            let texture = Texture::new(self.next_id, "tex", path, 8, 8);
            Ok(if self.pooled.contains(path) { texture.pooled() } else { texture })
        }
    }

    struct SoundHarness {
        cache: SoundCache,
        fs: Rc<FakeFs>,
        calls: Rc<Cell<usize>>,
        disposed: Rc<RefCell<Vec<u32>>>,
        shutdown: Reactable<ShutDownData>,
        _dispose_sub: Subscription<DisposeSoundData>,
    }

    fn sound_harness_with(fs: FakeFs, fail: bool) -> SoundHarness {
        init_logging(LoggingConfig::for_tests());
        let fs = Rc::new(fs);
        let calls = Rc::new(Cell::new(0));
        let dispose = Reactable::<DisposeSoundData>::new();
        let shutdown = Reactable::<ShutDownData>::new();

        let disposed = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&disposed);
        let dispose_sub = dispose.subscribe(Reactor::new(move |d: &DisposeSoundData| {
            sink.borrow_mut().push(d.sound_id)
        }));

        let factory = FakeSoundFactory { next_id: 0, calls: Rc::clone(&calls), fail };
        let file_system: Rc<dyn FileSystem> = fs.clone();
        let cache = SoundCache::new(Box::new(factory), file_system, dispose, &shutdown);

        SoundHarness { cache, fs, calls, disposed, shutdown, _dispose_sub: dispose_sub }
    }

    fn sound_harness() -> SoundHarness {
        sound_harness_with(FakeFs::default(), false)
    }

    // ── get_item ─────────────────────────────────────────────────────────

    #[test]
    fn caches_sound_under_its_path() {
        let mut h = sound_harness();
        let sound = h.cache.get_item(SOUND_PATH).unwrap();

        assert_eq!(sound.path(), SOUND_PATH);
        assert_eq!(sound.format(), SoundFormat::Ogg);
        assert_eq!(h.cache.total_cached_items(), 1);
        assert_eq!(h.cache.cache_keys(), vec![SOUND_PATH.to_owned()]);
    }

    #[test]
    fn second_request_returns_same_instance_without_factory_or_fs() {
        let mut h = sound_harness();
        let first = h.cache.get_item(SOUND_PATH).unwrap();
        let exists_calls = h.fs.exists_calls.get();

        let second = h.cache.get_item(SOUND_PATH).unwrap();

        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(h.calls.get(), 1);
        assert_eq!(h.fs.exists_calls.get(), exists_calls);
    }

    #[test]
    fn distinct_keys_get_distinct_resources() {
        let mut h = sound_harness();
        let a = h.cache.get_item("sounds/a.ogg").unwrap();
        let b = h.cache.get_item("sounds/b.mp3").unwrap();

        assert!(!Rc::ptr_eq(&a, &b));
        assert_ne!(a.id(), b.id());
        assert_eq!(b.format(), SoundFormat::Mp3);
        assert_eq!(h.cache.total_cached_items(), 2);
    }

    #[test]
    fn empty_path_is_rejected() {
        let mut h = sound_harness();
        let err = h.cache.get_item("").unwrap_err();
        assert!(matches!(err, ContentError::EmptyPath { kind: "sound" }));
        assert_eq!(
            err.to_string(),
            "The string parameter must not be null or empty. (Parameter 'soundFilePath')"
        );
        assert_eq!(h.calls.get(), 0);
    }

    #[test]
    fn unsupported_extension_names_supported_formats() {
        let mut h = sound_harness();
        let err = h.cache.get_item("C:/sounds/test-sound.txt").unwrap_err();

        assert!(matches!(err, ContentError::UnsupportedFileType { .. }));
        assert_eq!(
            err.to_string(),
            "Sound file type '.txt' is not supported.\nSupported file types are '.ogg' and '.mp3'."
        );
        assert_eq!(h.cache.total_cached_items(), 0);
        assert_eq!(h.fs.exists_calls.get(), 0);
    }

    #[test]
    fn extension_check_ignores_case() {
        let mut h = sound_harness();
        assert!(h.cache.get_item("sounds/LOUD.OGG").is_ok());
    }

    #[test]
    fn missing_file_is_not_found() {
        let mut h = sound_harness_with(FakeFs::missing(SOUND_PATH), false);
        let err = h.cache.get_item(SOUND_PATH).unwrap_err();

        assert!(matches!(err, ContentError::FileNotFound { ref path, .. } if path == SOUND_PATH));
        assert_eq!(err.to_string(), "The '.ogg' sound file does not exist.");
        assert_eq!(h.calls.get(), 0);
    }

    #[test]
    fn factory_error_propagates_and_caches_nothing() {
        let mut h = sound_harness_with(FakeFs::default(), true);
        let err = h.cache.get_item(SOUND_PATH).unwrap_err();

        assert!(matches!(err, ContentError::Load { kind: "sound", .. }));
        assert_eq!(h.cache.total_cached_items(), 0);
    }

    // ── unload ───────────────────────────────────────────────────────────

    #[test]
    fn unload_removes_then_notifies_once() {
        let mut h = sound_harness();
        let id = h.cache.get_item(SOUND_PATH).unwrap().id();

        h.cache.unload(SOUND_PATH).unwrap();
        h.cache.unload(SOUND_PATH).unwrap();

        assert_eq!(*h.disposed.borrow(), vec![id]);
        assert_eq!(h.cache.total_cached_items(), 0);
    }

    #[test]
    fn unload_of_absent_key_publishes_nothing() {
        let mut h = sound_harness();
        h.cache.unload("sounds/never-loaded.ogg").unwrap();
        assert!(h.disposed.borrow().is_empty());
    }

    #[test]
    fn entry_is_gone_when_subscribers_hear_about_it() {
        let dispose = Reactable::<DisposeSoundData>::new();
        let shutdown = Reactable::<ShutDownData>::new();
        let fs: Rc<dyn FileSystem> = Rc::new(FakeFs::default());
        let factory = FakeSoundFactory { next_id: 0, calls: Rc::new(Cell::new(0)), fail: false };
        let mut cache = SoundCache::new(Box::new(factory), fs, dispose.clone(), &shutdown);

        let cache_state = Rc::clone(&cache.state);
        let seen_len = Rc::new(Cell::new(usize::MAX));
        let seen = Rc::clone(&seen_len);
        let _sub = dispose.subscribe(Reactor::new(move |_: &DisposeSoundData| {
            seen.set(cache_state.borrow().items.len());
        }));

        cache.get_item(SOUND_PATH).unwrap();
        cache.unload(SOUND_PATH).unwrap();
        assert_eq!(seen_len.get(), 0);
    }

    #[test]
    fn reload_after_unload_creates_fresh_resource() {
        let mut h = sound_harness();
        let first = h.cache.get_item(SOUND_PATH).unwrap();
        h.cache.unload(SOUND_PATH).unwrap();
        let second = h.cache.get_item(SOUND_PATH).unwrap();

        assert!(!Rc::ptr_eq(&first, &second));
        assert_eq!(h.calls.get(), 2);
    }

    // ── shutdown ─────────────────────────────────────────────────────────

    #[test]
    fn shutdown_disposes_each_item_once_across_repeats() {
        let mut h = sound_harness();
        let a = h.cache.get_item("sounds/a.ogg").unwrap().id();
        let b = h.cache.get_item("sounds/b.ogg").unwrap().id();

        h.shutdown.push_notification(&ShutDownData);
        h.shutdown.push_notification(&ShutDownData);

        assert_eq!(*h.disposed.borrow(), vec![a, b]);
        assert_eq!(h.cache.total_cached_items(), 0);
        assert!(h.cache.is_disposed());
    }

    #[test]
    fn requests_after_shutdown_are_rejected() {
        let mut h = sound_harness();
        h.cache.get_item(SOUND_PATH).unwrap();
        h.shutdown.push_notification(&ShutDownData);

        let err = h.cache.get_item(SOUND_PATH).unwrap_err();
        assert!(matches!(err, ContentError::Disposed { kind: "sound" }));
    }

    #[test]
    fn completing_shutdown_releases_subscription() {
        let h = sound_harness();
        assert_eq!(h.shutdown.subscriber_count(), 1);
        assert!(h.cache.state.borrow().shutdown_subscription.is_some());

        h.shutdown.complete();

        assert_eq!(h.shutdown.subscriber_count(), 0);
        assert!(h.cache.state.borrow().shutdown_subscription.is_none());
    }

    #[test]
    fn shutdown_completed_by_a_dispose_listener_still_releases_subscription() {
        let h = sound_harness();
        h.cache.state.borrow_mut().items.insert(
            "sounds/a.ogg".to_owned(),
            Rc::new(Sound::new(1, "sounds/a.ogg", SoundFormat::Ogg)),
        );

        let shutdown = h.shutdown.clone();
        let dispose = h.cache.dispose_reactable.clone();
        let _closer = dispose.subscribe(Reactor::new(move |_: &DisposeSoundData| shutdown.complete()));

        h.shutdown.push_notification(&ShutDownData);

        assert!(h.shutdown.is_completed());
        assert_eq!(*h.disposed.borrow(), vec![1]);
        assert!(h.cache.state.borrow().shutdown_subscription.is_none());
    }

    #[test]
    fn dropping_cache_unsubscribes_from_shutdown() {
        let h = sound_harness();
        let shutdown = h.shutdown.clone();
        drop(h);
        assert_eq!(shutdown.subscriber_count(), 0);
    }

    #[test]
    fn cache_built_after_completed_shutdown_holds_no_subscription() {
        let shutdown = Reactable::<ShutDownData>::new();
        shutdown.complete();

        let fs: Rc<dyn FileSystem> = Rc::new(FakeFs::default());
        let factory = FakeSoundFactory { next_id: 0, calls: Rc::new(Cell::new(0)), fail: false };
        let cache = SoundCache::new(Box::new(factory), fs, Reactable::new(), &shutdown);

        assert!(cache.state.borrow().shutdown_subscription.is_none());
        assert!(!cache.is_disposed());
    }

    // ── pooled textures ──────────────────────────────────────────────────

    fn texture_cache(pooled: &[&str]) -> (TextureCache, Reactable<ShutDownData>, Rc<RefCell<Vec<u32>>>, Subscription<DisposeTextureData>) {
        let dispose = Reactable::<DisposeTextureData>::new();
        let shutdown = Reactable::<ShutDownData>::new();
        let disposed = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&disposed);
        let sub = dispose.subscribe(Reactor::new(move |d: &DisposeTextureData| {
            sink.borrow_mut().push(d.texture_id)
        }));

        let factory = FakeTextureFactory {
            next_id: 0,
            pooled: pooled.iter().map(|p| (*p).to_owned()).collect(),
        };
        let fs: Rc<dyn FileSystem> = Rc::new(FakeFs::default());
        let cache = TextureCache::new(Box::new(factory), fs, dispose, &shutdown);
        (cache, shutdown, disposed, sub)
    }

    #[test]
    fn pooled_texture_unload_is_rejected_and_kept() {
        let (mut cache, _shutdown, disposed, _sub) = texture_cache(&["atlas.png"]);
        cache.get_item("atlas.png").unwrap();

        let err = cache.unload("atlas.png").unwrap_err();

        assert!(matches!(err, ContentError::PooledDisposal { .. }));
        assert!(cache.contains("atlas.png"));
        assert!(disposed.borrow().is_empty());
    }

    #[test]
    fn shutdown_skips_pooled_textures_but_empties_cache() {
        let (mut cache, shutdown, disposed, _sub) = texture_cache(&["atlas.png"]);
        cache.get_item("atlas.png").unwrap();
        let owned = cache.get_item("logo.png").unwrap().id();

        shutdown.push_notification(&ShutDownData);

        assert_eq!(*disposed.borrow(), vec![owned]);
        assert_eq!(cache.total_cached_items(), 0);
    }

    #[test]
    fn texture_cache_rejects_other_formats() {
        let (mut cache, _shutdown, _disposed, _sub) = texture_cache(&[]);
        let err = cache.get_item("images/photo.jpg").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Texture file type '.jpg' is not supported.\nSupported file types are '.png'."
        );
    }

    // ── fonts ────────────────────────────────────────────────────────────

    struct FakeFontFactory {
        next_atlas_id: u32,
    }

    impl ResourceFactory<Font> for FakeFontFactory {
        fn create(&mut self, _path: &str) -> Result<Font, ContentError> {
            self.next_atlas_id += 1;
            Ok(sample_font(self.next_atlas_id))
        }
    }

    #[test]
    fn font_cache_announces_atlas_ids_on_texture_channel() {
        let dispose = Reactable::<DisposeTextureData>::new();
        let shutdown = Reactable::<ShutDownData>::new();
        let disposed = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&disposed);
        let _sub = dispose.subscribe(Reactor::new(move |d: &DisposeTextureData| {
            sink.borrow_mut().push(d.texture_id)
        }));

        let fs: Rc<dyn FileSystem> = Rc::new(FakeFs::default());
        let factory = FakeFontFactory { next_atlas_id: 40 };
        let mut cache = FontCache::new(Box::new(factory), fs, dispose, &shutdown);

        let serif = cache.get_item("fonts/serif.ttf").unwrap();
        let mono = cache.get_item("fonts/mono.ttf").unwrap();
        assert!(serif.atlas().is_pooled());

        cache.unload("fonts/serif.ttf").unwrap();
        assert_eq!(*disposed.borrow(), vec![serif.id()]);

        shutdown.push_notification(&ShutDownData);
        assert_eq!(*disposed.borrow(), vec![41, 42]);
        assert_eq!(mono.id(), 42);
        assert_eq!(cache.total_cached_items(), 0);
    }

    // ── disposer wiring ──────────────────────────────────────────────────

    #[derive(Default)]
    struct ResidentTextures(HashSet<u32>);

    impl TextureStore for ResidentTextures {
        fn remove_texture(&mut self, texture_id: u32) -> bool {
            self.0.remove(&texture_id)
        }
    }

    #[test]
    fn texture_cache_releases_gpu_textures_through_disposer() {
        let dispose = Reactable::<DisposeTextureData>::new();
        let shutdown = Reactable::<ShutDownData>::new();
        let store = Rc::new(RefCell::new(ResidentTextures::default()));
        let disposer = TextureDisposer::new(Rc::clone(&store), &dispose);

        let factory = FakeTextureFactory { next_id: 0, pooled: HashSet::new() };
        let fs: Rc<dyn FileSystem> = Rc::new(FakeFs::default());
        let mut cache = TextureCache::new(Box::new(factory), fs, dispose, &shutdown);

        let logo = cache.get_item("logo.png").unwrap().id();
        let hero = cache.get_item("hero.png").unwrap().id();
        store.borrow_mut().0.extend([logo, hero]);

        cache.unload("logo.png").unwrap();
        assert_eq!(disposer.released(), 1);
        assert!(!store.borrow().0.contains(&logo));

        shutdown.push_notification(&ShutDownData);
        assert_eq!(disposer.released(), 2);
        assert!(store.borrow().0.is_empty());
    }
}
