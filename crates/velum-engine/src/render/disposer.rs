use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::reactive::{DisposeTextureData, Reactable, Reactor, Subscription};

/// Storage that owns GPU textures by id.
pub trait TextureStore {
    /// Releases `texture_id`. Returns false when the id is unknown.
    fn remove_texture(&mut self, texture_id: u32) -> bool;
}

/// Releases textures from a [`TextureStore`] when the texture dispose
/// channel announces them.
///
/// Unsubscribes when dropped or when the channel completes.
pub struct TextureDisposer {
    released: Rc<Cell<usize>>,
    _subscription: Subscription<DisposeTextureData>,
}

impl TextureDisposer {
    pub fn new<S: TextureStore + 'static>(
        store: Rc<RefCell<S>>,
        dispose_reactable: &Reactable<DisposeTextureData>,
    ) -> Self {
        let released = Rc::new(Cell::new(0));
        let counter = Rc::clone(&released);

        let subscription = dispose_reactable.subscribe(Reactor::new(move |data: &DisposeTextureData| {
            if store.borrow_mut().remove_texture(data.texture_id) {
                counter.set(counter.get() + 1);
                log::debug!("released texture {}", data.texture_id);
            } else {
                log::warn!("dispose request for unknown texture {}", data.texture_id);
            }
        }));

        Self {
            released,
            _subscription: subscription,
        }
    }

    /// Textures released so far.
    pub fn released(&self) -> usize {
        self.released.get()
    }
}
