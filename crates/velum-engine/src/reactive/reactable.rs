use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

type OnNext<T> = Box<dyn FnMut(&T)>;
type OnCompleted = Box<dyn FnOnce()>;

/// Observer attached to a [`Reactable`].
///
/// `on_next` runs once per pushed notification. `on_completed` runs at most
/// once, when the reactable completes.
pub struct Reactor<T> {
    on_next: OnNext<T>,
    on_completed: Option<OnCompleted>,
}

impl<T> Reactor<T> {
    pub fn new(on_next: impl FnMut(&T) + 'static) -> Self {
        Self {
            on_next: Box::new(on_next),
            on_completed: None,
        }
    }

    pub fn with_completed(
        on_next: impl FnMut(&T) + 'static,
        on_completed: impl FnOnce() + 'static,
    ) -> Self {
        Self {
            on_next: Box::new(on_next),
            on_completed: Some(Box::new(on_completed)),
        }
    }

    #[inline]
    fn next(&mut self, data: &T) {
        (self.on_next)(data);
    }

    #[inline]
    fn complete(&mut self) {
        if let Some(done) = self.on_completed.take() {
            done();
        }
    }
}

impl<T> fmt::Debug for Reactor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reactor")
            .field("has_on_completed", &self.on_completed.is_some())
            .finish_non_exhaustive()
    }
}

/// One subscriber slot.
///
/// `pending` holds notifications pushed while the reactor was running. They
/// are delivered, in order, once its current call returns.
struct Entry<T> {
    id: u64,
    reactor: RefCell<Reactor<T>>,
    pending: RefCell<VecDeque<T>>,
    completion_pending: Cell<bool>,
    detached: Cell<bool>,
}

impl<T> Entry<T> {
    fn new(id: u64, reactor: Reactor<T>) -> Self {
        Self {
            id,
            reactor: RefCell::new(reactor),
            pending: RefCell::new(VecDeque::new()),
            completion_pending: Cell::new(false),
            detached: Cell::new(false),
        }
    }

    /// Runs `on_completed` now, or after the running call when busy.
    fn complete(&self) {
        match self.reactor.try_borrow_mut() {
            Ok(mut reactor) => reactor.complete(),
            Err(_) => {
                log::trace!("reactor {} is busy; deferring completion", self.id);
                self.completion_pending.set(true);
            }
        }
    }
}

impl<T: Clone> Entry<T> {
    fn deliver(&self, data: &T) {
        let Ok(mut reactor) = self.reactor.try_borrow_mut() else {
            log::trace!("reactor {} is busy; queueing nested notification", self.id);
            self.pending.borrow_mut().push_back(data.clone());
            return;
        };

        reactor.next(data);
        loop {
            if self.detached.get() {
                self.pending.borrow_mut().clear();
                break;
            }
            let next = self.pending.borrow_mut().pop_front();
            match next {
                Some(queued) => reactor.next(&queued),
                None => break,
            }
        }

        if self.completion_pending.take() {
            reactor.complete();
        }
    }
}

struct Shared<T> {
    subscribers: Vec<Rc<Entry<T>>>,
    next_id: u64,
    completed: bool,
}

/// Typed single-threaded notification channel.
///
/// Invariants:
/// - Delivery is synchronous and follows subscription order.
/// - Each push visits a snapshot of the subscribers taken when the push
///   starts. Reactors added during delivery first see the next push.
/// - A reactor is never re-entered. A nested push reaches idle reactors at
///   once and is queued for a running one, which receives it as soon as its
///   current call returns. Nothing pushed before completion is lost.
/// - After [`Reactable::complete`] the channel is inert: pushes are dropped,
///   new subscribers are completed immediately.
///
/// Clones share the same subscriber list.
pub struct Reactable<T> {
    shared: Rc<RefCell<Shared<T>>>,
}

impl<T> Clone for Reactable<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<T> Default for Reactable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Reactable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shared = self.shared.borrow();
        f.debug_struct("Reactable")
            .field("subscribers", &shared.subscribers.len())
            .field("completed", &shared.completed)
            .finish()
    }
}

impl<T> Reactable<T> {
    pub fn new() -> Self {
        Self {
            shared: Rc::new(RefCell::new(Shared {
                subscribers: Vec::new(),
                next_id: 0,
                completed: false,
            })),
        }
    }

    /// Attaches `reactor` and returns the handle that detaches it.
    ///
    /// Subscribing to a completed reactable runs `on_completed` right away and
    /// returns an inert handle.
    pub fn subscribe(&self, reactor: Reactor<T>) -> Subscription<T> {
        let mut shared = self.shared.borrow_mut();

        if shared.completed {
            drop(shared);
            let mut reactor = reactor;
            reactor.complete();
            return Subscription {
                shared: Weak::new(),
                id: None,
            };
        }

        let id = shared.next_id;
        shared.next_id += 1;
        shared.subscribers.push(Rc::new(Entry::new(id, reactor)));

        Subscription {
            shared: Rc::downgrade(&self.shared),
            id: Some(id),
        }
    }

    /// Ends the stream: completes every subscriber, then clears the list.
    ///
    /// Subscribers are still counted while their `on_completed` runs. A
    /// reactor that is running when the stream completes gets `on_completed`
    /// right after its current call. Completing twice is a no-op.
    pub fn complete(&self) {
        let snapshot = {
            let mut shared = self.shared.borrow_mut();
            if shared.completed {
                return;
            }
            shared.completed = true;
            shared.subscribers.clone()
        };

        for entry in &snapshot {
            entry.complete();
        }

        // Drop the entries outside the borrow; reactors may own handles.
        let drained = std::mem::take(&mut self.shared.borrow_mut().subscribers);
        drop(drained);
    }

    pub fn subscriber_count(&self) -> usize {
        self.shared.borrow().subscribers.len()
    }

    pub fn is_completed(&self) -> bool {
        self.shared.borrow().completed
    }

    fn is_subscribed(&self, id: u64) -> bool {
        self.shared
            .borrow()
            .subscribers
            .iter()
            .any(|entry| entry.id == id)
    }
}

impl<T: Clone> Reactable<T> {
    /// Delivers `data` to every current subscriber in subscription order.
    pub fn push_notification(&self, data: &T) {
        let snapshot: Vec<Rc<Entry<T>>> = {
            let shared = self.shared.borrow();
            if shared.completed {
                return;
            }
            shared.subscribers.clone()
        };

        for entry in snapshot {
            // A reactor unsubscribed by an earlier one in this pass is skipped.
            if !self.is_subscribed(entry.id) {
                continue;
            }
            entry.deliver(data);
        }
    }
}

/// Handle returned by [`Reactable::subscribe`].
///
/// Dropping the handle unsubscribes. `unsubscribe` may be called any number of
/// times, including after the reactable has completed or been dropped.
pub struct Subscription<T> {
    shared: Weak<RefCell<Shared<T>>>,
    id: Option<u64>,
}

impl<T> Subscription<T> {
    pub fn unsubscribe(&mut self) {
        let Some(id) = self.id.take() else {
            return;
        };
        let Some(shared) = self.shared.upgrade() else {
            return;
        };

        // Taking the entry out first keeps its drop outside the borrow.
        let removed = match shared.try_borrow_mut() {
            Ok(mut shared) => shared
                .subscribers
                .iter()
                .position(|entry| entry.id == id)
                .map(|ix| shared.subscribers.remove(ix)),
            Err(_) => {
                log::warn!("unsubscribe of reactor {id} raced an active borrow; ignored");
                None
            }
        };
        if let Some(entry) = &removed {
            entry.detached.set(true);
        }
        drop(removed);
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.id.is_some() && self.shared.strong_count() > 0
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
