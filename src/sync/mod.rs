//! Cart change synchronization
//!
//! A page-wide, payload-free "cart changed" signal. Fragments that cannot
//! share a store instance subscribe here and reload the cart from storage
//! when signalled. Signals queue up on [`SyncChannel::notify`] and reach
//! subscribers on the next [`SyncChannel::pump`], never inside the mutating
//! call itself.

use std::{
    collections::VecDeque,
    fmt::{Debug, Display, Formatter, Result as FmtResult},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;
use tracing::trace;

pub mod poller;

pub use poller::{DEFAULT_POLL_INTERVAL, StoragePoller};

/// Name of the cart change signal.
pub const CART_CHANGED_EVENT: &str = "cart-updated";

new_key_type! {
    /// Subscription key
    pub struct SubscriptionKey;
}

/// What raised a change signal. Informational only: handlers reload either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeOrigin {
    /// A store in this page mutated the cart.
    Local,

    /// Another tab wrote the cart key.
    Storage,

    /// The polling backstop saw the stored cart change.
    Poll,
}

impl Display for ChangeOrigin {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let origin = match self {
            Self::Local => "local",
            Self::Storage => "storage",
            Self::Poll => "poll",
        };

        f.write_str(origin)
    }
}

type Handler = Arc<dyn Fn(ChangeOrigin) + Send + Sync>;

#[derive(Default)]
struct Inner {
    subscribers: SlotMap<SubscriptionKey, Handler>,
    pending: VecDeque<ChangeOrigin>,
}

/// Broadcast channel for cart change signals.
///
/// Clones share the same subscribers and queue.
#[derive(Clone, Default)]
pub struct SyncChannel {
    inner: Arc<Mutex<Inner>>,
}

impl SyncChannel {
    /// Creates a channel with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a change signal raised by this page.
    pub fn notify(&self) {
        self.notify_from(ChangeOrigin::Local);
    }

    /// Queues a change signal from the given origin.
    pub fn notify_from(&self, origin: ChangeOrigin) {
        self.lock().pending.push_back(origin);
    }

    /// Registers a handler, called once per delivered signal.
    pub fn subscribe(
        &self,
        handler: impl Fn(ChangeOrigin) + Send + Sync + 'static,
    ) -> SubscriptionKey {
        self.lock().subscribers.insert(Arc::new(handler))
    }

    /// Removes a handler, returning `true` if it was registered.
    pub fn unsubscribe(&self, key: SubscriptionKey) -> bool {
        self.lock().subscribers.remove(key).is_some()
    }

    /// Number of registered handlers.
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    /// Number of signals waiting for the next pump.
    pub fn pending(&self) -> usize {
        self.lock().pending.len()
    }

    /// Delivers every queued signal to the current subscribers.
    ///
    /// Handlers run without the channel locked, so they may subscribe,
    /// unsubscribe or notify; signals they raise wait for the next pump.
    /// Returns the number of signals delivered.
    pub fn pump(&self) -> usize {
        let (signals, handlers) = {
            let mut inner = self.lock();

            let signals: SmallVec<[ChangeOrigin; 4]> = inner.pending.drain(..).collect();
            let handlers: SmallVec<[Handler; 8]> =
                inner.subscribers.values().map(Arc::clone).collect();

            (signals, handlers)
        };

        for origin in &signals {
            trace!(event = CART_CHANGED_EVENT, %origin, subscribers = handlers.len(), "delivering");

            for handler in &handlers {
                handler(*origin);
            }
        }

        signals.len()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Debug for SyncChannel {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let inner = self.lock();

        f.debug_struct("SyncChannel")
            .field("subscribers", &inner.subscribers.len())
            .field("pending", &inner.pending)
            .finish()
    }
}
