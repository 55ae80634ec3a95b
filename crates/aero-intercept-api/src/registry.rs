//! Observer registry ("event bus").
//!
//! The registry is populated while the interception layer is being set up and is effectively
//! read-only afterwards. Intercepted calls only pay for a single relaxed atomic load when nobody
//! listens for their event kind.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::event::{Event, EventKind, EventSource, Verdict};

/// A consumer of normalized events.
///
/// Observers run synchronously on the thread that issued the intercepted call. They may call
/// back into the registry, including registering further observers; those only see later events.
pub trait Observer: Send + Sync {
    fn on_event(&self, source: EventSource, event: &Event<'_>) -> Verdict;
}

impl<F> Observer for F
where
    F: Fn(EventSource, &Event<'_>) -> Verdict + Send + Sync,
{
    fn on_event(&self, source: EventSource, event: &Event<'_>) -> Verdict {
        self(source, event)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObserverId {
    kind: EventKind,
    serial: u64,
}

impl ObserverId {
    pub fn kind(&self) -> EventKind {
        self.kind
    }
}

struct Entry {
    serial: u64,
    observer: Arc<dyn Observer>,
}

pub struct EventRegistry {
    /// Bit `kind.index()` is set while at least one observer is registered for `kind`.
    registered: AtomicU64,
    next_serial: AtomicU64,
    observers: RwLock<Vec<Vec<Entry>>>,
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRegistry")
            .field("registered", &format_args!("{:#x}", self.registered.load(Ordering::Relaxed)))
            .finish_non_exhaustive()
    }
}

impl EventRegistry {
    pub fn new() -> Self {
        Self {
            registered: AtomicU64::new(0),
            next_serial: AtomicU64::new(1),
            observers: RwLock::new((0..EventKind::COUNT).map(|_| Vec::new()).collect()),
        }
    }

    pub fn register(&self, kind: EventKind, observer: impl Observer + 'static) -> ObserverId {
        self.register_arc(kind, Arc::new(observer))
    }

    /// Registers a shared observer. The same observer may be registered for several kinds.
    pub fn register_arc(&self, kind: EventKind, observer: Arc<dyn Observer>) -> ObserverId {
        let serial = self.next_serial.fetch_add(1, Ordering::Relaxed);
        let mut observers = self.observers.write().unwrap();
        observers[kind.index()].push(Entry { serial, observer });
        self.registered.fetch_or(kind.mask_bit(), Ordering::Release);
        ObserverId { kind, serial }
    }

    /// Removes a previously registered observer. Returns `false` if `id` was already removed.
    pub fn unregister(&self, id: ObserverId) -> bool {
        let mut observers = self.observers.write().unwrap();
        let list = &mut observers[id.kind.index()];
        let Some(pos) = list.iter().position(|e| e.serial == id.serial) else {
            return false;
        };
        list.remove(pos);
        if list.is_empty() {
            self.registered.fetch_and(!id.kind.mask_bit(), Ordering::Release);
        }
        true
    }

    #[inline]
    pub fn is_registered(&self, kind: EventKind) -> bool {
        self.registered.load(Ordering::Relaxed) & kind.mask_bit() != 0
    }

    pub fn observer_count(&self, kind: EventKind) -> usize {
        self.observers.read().unwrap()[kind.index()].len()
    }

    /// Delivers `event` to every observer of its kind, in registration order.
    ///
    /// Returns `true` if the event is suppressible and at least one observer asked to suppress
    /// the native call.
    pub fn publish(&self, source: EventSource, event: &Event<'_>) -> bool {
        let kind = event.kind();
        if !self.is_registered(kind) {
            return false;
        }

        // Observers run without the lock held so they can publish or register themselves.
        let observers: Vec<Arc<dyn Observer>> = self.observers.read().unwrap()[kind.index()]
            .iter()
            .map(|entry| Arc::clone(&entry.observer))
            .collect();
        let mut suppressed = false;
        for observer in &observers {
            if observer.on_event(source, event) == Verdict::Suppress {
                suppressed = true;
            }
        }
        suppressed && kind.is_suppressible()
    }
}
