#![forbid(unsafe_code)]

//! Current-value container with change notification and version tracking.
//!
//! # Design
//!
//! [`Observable<T>`] keeps a value of type `T` in shared, reference-counted
//! storage (`Rc<RefCell<..>>`). Readers take the last value synchronously
//! with [`Observable::get`] / [`Observable::with`]; writers publish with
//! [`Observable::set`] / [`Observable::update`]. A write that leaves the
//! value equal (by `PartialEq`) is dropped, so subscribers only ever see
//! real changes, in registration order.
//!
//! Everything runs on the UI thread; there is no locking.
//!
//! # Failure Modes
//!
//! - **Re-entrant writes**: a subscriber may write to any observable,
//!   including the one that notified it. The borrow is released before
//!   callbacks run, and the nested write notifies synchronously.
//! - **Subscriber leak**: a [`Subscription`] guard that is never dropped keeps
//!   its callback alive. Dead callbacks are pruned lazily on the next
//!   notification.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::trace_span;

type CallbackRc<T> = Rc<dyn Fn(&T)>;
type CallbackWeak<T> = Weak<dyn Fn(&T)>;

struct ObservableInner<T> {
    name: &'static str,
    value: T,
    version: u64,
    subscribers: Vec<CallbackWeak<T>>,
}

/// A shared, version-tracked value with change notification.
///
/// Cloning an `Observable` creates a new handle to the **same** value and
/// subscriber list.
///
/// # Invariants
///
/// 1. `version` increments by exactly 1 on each value-changing write.
/// 2. Writing a value equal to the current one is a no-op.
/// 3. Subscribers are notified in registration order.
pub struct Observable<T> {
    inner: Rc<RefCell<ObservableInner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("name", &inner.name)
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("subscriber_count", &inner.subscribers.len())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    /// Create an anonymous observable.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self::named("observable", value)
    }

    /// Create an observable whose name appears in notification spans.
    #[must_use]
    pub fn named(name: &'static str, value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ObservableInner {
                name,
                value,
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Borrow the current value without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Publish a new value. Returns `true` if it differed from the current
    /// one (and subscribers were notified).
    pub fn set(&self, value: T) -> bool {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return false;
            }
            inner.value = value;
            inner.version += 1;
        }
        self.notify();
        true
    }

    /// Mutate the value in place. Subscribers are notified only if the
    /// result differs from the previous value.
    pub fn update(&self, f: impl FnOnce(&mut T)) -> bool {
        let changed = {
            let mut inner = self.inner.borrow_mut();
            let previous = inner.value.clone();
            f(&mut inner.value);
            if inner.value == previous {
                false
            } else {
                inner.version += 1;
                true
            }
        };
        if changed {
            self.notify();
        }
        changed
    }

    /// Register a callback for future changes. Dropping the returned guard
    /// unsubscribes.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let strong: CallbackRc<T> = Rc::new(callback);
        self.inner.borrow_mut().subscribers.push(Rc::downgrade(&strong));
        Subscription {
            _guard: Box::new(strong),
        }
    }

    /// Number of value-changing writes so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Registered subscribers, including dropped ones not yet pruned.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    fn notify(&self) {
        let (callbacks, name, version): (Vec<CallbackRc<T>>, &'static str, u64) = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.retain(|w| w.strong_count() > 0);
            let live = inner.subscribers.iter().filter_map(Weak::upgrade).collect();
            (live, inner.name, inner.version)
        };
        if callbacks.is_empty() {
            return;
        }

        let value = self.get();
        let _span = trace_span!(
            "panelgrid.notify",
            observable = name,
            version,
            subscribers = callbacks.len() as u64
        )
        .entered();
        for callback in &callbacks {
            callback(&value);
        }
    }
}

/// RAII guard for a subscriber callback.
///
/// Dropping it drops the only strong reference to the callback, so the weak
/// entry in the observable no longer upgrades.
pub struct Subscription {
    _guard: Box<dyn std::any::Any>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
