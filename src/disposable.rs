use cancel_this::{Cancellable, Cancelled};
use parking_lot::Mutex;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A handle to an in-flight asynchronous activity that can be cancelled.
///
/// Disposing is idempotent: only the first call to [`Disposable::dispose`] has an effect.
pub trait Disposable: Send + Sync {
    /// Cancel the underlying activity.
    fn dispose(&self);

    /// True once [`Disposable::dispose`] was called.
    fn is_disposed(&self) -> bool;

    /// A cooperative cancellation check.
    ///
    /// Returns [`Cancelled`] once this handle is disposed, so that long-running work
    /// can bail out using `?`.
    fn check(&self) -> Cancellable<()> {
        if self.is_disposed() {
            Err(Cancelled::default())
        } else {
            Ok(())
        }
    }
}

impl<D: Disposable + ?Sized> Disposable for Arc<D> {
    fn dispose(&self) {
        (**self).dispose()
    }

    fn is_disposed(&self) -> bool {
        (**self).is_disposed()
    }
}

type DisposeAction = Box<dyn FnOnce() + Send>;

/// A [`Disposable`] backed by an atomic flag, with an optional action that runs
/// on the first dispose.
#[derive(Default)]
pub struct AtomicDisposable {
    disposed: AtomicBool,
    action: Mutex<Option<DisposeAction>>,
}

impl AtomicDisposable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a disposable that runs `action` exactly once, when first disposed.
    pub fn with_action<F: FnOnce() + Send + 'static>(action: F) -> Self {
        AtomicDisposable {
            disposed: AtomicBool::new(false),
            action: Mutex::new(Some(Box::new(action))),
        }
    }

    /// Create a disposable that is already disposed.
    pub fn disposed() -> Self {
        AtomicDisposable {
            disposed: AtomicBool::new(true),
            action: Mutex::new(None),
        }
    }
}

impl Disposable for AtomicDisposable {
    fn dispose(&self) {
        if !self.disposed.swap(true, Ordering::AcqRel) {
            // Take the action out first so it does not run under the lock.
            let action = self.action.lock().take();
            if let Some(action) = action {
                action();
            }
        }
    }

    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }
}

impl Debug for AtomicDisposable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AtomicDisposable")
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
