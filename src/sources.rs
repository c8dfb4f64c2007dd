use crate::{AtomicDisposable, Completable, Disposable, DynObserver, Failure, Outcome};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// A completable that completes immediately on subscription.
#[derive(Debug, Clone, Copy, Default)]
pub struct Complete;

/// A completable that fails immediately on subscription, with a fixed reason.
#[derive(Debug, Clone)]
pub struct Fail(pub Failure);

/// A completable that never signals an outcome.
#[derive(Debug, Clone, Copy, Default)]
pub struct Never;

/// A completable that runs a function synchronously on subscription.
///
/// The function receives the subscription token, so it can poll [`Disposable::check`]
/// and stop early. Its result is dropped if the subscription was disposed while it ran.
pub struct FromFn<F: Fn(&AtomicDisposable) -> Result<(), Failure> + Send + Sync> {
    action: F,
}

impl<F: Fn(&AtomicDisposable) -> Result<(), Failure> + Send + Sync> FromFn<F> {
    pub fn new(action: F) -> Self {
        FromFn { action }
    }
}

impl<F: Fn(&AtomicDisposable) -> Result<(), Failure> + Send + Sync> Debug for FromFn<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FromFn").finish_non_exhaustive()
    }
}

/// Send `outcome` to `observer`, unless the token got disposed in the meantime.
fn signal(mut observer: DynObserver, outcome: impl FnOnce(&AtomicDisposable) -> Outcome) {
    let token = Arc::new(AtomicDisposable::new());
    observer.on_subscribe(token.clone());
    if token.is_disposed() {
        return;
    }
    let outcome = outcome(&*token);
    if !token.is_disposed() {
        observer.on_outcome(outcome);
    }
}

impl Completable for Complete {
    fn subscribe(&self, observer: DynObserver) {
        signal(observer, |_| Outcome::Completed);
    }
}

impl Completable for Fail {
    fn subscribe(&self, observer: DynObserver) {
        signal(observer, |_| Outcome::Failed(self.0.clone()));
    }
}

impl Completable for Never {
    fn subscribe(&self, mut observer: DynObserver) {
        observer.on_subscribe(Arc::new(AtomicDisposable::new()));
    }
}

impl<F: Fn(&AtomicDisposable) -> Result<(), Failure> + Send + Sync> Completable for FromFn<F> {
    fn subscribe(&self, observer: DynObserver) {
        signal(observer, |token| (self.action)(token).into());
    }
}
