//! Controllable sources and tokens for exercising operators step by step.

use crate::{Completable, Disposable, DynObserver, Outcome};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A token that counts how many times it was disposed.
#[derive(Debug, Default)]
pub struct CountingToken {
    disposals: AtomicUsize,
}

impl CountingToken {
    pub fn dispose_count(&self) -> usize {
        self.disposals.load(Ordering::SeqCst)
    }
}

impl Disposable for CountingToken {
    fn dispose(&self) {
        self.disposals.fetch_add(1, Ordering::SeqCst);
    }

    fn is_disposed(&self) -> bool {
        self.dispose_count() > 0
    }
}

struct Slot {
    observer: Option<DynObserver>,
    token: Arc<CountingToken>,
}

/// A source that only signals when told to.
///
/// It deliberately ignores its own token, so it can emulate sources that race with
/// cancellation or misbehave by signalling twice.
#[derive(Clone, Default)]
pub struct ManualSource {
    subscriptions: Arc<Mutex<Vec<Slot>>>,
    deferred_subscribe: bool,
}

impl ManualSource {
    /// A source that calls `on_subscribe` synchronously inside `subscribe`.
    pub fn new() -> Self {
        Self::default()
    }

    /// A source that only calls `on_subscribe` through [`ManualSource::signal_subscribe`].
    pub fn deferred() -> Self {
        ManualSource {
            subscriptions: Default::default(),
            deferred_subscribe: true,
        }
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.lock().len()
    }

    pub fn token(&self, index: usize) -> Arc<CountingToken> {
        self.subscriptions.lock()[index].token.clone()
    }

    pub fn signal_subscribe(&self, index: usize) {
        let token = self.token(index);
        self.with_observer(index, |observer| observer.on_subscribe(token));
    }

    pub fn signal(&self, index: usize, outcome: Outcome) {
        self.with_observer(index, |observer| observer.on_outcome(outcome));
    }

    // The observer is taken out of the slot while it runs, so that it can re-enter the source.
    fn with_observer(&self, index: usize, action: impl FnOnce(&mut DynObserver)) {
        let taken = self.subscriptions.lock()[index].observer.take();
        let mut observer = taken.expect("Observer is already running.");
        action(&mut observer);
        self.subscriptions.lock()[index].observer = Some(observer);
    }
}

impl Completable for ManualSource {
    fn subscribe(&self, observer: DynObserver) {
        let token = Arc::new(CountingToken::default());
        let index = {
            let mut subscriptions = self.subscriptions.lock();
            subscriptions.push(Slot {
                observer: Some(observer),
                token,
            });
            subscriptions.len() - 1
        };
        if !self.deferred_subscribe {
            self.signal_subscribe(index);
        }
    }
}
