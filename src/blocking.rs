use crate::{CompletableObserver, Disposable, DynDisposable, DynObserver, Incomplete, Outcome};
use cancel_this::{Cancellable, Cancelled};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// An observer that records what it receives and lets other threads wait for the outcome.
///
/// Cloning a [`BlockingObserver`] produces another handle to the same recording. Use
/// [`BlockingObserver::observer`] to obtain the actual [`CompletableObserver`] that is
/// passed to [`crate::Completable::subscribe`].
///
/// Every outcome is recorded, even if it violates the "at most one outcome" contract, so
/// the observer can also be used to check that a completable behaves.
#[derive(Clone, Default)]
pub struct BlockingObserver {
    inner: Arc<Shared>,
}

#[derive(Default)]
struct Shared {
    state: Mutex<State>,
    signal: Condvar,
}

#[derive(Default)]
struct State {
    disposable: Option<DynDisposable>,
    subscriptions: usize,
    cancelled: bool,
    outcomes: Vec<Outcome>,
}

impl State {
    fn poll(&self) -> Result<Outcome, Incomplete> {
        if let Some(outcome) = self.outcomes.first() {
            Ok(outcome.clone())
        } else if self.cancelled {
            Err(Incomplete::Cancelled(Cancelled::default()))
        } else {
            Err(Incomplete::Pending)
        }
    }
}

struct Feed {
    inner: Arc<Shared>,
}

impl CompletableObserver for Feed {
    fn on_subscribe(&mut self, disposable: DynDisposable) {
        let mut state = self.inner.state.lock();
        state.subscriptions += 1;
        if state.cancelled {
            drop(state);
            disposable.dispose();
        } else {
            state.disposable = Some(disposable);
        }
    }

    fn on_outcome(&mut self, outcome: Outcome) {
        let mut state = self.inner.state.lock();
        state.outcomes.push(outcome);
        self.inner.signal.notify_all();
    }
}

impl BlockingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new observer feeding into this recording.
    pub fn observer(&self) -> DynObserver {
        Box::new(Feed {
            inner: self.inner.clone(),
        })
    }

    /// The disposable received through `on_subscribe`, if any.
    pub fn disposable(&self) -> Option<DynDisposable> {
        self.inner.state.lock().disposable.clone()
    }

    /// Cancel the subscription and wake up all waiting threads.
    ///
    /// If no disposable was received yet, the disposable is cancelled as soon as it arrives.
    pub fn dispose(&self) {
        let disposable = {
            let mut state = self.inner.state.lock();
            state.cancelled = true;
            self.inner.signal.notify_all();
            state.disposable.clone()
        };
        if let Some(disposable) = disposable {
            disposable.dispose();
        }
    }

    /// The number of `on_subscribe` calls received so far.
    pub fn subscribe_count(&self) -> usize {
        self.inner.state.lock().subscriptions
    }

    /// All outcomes received so far, in order.
    pub fn outcomes(&self) -> Vec<Outcome> {
        self.inner.state.lock().outcomes.clone()
    }

    /// The number of outcomes received so far (a well-behaved completable sends at most one).
    pub fn outcome_count(&self) -> usize {
        self.inner.state.lock().outcomes.len()
    }

    /// The first received outcome, or the reason why it is not available.
    pub fn try_outcome(&self) -> Result<Outcome, Incomplete> {
        self.inner.state.lock().poll()
    }

    /// Block until the first outcome arrives, or until [`BlockingObserver::dispose`] is called.
    pub fn wait(&self) -> Cancellable<Outcome> {
        let mut state = self.inner.state.lock();
        loop {
            match state.poll() {
                Ok(outcome) => return Ok(outcome),
                Err(Incomplete::Cancelled(c)) => return Err(c),
                Err(Incomplete::Pending) => self.inner.signal.wait(&mut state),
            }
        }
    }

    /// Like [`BlockingObserver::wait`], but gives up after `timeout`, returning
    /// [`Incomplete::Pending`].
    pub fn wait_timeout(&self, timeout: Duration) -> Result<Outcome, Incomplete> {
        let deadline = Instant::now() + timeout;
        let mut state = self.inner.state.lock();
        loop {
            match state.poll() {
                Err(Incomplete::Pending) => {
                    if self.inner.signal.wait_until(&mut state, deadline).timed_out() {
                        return state.poll();
                    }
                }
                result => return result,
            }
        }
    }
}
