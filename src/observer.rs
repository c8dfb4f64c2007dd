use crate::{DynDisposable, Outcome};

/// The receiving end of a [`crate::Completable`] subscription.
///
/// A source calls [`CompletableObserver::on_subscribe`] at most once, and then
/// [`CompletableObserver::on_outcome`] at most once. When both happen, `on_subscribe`
/// comes first. Both calls may happen synchronously inside `subscribe`, or later on
/// an arbitrary thread.
pub trait CompletableObserver: Send {
    /// Receive the handle that can cancel the subscription.
    fn on_subscribe(&mut self, disposable: DynDisposable);

    /// Receive the terminal signal of the subscription.
    fn on_outcome(&mut self, outcome: Outcome);
}

impl<O: CompletableObserver + ?Sized> CompletableObserver for Box<O> {
    fn on_subscribe(&mut self, disposable: DynDisposable) {
        (**self).on_subscribe(disposable)
    }

    fn on_outcome(&mut self, outcome: Outcome) {
        (**self).on_outcome(outcome)
    }
}
