use crate::{BlockingObserver, DynCompletable, DynObserver, Failure, MapperResult, Outcome, ResumeNext};
use cancel_this::Cancellable;
use std::sync::Arc;

/// An asynchronous computation that eventually completes or fails, without producing a value.
///
/// Each call to [`Completable::subscribe`] starts an independent run of the computation
/// and reports its progress to the given observer (see [`crate::CompletableObserver`]
/// for the exact calling contract).
pub trait Completable: Send + Sync {
    /// Start the computation, reporting to `observer`.
    fn subscribe(&self, observer: DynObserver);

    /// Recover from a failure of this completable by continuing with a fallback completable
    /// computed from the failure reason.
    ///
    /// See [`ResumeNext`] for the details.
    fn on_error_resume_next<F>(self, mapper: F) -> ResumeNext
    where
        Self: Sized + 'static,
        F: Fn(&Failure) -> MapperResult + Send + Sync + 'static,
    {
        ResumeNext::new(self, mapper)
    }

    /// Subscribe and block the current thread until the outcome is available.
    ///
    /// Note that this method blocks forever if the source never signals an outcome
    /// (e.g. [`crate::Never`]). Use [`BlockingObserver`] directly when the subscription
    /// needs to be cancellable.
    fn blocking_await(&self) -> Cancellable<Outcome> {
        let blocking = BlockingObserver::new();
        self.subscribe(blocking.observer());
        blocking.wait()
    }

    /// Utility method to convert this [`Completable`] to a dynamic type.
    fn dyn_completable(self) -> DynCompletable
    where
        Self: Sized + 'static,
    {
        Box::new(self)
    }
}

impl<C: Completable + ?Sized> Completable for Box<C> {
    fn subscribe(&self, observer: DynObserver) {
        (**self).subscribe(observer)
    }
}

impl<C: Completable + ?Sized> Completable for Arc<C> {
    fn subscribe(&self, observer: DynObserver) {
        (**self).subscribe(observer)
    }
}
