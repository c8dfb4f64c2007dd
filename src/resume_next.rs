use crate::{
    AbsentFallback, Completable, CompletableObserver, CompositeFailure, DefaultFatalClassifier,
    Disposable, DynCompletable, DynDisposable, DynObserver, Failure, FatalClassifier, Outcome,
    SequentialDisposable,
};
use std::any::Any;
use std::fmt::{Debug, Formatter};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, trace, warn};

/// The result of an error mapper: a fallback completable, no fallback (`None`),
/// or a failure of the mapper itself.
pub type MapperResult = Result<Option<DynCompletable>, Failure>;

type ErrorMapper = dyn Fn(&Failure) -> MapperResult + Send + Sync;

/// Recovers from a failure of the `source` completable by subscribing to a fallback
/// completable chosen by an error mapper.
///
/// The downstream observer receives a single [`SequentialDisposable`] for the whole
/// subscription; disposing it cancels whichever of the two completables is running at the time.
/// Recovery is one level deep: a failure of the fallback is forwarded as is.
///
/// When the mapper fails (returns `Err` or panics), downstream receives a [`CompositeFailure`]
/// holding the mapper's failure followed by the original one. When the mapper returns `None`,
/// downstream receives an [`AbsentFallback`] caused by the original failure. A failure of the
/// mapper that the [`FatalClassifier`] considers fatal is not recovered; it is re-raised as a
/// panic on the thread that delivered the original failure.
///
/// A [`ResumeNext`] holds no per-subscription state and can be subscribed to repeatedly.
pub struct ResumeNext {
    source: DynCompletable,
    mapper: Arc<ErrorMapper>,
    classifier: Arc<dyn FatalClassifier>,
}

impl ResumeNext {
    pub fn new<S, F>(source: S, mapper: F) -> Self
    where
        S: Completable + 'static,
        F: Fn(&Failure) -> MapperResult + Send + Sync + 'static,
    {
        ResumeNext {
            source: source.dyn_completable(),
            mapper: Arc::new(mapper),
            classifier: Arc::new(DefaultFatalClassifier),
        }
    }

    /// Replace the [`DefaultFatalClassifier`].
    pub fn with_fatal_classifier<C: FatalClassifier + 'static>(mut self, classifier: C) -> Self {
        self.classifier = Arc::new(classifier);
        self
    }
}

impl Debug for ResumeNext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResumeNext").finish_non_exhaustive()
    }
}

impl Completable for ResumeNext {
    fn subscribe(&self, mut observer: DynObserver) {
        let handle = Arc::new(SequentialDisposable::new());
        // Downstream must be able to cancel before the source gets a chance to signal.
        observer.on_subscribe(handle.clone());
        trace!(message = "resume_next.subscribe", phase = ?Phase::Primary);
        self.source.subscribe(Box::new(PhaseObserver {
            phase: Phase::Primary,
            downstream: Some(observer),
            handle,
            mapper: self.mapper.clone(),
            classifier: self.classifier.clone(),
        }));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Observing the original source; a failure triggers recovery.
    Primary,
    /// Observing the fallback; every outcome is final.
    Fallback,
}

/// Observes one of the two completables on behalf of the downstream observer.
///
/// The downstream observer is owned by exactly one phase observer at a time. It moves into the
/// fallback observer on recovery, and is consumed when the outcome is delivered. A phase
/// observer without `downstream` is therefore terminated.
struct PhaseObserver {
    phase: Phase,
    downstream: Option<DynObserver>,
    handle: Arc<SequentialDisposable>,
    mapper: Arc<ErrorMapper>,
    classifier: Arc<dyn FatalClassifier>,
}

impl CompletableObserver for PhaseObserver {
    fn on_subscribe(&mut self, disposable: DynDisposable) {
        if self.downstream.is_none() {
            // The phase is over, its token must not replace the one of the next phase.
            debug!(message = "resume_next.late_subscribe", phase = ?self.phase);
            disposable.dispose();
        } else {
            self.handle.update(disposable);
        }
    }

    fn on_outcome(&mut self, outcome: Outcome) {
        let Some(downstream) = self.downstream.take() else {
            debug!(message = "resume_next.duplicate_outcome", phase = ?self.phase);
            return;
        };
        if self.handle.is_disposed() {
            trace!(message = "resume_next.suppressed", phase = ?self.phase);
            return;
        }
        match (self.phase, outcome) {
            (Phase::Primary, Outcome::Failed(reason)) => self.resume(downstream, reason),
            (_, outcome) => deliver(downstream, outcome),
        }
    }
}

impl PhaseObserver {
    /// Compute the fallback for `reason` and continue with it.
    fn resume(&self, downstream: DynObserver, reason: Failure) {
        trace!(message = "resume_next.map_error", %reason);
        let mapped = panic::catch_unwind(AssertUnwindSafe(|| (self.mapper)(&reason)));
        let fallback = match mapped {
            Ok(Ok(fallback)) => fallback,
            Ok(Err(error)) => return self.mapper_failed(downstream, reason, error, None),
            Err(payload) => {
                let error = Failure::from_panic(payload.as_ref());
                return self.mapper_failed(downstream, reason, error, Some(payload));
            }
        };

        if self.handle.is_disposed() {
            trace!(message = "resume_next.suppressed", phase = ?Phase::Fallback);
            return;
        }

        let Some(fallback) = fallback else {
            warn!(message = "resume_next.absent_fallback", %reason);
            let absent = AbsentFallback { cause: reason };
            return deliver(downstream, Outcome::Failed(Failure::new(absent)));
        };

        trace!(message = "resume_next.subscribe", phase = ?Phase::Fallback);
        fallback.subscribe(Box::new(PhaseObserver {
            phase: Phase::Fallback,
            downstream: Some(downstream),
            handle: self.handle.clone(),
            mapper: self.mapper.clone(),
            classifier: self.classifier.clone(),
        }));
    }

    fn mapper_failed(
        &self,
        downstream: DynObserver,
        reason: Failure,
        error: Failure,
        payload: Option<Box<dyn Any + Send>>,
    ) {
        if self.classifier.is_fatal(&error) {
            error!(message = "resume_next.fatal", %error, %reason);
            match payload {
                Some(payload) => panic::resume_unwind(payload),
                None => panic::panic_any(error),
            }
        }

        if self.handle.is_disposed() {
            trace!(message = "resume_next.suppressed", phase = ?self.phase);
            return;
        }

        debug!(message = "resume_next.mapper_failed", %error, %reason);
        let composite = CompositeFailure::new(vec![error, reason]);
        deliver(downstream, Outcome::Failed(Failure::new(composite)));
    }
}

/// Hand the final outcome to downstream, consuming it.
fn deliver(mut downstream: DynObserver, outcome: Outcome) {
    downstream.on_outcome(outcome);
}
