// All traits/structs have dedicated modules for encapsulation, and we then re-export
// these types here for easier public usage.

mod blocking;
mod completable;
mod disposable;
mod failure;
mod fatal;
mod observer;
mod outcome;
mod resume_next;
mod sequential;
mod sources;

#[cfg(test)]
mod test_utils;

#[cfg(all(test, feature = "serde"))]
mod test_serialization;

pub use blocking::BlockingObserver;
pub use completable::Completable;
pub use disposable::{AtomicDisposable, Disposable};
pub use failure::{AbsentFallback, CompositeFailure, Failure, FatalError, MapperPanic};
pub use fatal::{DefaultFatalClassifier, FatalClassifier};
pub use observer::CompletableObserver;
pub use outcome::{Incomplete, Outcome};
pub use resume_next::{MapperResult, ResumeNext};
pub use sequential::SequentialDisposable;
pub use sources::{Complete, Fail, FromFn, Never};

/// A type alias for `Box<dyn Completable>`.
pub type DynCompletable = Box<dyn Completable>;

/// A type alias for `Box<dyn CompletableObserver>`.
pub type DynObserver = Box<dyn CompletableObserver>;

/// A type alias for `Arc<dyn Disposable>`.
pub type DynDisposable = std::sync::Arc<dyn Disposable>;

#[cfg(test)]
mod integration_tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    /// Completes or fails on a separate thread, honoring cancellation.
    struct Spawned {
        fail_with: Option<&'static str>,
        delay: Duration,
    }

    impl Completable for Spawned {
        fn subscribe(&self, mut observer: DynObserver) {
            let token = Arc::new(AtomicDisposable::new());
            observer.on_subscribe(token.clone());
            let (fail_with, delay) = (self.fail_with, self.delay);
            thread::spawn(move || {
                thread::sleep(delay);
                if token.check().is_ok() {
                    let result = fail_with.map_or(Ok(()), Err);
                    observer.on_outcome(result.into());
                }
            });
        }
    }

    #[test]
    fn test_dyn_completable_integration() {
        let source: DynCompletable = Complete.dyn_completable();
        assert!(source.blocking_await().unwrap().is_completed());
    }

    #[test]
    fn test_shared_operator_integration() {
        let operator: Arc<dyn Completable> =
            Arc::new(Fail(Failure::msg("disk error")).on_error_resume_next(|_| Ok(None)));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let operator = operator.clone();
                thread::spawn(move || operator.blocking_await().unwrap())
            })
            .collect();
        for handle in handles {
            let outcome = handle.join().unwrap();
            assert!(outcome.failure().unwrap().is::<AbsentFallback>());
        }
    }

    #[test]
    fn test_end_to_end_threaded_recovery() {
        let source = Spawned {
            fail_with: Some("disk error"),
            delay: Duration::from_millis(5),
        };
        let operator = source.on_error_resume_next(|reason| {
            assert_eq!(reason.to_string(), "disk error");
            Ok(Some(
                Spawned {
                    fail_with: None,
                    delay: Duration::from_millis(5),
                }
                .dyn_completable(),
            ))
        });
        assert!(operator.blocking_await().unwrap().is_completed());
    }

    #[test]
    fn test_end_to_end_threaded_fallback_failure() {
        let operator = Spawned {
            fail_with: Some("disk error"),
            delay: Duration::ZERO,
        }
        .on_error_resume_next(|_| {
            Ok(Some(
                Spawned {
                    fail_with: Some("network error"),
                    delay: Duration::ZERO,
                }
                .dyn_completable(),
            ))
        });
        let outcome = operator.blocking_await().unwrap();
        assert_eq!(outcome.failure().unwrap().to_string(), "network error");
    }

    #[test]
    fn test_end_to_end_cancel_threaded() {
        let operator = Spawned {
            fail_with: Some("disk error"),
            delay: Duration::from_millis(50),
        }
        .on_error_resume_next(|_| Ok(Some(Complete.dyn_completable())));
        let blocking = BlockingObserver::new();
        operator.subscribe(blocking.observer());

        let waiter = {
            let blocking = blocking.clone();
            thread::spawn(move || blocking.wait())
        };
        blocking.dispose();
        assert!(waiter.join().unwrap().is_err());

        thread::sleep(Duration::from_millis(100));
        assert_eq!(blocking.outcome_count(), 0);
        assert!(blocking.disposable().unwrap().is_disposed());
    }

    #[test]
    fn test_nested_resume_next() {
        // Each operator recovers one level; nesting them gives two levels.
        let attempts = Arc::new(AtomicUsize::new(0));
        let a = attempts.clone();
        let inner = Fail(Failure::msg("disk error")).on_error_resume_next(move |_| {
            a.fetch_add(1, Ordering::SeqCst);
            Ok(Some(Fail(Failure::msg("still broken")).dyn_completable()))
        });
        let b = attempts.clone();
        let outer = inner.on_error_resume_next(move |reason| {
            assert_eq!(reason.to_string(), "still broken");
            b.fetch_add(1, Ordering::SeqCst);
            Ok(Some(Complete.dyn_completable()))
        });
        assert!(outer.blocking_await().unwrap().is_completed());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_outcome_into_result_with_question_mark() {
        fn recover() -> Result<(), Failure> {
            Fail(Failure::msg("disk error"))
                .on_error_resume_next(|_| Ok(Some(Complete.dyn_completable())))
                .blocking_await()
                .map_err(|c| Failure::msg(c.to_string()))?
                .into_result()
        }
        assert!(recover().is_ok());
    }
}
