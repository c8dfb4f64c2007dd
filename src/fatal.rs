use crate::Failure;

/// Decides which failures are unrecoverable.
///
/// [`crate::ResumeNext`] never tries to recover from a fatal failure raised by its error
/// mapper. Instead, the failure is re-raised as a panic on the thread that delivered the
/// original failure.
pub trait FatalClassifier: Send + Sync {
    fn is_fatal(&self, failure: &Failure) -> bool;
}

impl<F: Fn(&Failure) -> bool + Send + Sync> FatalClassifier for F {
    fn is_fatal(&self, failure: &Failure) -> bool {
        self(failure)
    }
}

/// Treats exactly the failures created with [`Failure::fatal`] as fatal.
///
/// In particular, a panic inside the error mapper is not fatal by default: it is recovered
/// as a [`crate::MapperPanic`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultFatalClassifier;

impl FatalClassifier for DefaultFatalClassifier {
    fn is_fatal(&self, failure: &Failure) -> bool {
        failure.is_fatal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MapperPanic;

    #[test]
    fn test_default_classifier() {
        let classifier = DefaultFatalClassifier;
        assert!(!classifier.is_fatal(&Failure::msg("disk error")));
        assert!(classifier.is_fatal(&Failure::fatal(std::fmt::Error)));
    }

    #[test]
    fn test_default_classifier_recovers_panics() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        let failure = Failure::from_panic(payload.as_ref());
        assert!(failure.is::<MapperPanic>());
        assert!(!DefaultFatalClassifier.is_fatal(&failure));
    }

    #[test]
    fn test_closure_classifier() {
        let classifier = |failure: &Failure| failure.is::<MapperPanic>();
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert!(classifier.is_fatal(&Failure::from_panic(payload.as_ref())));
        assert!(!classifier.is_fatal(&Failure::msg("fine")));
    }
}
