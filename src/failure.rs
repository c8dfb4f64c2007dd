use std::any::Any;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;
use thiserror::Error;

/// The reason a completable failed.
///
/// A [`Failure`] is a cheaply clonable, type-erased error. The same failure value can be
/// handed to the error mapper, recorded inside a [`CompositeFailure`] and forwarded downstream
/// without copying the underlying error.
#[derive(Clone)]
pub struct Failure(Arc<dyn Error + Send + Sync + 'static>);

impl Failure {
    /// Wrap an arbitrary error.
    pub fn new<E: Error + Send + Sync + 'static>(error: E) -> Self {
        Failure(Arc::new(error))
    }

    /// Create a failure from a plain message.
    pub fn msg<M: Into<String>>(message: M) -> Self {
        Failure::new(Message(message.into()))
    }

    /// Wrap an error and mark it as unrecoverable (see [`FatalError`]).
    pub fn fatal<E: Error + Send + Sync + 'static>(error: E) -> Self {
        Failure::new(FatalError(Failure::new(error)))
    }

    /// Create a failure from the payload of a caught panic.
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        Failure::new(MapperPanic {
            message: panic_message(payload),
        })
    }

    /// Access the wrapped error as a concrete type, if it has that type.
    pub fn downcast_ref<E: Error + 'static>(&self) -> Option<&E> {
        self.0.downcast_ref::<E>()
    }

    /// True if the wrapped error has type `E`.
    pub fn is<E: Error + 'static>(&self) -> bool {
        self.0.is::<E>()
    }

    /// True if both failures share the same underlying error allocation.
    pub fn ptr_eq(&self, other: &Failure) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// True if this failure was marked as unrecoverable with [`Failure::fatal`].
    pub fn is_fatal(&self) -> bool {
        self.is::<FatalError>()
    }
}

impl Debug for Failure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for Failure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl Error for Failure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.0.source()
    }
}

impl From<String> for Failure {
    fn from(value: String) -> Self {
        Failure::msg(value)
    }
}

impl From<&str> for Failure {
    fn from(value: &str) -> Self {
        Failure::msg(value)
    }
}

#[derive(Debug, Error)]
#[error("{0}")]
struct Message(String);

/// A failure that records several underlying causes, in order.
///
/// Produced when the error mapper itself fails: the first cause is the mapper's error,
/// the second is the failure the mapper was trying to recover from.
#[derive(Debug, Clone, Error)]
#[error("{} failures occurred: {}", .causes.len(), DisplayCauses(.causes))]
pub struct CompositeFailure {
    #[source]
    first: Failure,
    causes: Vec<Failure>,
}

impl CompositeFailure {
    /// Create a composite from the given causes.
    ///
    /// # Panics
    ///
    /// Panics if `causes` is empty.
    pub fn new(causes: Vec<Failure>) -> Self {
        assert!(!causes.is_empty(), "A composite failure needs at least one cause.");
        CompositeFailure {
            first: causes[0].clone(),
            causes,
        }
    }

    /// All recorded causes, in order.
    pub fn causes(&self) -> &[Failure] {
        &self.causes
    }
}

struct DisplayCauses<'a>(&'a [Failure]);

impl Display for DisplayCauses<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (i, cause) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", cause)?;
        }
        Ok(())
    }
}

/// The error mapper returned no fallback completable.
#[derive(Debug, Clone, Error)]
#[error("the fallback completable returned by the error mapper is absent")]
pub struct AbsentFallback {
    /// The failure the mapper was asked to recover from.
    #[source]
    pub cause: Failure,
}

/// The error mapper panicked while computing a fallback.
#[derive(Debug, Clone, Error)]
#[error("error mapper panicked: {message}")]
pub struct MapperPanic {
    /// The panic message, if the payload was a string.
    pub message: String,
}

/// Marker for failures that must never be recovered from.
///
/// The [`crate::DefaultFatalClassifier`] treats exactly these failures as fatal.
#[derive(Debug, Clone, Error)]
#[error("fatal: {0}")]
pub struct FatalError(#[source] pub Failure);

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(failure) = payload.downcast_ref::<Failure>() {
        failure.to_string()
    } else {
        "unknown panic payload".to_string()
    }
}
