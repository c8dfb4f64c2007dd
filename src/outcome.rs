use crate::Failure;
use cancel_this::Cancelled;
use std::fmt::{Display, Formatter};

/// The terminal signal of a completable: it either completed or failed.
///
/// An observer receives at most one [`Outcome`] per subscription.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The computation finished successfully.
    Completed,
    /// The computation failed with the given reason.
    Failed(Failure),
}

impl Outcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }

    /// The failure reason, if this is [`Outcome::Failed`].
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Outcome::Completed => None,
            Outcome::Failed(failure) => Some(failure),
        }
    }

    /// Convert to a plain `Result`, which is usually easier to consume with `?`.
    pub fn into_result(self) -> Result<(), Failure> {
        match self {
            Outcome::Completed => Ok(()),
            Outcome::Failed(failure) => Err(failure),
        }
    }
}

impl<E: Into<Failure>> From<Result<(), E>> for Outcome {
    fn from(value: Result<(), E>) -> Self {
        match value {
            Ok(()) => Outcome::Completed,
            Err(e) => Outcome::Failed(e.into()),
        }
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Completed => write!(f, "Completed"),
            Outcome::Failed(failure) => write!(f, "Failed: {}", failure),
        }
    }
}

/// The reason an [`Outcome`] is not (yet) available.
///
/// The outcome is unavailable either because the completable has not signalled yet, or because
/// the subscription was disposed ([`Cancelled`]) and therefore never will.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Incomplete {
    /// The completable is still running.
    Pending,
    /// The subscription was disposed before an outcome arrived.
    Cancelled(Cancelled),
}

impl From<Cancelled> for Incomplete {
    fn from(value: Cancelled) -> Self {
        Incomplete::Cancelled(value)
    }
}

impl Display for Incomplete {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Incomplete::Pending => write!(f, "Outcome pending"),
            Incomplete::Cancelled(c) => write!(f, "{}", c),
        }
    }
}

impl std::error::Error for Incomplete {}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::Outcome;
    use crate::Failure;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    // A failure is stored by its message; the concrete error type is not preserved.
    #[derive(Serialize, Deserialize)]
    enum OutcomeRepr {
        Completed,
        Failed(String),
    }

    impl Serialize for Outcome {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let repr = match self {
                Outcome::Completed => OutcomeRepr::Completed,
                Outcome::Failed(failure) => OutcomeRepr::Failed(failure.to_string()),
            };
            repr.serialize(serializer)
        }
    }

    impl<'de> Deserialize<'de> for Outcome {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            Ok(match OutcomeRepr::deserialize(deserializer)? {
                OutcomeRepr::Completed => Outcome::Completed,
                OutcomeRepr::Failed(message) => Outcome::Failed(Failure::msg(message)),
            })
        }
    }
}
