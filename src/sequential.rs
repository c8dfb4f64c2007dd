use crate::{Disposable, DynDisposable};
use parking_lot::Mutex;
use std::fmt::{Debug, Formatter};

/// A cancellation handle that holds at most one "current" [`Disposable`] and lets the
/// current one be swapped as the underlying activity changes.
///
/// Once the handle itself is disposed, it disposes the current token and every token
/// installed afterward, so no activity can ever be left running behind a disposed handle.
///
/// Tokens are always disposed after the internal lock is released, hence a token whose
/// dispose action touches this handle again does not deadlock.
#[derive(Default)]
pub struct SequentialDisposable {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    disposed: bool,
    current: Option<DynDisposable>,
}

impl SequentialDisposable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `token` as the current disposable, disposing the previous one.
    ///
    /// If this handle is already disposed, `token` is disposed immediately and not stored.
    /// Returns `false` in that case.
    pub fn update(&self, token: DynDisposable) -> bool {
        let installed = {
            let mut state = self.state.lock();
            if state.disposed {
                Err(token)
            } else {
                Ok(state.current.replace(token))
            }
        };
        match installed {
            Ok(previous) => {
                if let Some(previous) = previous {
                    previous.dispose();
                }
                true
            }
            Err(token) => {
                token.dispose();
                false
            }
        }
    }

    /// Install `token` as the current disposable without disposing the previous one.
    ///
    /// If this handle is already disposed, `token` is disposed immediately and not stored.
    /// Returns `false` in that case.
    pub fn replace(&self, token: DynDisposable) -> bool {
        let mut state = self.state.lock();
        if state.disposed {
            drop(state);
            token.dispose();
            false
        } else {
            state.current = Some(token);
            true
        }
    }
}

impl Disposable for SequentialDisposable {
    fn dispose(&self) {
        let current = {
            let mut state = self.state.lock();
            if state.disposed {
                return;
            }
            state.disposed = true;
            state.current.take()
        };
        if let Some(current) = current {
            current.dispose();
        }
    }

    fn is_disposed(&self) -> bool {
        self.state.lock().disposed
    }
}

impl Debug for SequentialDisposable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("SequentialDisposable")
            .field("disposed", &state.disposed)
            .field("occupied", &state.current.is_some())
            .finish()
    }
}
