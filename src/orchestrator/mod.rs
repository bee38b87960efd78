//! Generation Orchestrators
//!
//! Each orchestrator drives one request at a time through
//! `Idle -> Loading -> {Result, Error}` and publishes every transition on a
//! `tokio::sync::watch` channel so views can follow along without polling.

pub mod card;
pub mod figure;

use std::sync::Arc;

use tokio::sync::watch;

use crate::error::GenerationError;

pub use card::GenerationOrchestrator;
pub use figure::{FigureOrchestrator, FigureSession};

/// UI-visible state of one orchestrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Result(T),
    Error(GenerationError),
}

impl<T> ViewState<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn result(&self) -> Option<&T> {
        match self {
            Self::Result(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&GenerationError> {
        match self {
            Self::Error(err) => Some(err),
            _ => None,
        }
    }
}

/// Receiver yielding on every state transition
pub type StateWatcher<T> = watch::Receiver<ViewState<T>>;

/// Watch-backed state holder shared by clones of an orchestrator
#[derive(Debug)]
pub(crate) struct StateCell<T> {
    tx: Arc<watch::Sender<ViewState<T>>>,
}

impl<T> Clone for StateCell<T> {
    fn clone(&self) -> Self {
        Self {
            tx: Arc::clone(&self.tx),
        }
    }
}

impl<T: Clone> StateCell<T> {
    pub(crate) fn new() -> Self {
        let (tx, _rx) = watch::channel(ViewState::Idle);
        Self { tx: Arc::new(tx) }
    }

    pub(crate) fn subscribe(&self) -> StateWatcher<T> {
        self.tx.subscribe()
    }

    pub(crate) fn snapshot(&self) -> ViewState<T> {
        self.tx.borrow().clone()
    }

    /// Enter `Loading` unless already there. Returns `None` when busy.
    ///
    /// Starting from `Result` or `Error` discards the previous outcome. The
    /// returned guard puts the state back to `Idle` if it is dropped before
    /// `LoadingGuard::finish`.
    pub(crate) fn begin(&self) -> Option<LoadingGuard<'_, T>> {
        let entered = self.tx.send_if_modified(|state| {
            if state.is_loading() {
                false
            } else {
                *state = ViewState::Loading;
                true
            }
        });
        entered.then(|| LoadingGuard {
            cell: self,
            armed: true,
        })
    }

    /// `Result`/`Error` back to `Idle`; no-op while `Idle` or `Loading`
    pub(crate) fn reset(&self) -> bool {
        self.tx.send_if_modified(|state| match state {
            ViewState::Result(_) | ViewState::Error(_) => {
                *state = ViewState::Idle;
                true
            }
            ViewState::Idle | ViewState::Loading => false,
        })
    }
}

/// Ownership of one `Loading` period
pub(crate) struct LoadingGuard<'a, T> {
    cell: &'a StateCell<T>,
    armed: bool,
}

impl<T> LoadingGuard<'_, T> {
    /// Publish the outcome and leave `Loading`
    pub(crate) fn finish(mut self, state: ViewState<T>) {
        self.armed = false;
        self.cell.tx.send_replace(state);
    }
}

impl<T> Drop for LoadingGuard<'_, T> {
    fn drop(&mut self) {
        if self.armed {
            self.cell.tx.send_replace(ViewState::Idle);
        }
    }
}
