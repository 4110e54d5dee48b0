//! Updater Protocol - repeatable units of update work.
//!
//! An [`Updater`] is polymorphic over a single operation: poll once and
//! either hand back a replacement (more polling may matter later) or signal
//! [`Poll::Done`] (the computation has become constant and is never polled
//! again). A failed poll yields a [`PollError`]: the error plus the
//! retriable state to retain, so one failing pass does not destroy the
//! updater tree. Sequences of updaters collected during one render pass
//! fold into a single composite with [`to_updater`].

use crate::error::RenderError;
use crate::host::Host;

/// The outcome of polling an [`Updater`].
pub enum Poll {
    /// The computation became constant; drop it and never poll it again.
    Done,
    /// The replacement to poll next time. State persists across polls.
    Continue(Box<dyn Updater>),
}

impl std::fmt::Debug for Poll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Done => write!(f, "Done"),
            Self::Continue(updater) => write!(f, "Continue({})", updater.describe()),
        }
    }
}

/// A failed poll: the error plus the state to retain so a later poll can
/// retry. `retry: None` means the updater had no recoverable state.
pub struct PollError {
    pub error: RenderError,
    pub retry: Option<Box<dyn Updater>>,
}

impl From<RenderError> for PollError {
    fn from(error: RenderError) -> Self {
        Self { error, retry: None }
    }
}

impl std::fmt::Debug for PollError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollError")
            .field("error", &self.error)
            .field("retry", &self.retry.as_ref().map(|u| u.describe()))
            .finish()
    }
}

/// Work to redo when inputs may have changed.
///
/// Ownership: an updater is exclusively held by the region or block that
/// produced it until it is handed to its parent region, which then owns the
/// merged sequence.
pub trait Updater {
    /// Poll once. Errors from user blocks propagate unchanged; an updater
    /// that can retry after the failure hands its retained state back in
    /// [`PollError::retry`].
    fn poll(self: Box<Self>, host: &dyn Host) -> Result<Poll, PollError>;

    /// Debug description, used by host diagnostics.
    fn describe(&self) -> String {
        "updater".to_string()
    }
}

/// Fold the updaters collected during one render pass into one.
///
/// An empty sequence folds to `None` (nothing to update, matching a const
/// result upward); a single member folds to itself; anything longer polls
/// every member in the original emission order on every poll.
pub fn to_updater(mut updaters: Vec<Box<dyn Updater>>) -> Option<Box<dyn Updater>> {
    match updaters.len() {
        0 => None,
        1 => updaters.pop(),
        _ => Some(Box::new(UpdaterList { updaters })),
    }
}

/// Composite that preserves emission order on every poll, not just the
/// first. Members that return [`Poll::Done`] are dropped permanently.
struct UpdaterList {
    updaters: Vec<Box<dyn Updater>>,
}

impl Updater for UpdaterList {
    fn poll(self: Box<Self>, host: &dyn Host) -> Result<Poll, PollError> {
        let mut next = Vec::with_capacity(self.updaters.len());
        let mut pending = self.updaters.into_iter();

        while let Some(updater) = pending.next() {
            match updater.poll(host) {
                Ok(Poll::Done) => {}
                Ok(Poll::Continue(updater)) => next.push(updater),
                Err(PollError { error, retry }) => {
                    // Survivors polled so far, the failed member's retry
                    // state, and the members never reached all stay retained.
                    next.extend(retry);
                    next.extend(pending);
                    return Err(PollError {
                        error,
                        retry: to_updater(next),
                    });
                }
            }
        }

        if next.is_empty() {
            Ok(Poll::Done)
        } else {
            Ok(Poll::Continue(Box::new(Self { updaters: next })))
        }
    }

    fn describe(&self) -> String {
        format!("UpdaterList({} members)", self.updaters.len())
    }
}

// =============================================================================
// Tests
// =============================================================================
