//! Nested undo journal shared by every pair on a thread.
//!
//! A guarded operation opens a [`Transaction`] before it touches anything.
//! State changes made while a transaction is open (by the operation itself,
//! by a flash-swap callee, or by other pairs the callee trades on) record a
//! compensating action.  Committing hands the actions to the enclosing
//! transaction, if any; reverting runs them newest first.
//!
//! The journal is per thread: share operations made by other threads never
//! land in it and are never undone by it.

use core::cell::RefCell;

type Undo = Box<dyn FnOnce()>;

thread_local! {
    static FRAMES: RefCell<Vec<Vec<Undo>>> = const { RefCell::new(Vec::new()) };
}

/// An open frame of the journal.  Dropping it without committing reverts.
#[must_use = "dropping a transaction reverts it"]
pub(crate) struct Transaction {
    depth: usize,
}

impl Transaction {
    pub(crate) fn begin() -> Self {
        let depth = FRAMES.with(|frames| {
            let mut frames = frames.borrow_mut();
            frames.push(Vec::new());
            frames.len()
        });
        Self { depth }
    }

    /// Keeps every change; the enclosing transaction may still undo them.
    pub(crate) fn commit(self) {
        let undo = self.take();
        FRAMES.with(|frames| {
            if let Some(parent) = frames.borrow_mut().last_mut() {
                parent.extend(undo);
            }
        });
    }

    /// Undoes every change recorded since [`Transaction::begin`].
    pub(crate) fn revert(self) {
        drop(self);
    }

    fn take(&self) -> Vec<Undo> {
        FRAMES.with(|frames| {
            let mut frames = frames.borrow_mut();
            if frames.len() == self.depth {
                frames.pop().unwrap_or_default()
            } else {
                Vec::new()
            }
        })
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        // closures run outside the borrow: they may not touch the journal
        for undo in self.take().into_iter().rev() {
            undo();
        }
    }
}

/// Returns `true` while a transaction is open on this thread.
pub(crate) fn is_open() -> bool {
    FRAMES.with(|frames| !frames.borrow().is_empty())
}

/// Records `undo` in the innermost open transaction; no-op outside one.
pub(crate) fn record(undo: impl FnOnce() + 'static) {
    FRAMES.with(|frames| {
        if let Some(frame) = frames.borrow_mut().last_mut() {
            frame.push(Box::new(undo));
        }
    });
}
