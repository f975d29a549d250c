//! Single-slot reentrancy lock.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::error::PairError;

/// Lock flag wrapping every guarded pair entry point.
///
/// Unlike a mutex it never blocks: a second entry while the flag is set is
/// rejected with [`PairError::ReentrantCall`].  Entering returns a
/// [`LockGuard`] that clears the flag when dropped, so release happens on
/// every exit path, including `?` propagation and unwinding.
#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    locked: AtomicBool,
}

impl ReentrancyGuard {
    /// Creates an unlocked guard.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            locked: AtomicBool::new(false),
        }
    }

    /// Marks the guard as entered.
    ///
    /// # Errors
    ///
    /// Returns [`PairError::ReentrantCall`] if the guard is already entered.
    pub fn enter(&self) -> Result<LockGuard<'_>, PairError> {
        self.locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .map_err(|_| PairError::ReentrantCall)?;
        Ok(LockGuard { guard: self })
    }

    /// Returns `true` while a guarded operation is running.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }

    fn exit(&self) {
        self.locked.store(false, Ordering::Release);
    }
}

/// Scope token returned by [`ReentrancyGuard::enter`].
#[derive(Debug)]
#[must_use = "the guard is released as soon as the token is dropped"]
pub struct LockGuard<'a> {
    guard: &'a ReentrancyGuard,
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        self.guard.exit();
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn starts_unlocked() {
        assert!(!ReentrancyGuard::new().is_locked());
    }

    #[test]
    fn second_entry_is_rejected() {
        let guard = ReentrancyGuard::new();
        let Ok(_token) = guard.enter() else {
            panic!("first entry must succeed");
        };
        assert!(guard.is_locked());
        assert!(matches!(guard.enter(), Err(PairError::ReentrantCall)));
    }

    #[test]
    fn drop_releases() {
        let guard = ReentrancyGuard::new();
        {
            let Ok(_token) = guard.enter() else {
                panic!("first entry must succeed");
            };
        }
        assert!(!guard.is_locked());
        assert!(guard.enter().is_ok());
    }

    #[test]
    fn released_on_error_path() {
        fn failing(guard: &ReentrancyGuard) -> Result<(), PairError> {
            let _token = guard.enter()?;
            Err(PairError::KInvariantViolation)
        }
        let guard = ReentrancyGuard::new();
        assert_eq!(failing(&guard), Err(PairError::KInvariantViolation));
        assert!(!guard.is_locked());
    }
}
