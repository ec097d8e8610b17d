//! In-flight markers for operations that must not overlap.

use std::sync::atomic::{AtomicBool, Ordering};

/// A flag marking an operation as in flight.
///
/// [`BusyFlag::try_acquire`] hands out a guard that clears the flag when it
/// is dropped, so the flag is reset on success, on error and on early return.
#[derive(Debug, Default)]
pub(crate) struct BusyFlag(AtomicBool);

impl BusyFlag {
    pub(crate) fn try_acquire(&self) -> Option<BusyGuard<'_>> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(&self.0))
    }

    pub(crate) fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug)]
pub(crate) struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_fails_until_guard_drops() {
        let flag = BusyFlag::default();
        let guard = flag.try_acquire();
        assert!(guard.is_some());
        assert!(flag.is_set());
        assert!(flag.try_acquire().is_none());
        drop(guard);
        assert!(!flag.is_set());
        assert!(flag.try_acquire().is_some());
    }
}
