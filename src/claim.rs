//! Single-owner cells for state that belongs to the audio thread.

use core::cell::UnsafeCell;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicBool, Ordering};

/// A value only one thread may touch at a time, with no waiting.
///
/// [`try_claim`](Self::try_claim) either hands out exclusive access or fails
/// immediately. Nobody ever waits for a claim to be released, so there is no
/// path that parks a thread. In a correctly driven graph only the audio thread
/// claims, and a claim fails only on a concurrent read of the same node.
pub(crate) struct Claimed<T> {
    busy: AtomicBool,
    value: UnsafeCell<T>,
}

// SAFETY: `value` is only reached through a `Claim`, and `busy` guarantees at
// most one `Claim` exists at a time. Acquire/Release on `busy` orders the
// accesses of consecutive owners.
unsafe impl<T: Send> Send for Claimed<T> {}
unsafe impl<T: Send> Sync for Claimed<T> {}

impl<T> Claimed<T> {
    pub(crate) const fn new(value: T) -> Self {
        Self {
            busy: AtomicBool::new(false),
            value: UnsafeCell::new(value),
        }
    }

    /// Exclusive access, or `None` if another claim is alive.
    #[inline]
    pub(crate) fn try_claim(&self) -> Option<Claim<'_, T>> {
        if self.busy.swap(true, Ordering::Acquire) {
            return None;
        }
        Some(Claim { cell: self })
    }

    pub(crate) fn get_mut(&mut self) -> &mut T {
        self.value.get_mut()
    }
}

impl<T: Default> Default for Claimed<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> core::fmt::Debug for Claimed<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Claimed")
            .field("busy", &self.busy.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

pub(crate) struct Claim<'a, T> {
    cell: &'a Claimed<T>,
}

impl<T> Deref for Claim<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: this claim is the only one alive.
        unsafe { &*self.cell.value.get() }
    }
}

impl<T> DerefMut for Claim<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: this claim is the only one alive, and `&mut self` keeps it unique.
        unsafe { &mut *self.cell.value.get() }
    }
}

impl<T> Drop for Claim<'_, T> {
    fn drop(&mut self) {
        self.cell.busy.store(false, Ordering::Release);
    }
}
