//! Relaxed float atomics for parameters shared with the audio thread.

use core::sync::atomic::{AtomicU32, Ordering};

/// An `f32` stored as its bit pattern in an [`AtomicU32`].
///
/// All accesses are relaxed. A reader sees either the old or the new value,
/// never a torn mix of the two, which is all a gain or frequency needs.
#[derive(Debug)]
pub struct AtomicF32(AtomicU32);

impl AtomicF32 {
    pub const fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    #[inline]
    pub fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn set(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

impl Default for AtomicF32 {
    fn default() -> Self {
        Self::new(0.0)
    }
}
