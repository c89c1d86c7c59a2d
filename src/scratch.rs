//! Per-node scratch buffers.

use alloc::boxed::Box;
use alloc::vec;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use rtrb::{Consumer, Producer, RingBuffer};

use crate::claim::{Claim, Claimed};

/// Replacements that may be in flight before the audio thread picks them up.
const HANDOFF_SLOTS: usize = 4;

/// Interleaved staging area sized to `read_size × channels`.
///
/// The storage belongs to the audio thread. The control thread never touches
/// it: [`resize`](Self::resize) allocates a replacement and posts it on a
/// ring, the audio thread adopts it at the start of its next
/// [`borrow`](Self::borrow) and posts the old storage back on a second ring,
/// where the control thread frees it on its next resize. Neither side ever
/// waits for the other.
///
/// Until the replacement is adopted, reads keep using the old storage; nodes
/// process in chunks of whatever size they find, so output is unaffected.
pub struct ScratchBuffer {
    audio: Claimed<AudioEnd>,
    /// Serializes control-thread callers. The audio thread never takes it.
    control: Mutex<ControlEnd>,
    /// Size of the most recently posted storage, in samples.
    size: AtomicUsize,
}

struct AudioEnd {
    samples: Box<[f32]>,
    incoming: Consumer<Box<[f32]>>,
    retired: Producer<Box<[f32]>>,
}

struct ControlEnd {
    outgoing: Producer<Box<[f32]>>,
    returned: Consumer<Box<[f32]>>,
}

impl AudioEnd {
    /// Swap in the newest posted storage, retiring everything it replaces.
    #[inline]
    fn adopt(&mut self) {
        while self.retired.slots() > 0 {
            let Ok(fresh) = self.incoming.pop() else {
                break;
            };
            let stale = core::mem::replace(&mut self.samples, fresh);
            let _ = self.retired.push(stale);
        }
    }
}

impl Default for ScratchBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl ScratchBuffer {
    /// An empty buffer.
    pub fn new() -> Self {
        Self::with_size(0, 0)
    }

    /// A zeroed buffer of `frames × channels` samples.
    pub fn with_size(frames: usize, channels: usize) -> Self {
        let samples = vec![0.0; frames * channels].into_boxed_slice();
        let size = samples.len();
        let (outgoing, incoming) = RingBuffer::new(HANDOFF_SLOTS);
        let (retired, returned) = RingBuffer::new(2 * HANDOFF_SLOTS);
        Self {
            audio: Claimed::new(AudioEnd { samples, incoming, retired }),
            control: Mutex::new(ControlEnd { outgoing, returned }),
            size: AtomicUsize::new(size),
        }
    }

    /// Replace the storage right away. Needs exclusive access, so it is for setup.
    pub fn set_size(&mut self, frames: usize, channels: usize) {
        let audio = self.audio.get_mut();
        while audio.incoming.pop().is_ok() {}
        audio.samples = vec![0.0; frames * channels].into_boxed_slice();
        *self.size.get_mut() = audio.samples.len();

        let control = self.control.get_mut();
        while control.returned.pop().is_ok() {}
    }

    /// Post `frames × channels` zeroed samples to replace the storage. Control thread.
    pub fn resize(&self, frames: usize, channels: usize) {
        self.post(vec![0.0; frames * channels].into_boxed_slice());
    }

    /// Post empty storage, freeing the current one once the audio thread lets go. Control thread.
    pub fn release(&self) {
        self.post(Box::default());
    }

    fn post(&self, fresh: Box<[f32]>) {
        let len = fresh.len();
        let mut control = self.control.lock();
        while control.returned.pop().is_ok() {}

        if control.outgoing.push(fresh).is_err() {
            tracing::warn!(samples = len, "scratch handoff is full, keeping the current storage");
            return;
        }
        self.size.store(len, Ordering::Relaxed);
    }

    /// Exclusive access for one read, with any posted replacement adopted first.
    ///
    /// AUDIO THREAD. Returns `None` only when the same node is read from two
    /// places at once, which a well-formed graph never does.
    #[inline]
    pub fn borrow(&self) -> Option<Scratch<'_>> {
        let mut audio = self.audio.try_claim()?;
        audio.adopt();
        Some(Scratch { audio })
    }

    /// Size of the most recently requested storage, in samples.
    pub fn len(&self) -> usize {
        self.size.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl core::fmt::Debug for ScratchBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScratchBuffer").field("len", &self.len()).finish_non_exhaustive()
    }
}

/// The audio thread's view of a [`ScratchBuffer`] for the duration of one read.
pub struct Scratch<'a> {
    audio: Claim<'a, AudioEnd>,
}

impl Deref for Scratch<'_> {
    type Target = [f32];

    fn deref(&self) -> &[f32] {
        &self.audio.samples
    }
}

impl DerefMut for Scratch<'_> {
    fn deref_mut(&mut self) -> &mut [f32] {
        &mut self.audio.samples
    }
}
