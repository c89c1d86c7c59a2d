//! Mixer effect - sums several inputs of the same format

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::atomic::AtomicF32;
use crate::error::Result;
use crate::graph::admit;
use crate::node::{AudioNode, NodeCore, SharedNode};
use crate::scratch::ScratchBuffer;
use crate::slot::InputSlot;

/// A mixer that sums a fixed number of input slots.
///
/// Every input must match the mixer's channel count and sample rate. Slots can
/// be filled and emptied independently while the mixer is being read; each
/// slot is loaded once per read. The sum is scaled by a master gain and is
/// not clipped.
///
/// A mixer is a bus: it always returns the full frame count, filling with
/// silence where inputs run short.
#[derive(Debug)]
pub struct Mixer {
    core: NodeCore,
    slots: Box<[InputSlot]>,
    gain: AtomicF32,
    scratch: ScratchBuffer,
}

impl Default for Mixer {
    fn default() -> Self {
        Self::new()
    }
}

impl Mixer {
    /// A degenerate mixer with no slots.
    pub fn new() -> Self {
        Self {
            core: NodeCore::new("Mixer"),
            slots: Box::default(),
            gain: AtomicF32::new(1.0),
            scratch: ScratchBuffer::new(),
        }
    }

    /// Allocate an initialized mixer with `width` input slots.
    pub fn alloc(width: usize, channels: u8, sample_rate: u32) -> Result<Arc<Self>> {
        let mut mixer = Self::new();
        mixer.init(width, channels, sample_rate)?;
        Ok(Arc::new(mixer))
    }

    pub fn init(&mut self, width: usize, channels: u8, sample_rate: u32) -> Result<()> {
        self.core.init(channels, sample_rate)?;
        self.slots = (0..width).map(|_| InputSlot::new()).collect();
        self.scratch.set_size(self.core.read_size(), usize::from(channels));
        Ok(())
    }

    /// Number of input slots.
    pub fn width(&self) -> usize {
        self.slots.len()
    }

    /// Put `node` into `slot`, returning whatever occupied it before.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is out of range.
    pub fn attach(&self, slot: usize, node: SharedNode) -> Result<Option<SharedNode>> {
        let target = self.slot(slot);
        admit(self, self.core.channels(), &node)?;
        tracing::debug!(slot, input = node.name(), "mixer input attached");
        Ok(target.swap(Some(node)))
    }

    /// Empty `slot`, returning the node it held.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is out of range.
    pub fn detach(&self, slot: usize) -> Option<SharedNode> {
        let previous = self.slot(slot).swap(None);
        if let Some(node) = &previous {
            tracing::debug!(slot, input = node.name(), "mixer input detached");
        }
        previous
    }

    /// The node in `slot`, if any.
    pub fn input(&self, slot: usize) -> Option<SharedNode> {
        self.slot(slot).get()
    }

    #[inline]
    pub fn gain(&self) -> f32 {
        self.gain.get()
    }

    /// Set the master gain applied to the sum.
    #[inline]
    pub fn set_gain(&self, gain: f32) {
        self.gain.set(gain);
    }

    fn slot(&self, slot: usize) -> &InputSlot {
        assert!(slot < self.slots.len(), "slot {slot} is out of range");
        &self.slots[slot]
    }
}

impl AudioNode for Mixer {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn read(&self, buffer: &mut [f32], frames: usize) -> usize {
        let out = self.core.frames_mut(buffer, frames);
        out.fill(0.0);
        if !self.core.is_active() {
            return if self.core.is_booted() { frames } else { 0 };
        }

        let Some(mut scratch) = self.scratch.borrow() else {
            return frames;
        };
        let channels = usize::from(self.core.channels());
        let capacity = scratch.len() / channels;
        if capacity == 0 {
            return frames;
        }
        let gain = self.gain.get();

        for slot in self.slots.iter() {
            let input = slot.load();
            let Some(node) = input.as_deref() else {
                continue;
            };

            let mut done = 0;
            while done < frames {
                let chunk = (frames - done).min(capacity);
                let taken = node.read(&mut scratch[..chunk * channels], chunk).min(chunk);
                if taken == 0 {
                    break;
                }
                let mixed = &mut out[done * channels..(done + taken) * channels];
                for (sum, sample) in mixed.iter_mut().zip(scratch.iter()) {
                    *sum += sample * gain;
                }
                done += taken;
            }
        }
        frames
    }

    /// Completed once no slot holds an unfinished input.
    fn completed(&self) -> bool {
        self.slots
            .iter()
            .all(|slot| slot.with(|node| node.completed()).unwrap_or(true))
    }

    fn dispose(&self) {
        if self.core.dispose() {
            for slot in self.slots.iter() {
                slot.swap(None);
            }
            self.scratch.release();
        }
    }

    fn set_read_size(&self, frames: usize) {
        self.core.set_read_size(frames);
        self.scratch.resize(frames, usize::from(self.core.channels()));
        for slot in self.slots.iter() {
            slot.with(|node| node.set_read_size(frames));
        }
        tracing::debug!(frames, "mixer read size changed");
    }

    fn inputs(&self) -> Vec<SharedNode> {
        self.slots.iter().filter_map(InputSlot::get).collect()
    }
}
