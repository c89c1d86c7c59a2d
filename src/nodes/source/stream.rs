//! Live source fed from another thread through a ring buffer

use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use rtrb::{Consumer, Producer, RingBuffer};

use crate::claim::Claimed;
use crate::error::Result;
use crate::node::{AudioNode, NodeCore};

const UNSET: u64 = u64::MAX;

/// A never-ending source whose samples are pushed by a producer thread.
///
/// A decoder, network receiver or capture callback pushes interleaved
/// samples into the [`Producer`] returned at allocation; the audio thread
/// pops whole frames. When the producer falls behind, the missing frames are
/// played as silence and counted as underruns, and the read still returns
/// the full frame count.
///
/// The stream ends only when told to: after [`close`](Self::close) (or once
/// the producer is dropped) the buffered frames drain and reads then return
/// 0. A time limit set with [`set_remaining`](AudioNode::set_remaining) ends
/// it as well.
///
/// Positions are only meaningful relative to a [`mark`](AudioNode::mark):
/// without one, [`position`](AudioNode::position) is unsupported.
pub struct StreamSource {
    core: NodeCore,
    /// Popped by the audio thread only.
    consumer: Claimed<Option<Consumer<f32>>>,
    closed: AtomicBool,
    drained: AtomicBool,
    /// Frames played so far, silence included.
    clock: AtomicU64,
    underruns: AtomicU64,
    mark: AtomicU64,
    deadline: AtomicU64,
}

impl core::fmt::Debug for StreamSource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StreamSource")
            .field("core", &self.core)
            .field("closed", &self.closed)
            .field("clock", &self.clock)
            .field("underruns", &self.underruns)
            .finish_non_exhaustive()
    }
}

impl Default for StreamSource {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamSource {
    /// A degenerate stream with no ring buffer.
    pub fn new() -> Self {
        Self {
            core: NodeCore::new("StreamSource"),
            consumer: Claimed::new(None),
            closed: AtomicBool::new(false),
            drained: AtomicBool::new(false),
            clock: AtomicU64::new(0),
            underruns: AtomicU64::new(0),
            mark: AtomicU64::new(UNSET),
            deadline: AtomicU64::new(UNSET),
        }
    }

    /// Allocate an initialized stream buffering up to `capacity` frames.
    pub fn alloc(channels: u8, sample_rate: u32, capacity: usize) -> Result<(Arc<Self>, Producer<f32>)> {
        let mut stream = Self::new();
        let producer = stream.init(channels, sample_rate, capacity)?;
        Ok((Arc::new(stream), producer))
    }

    /// Initialize and return the producer side of the ring buffer.
    pub fn init(&mut self, channels: u8, sample_rate: u32, capacity: usize) -> Result<Producer<f32>> {
        self.core.init(channels, sample_rate)?;
        let (producer, consumer) = RingBuffer::new(capacity.max(1) * usize::from(channels));
        *self.consumer.get_mut() = Some(consumer);
        *self.closed.get_mut() = false;
        *self.drained.get_mut() = false;
        *self.clock.get_mut() = 0;
        *self.underruns.get_mut() = 0;
        *self.mark.get_mut() = UNSET;
        *self.deadline.get_mut() = UNSET;
        Ok(producer)
    }

    /// Stop waiting for more data. Buffered frames are still played.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Relaxed);
    }

    /// Frames played as silence because the producer fell behind.
    pub fn underruns(&self) -> u64 {
        self.underruns.load(Ordering::Relaxed)
    }

    fn frames_to_seconds(&self, frames: u64) -> f64 {
        frames as f64 / f64::from(self.core.sample_rate().max(1))
    }
}

impl AudioNode for StreamSource {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn read(&self, buffer: &mut [f32], frames: usize) -> usize {
        let out = self.core.frames_mut(buffer, frames);
        out.fill(0.0);
        if !self.core.is_booted() || self.drained.load(Ordering::Relaxed) {
            return 0;
        }

        let clock = self.clock.load(Ordering::Relaxed);
        let deadline = self.deadline.load(Ordering::Relaxed);
        let wanted = deadline.saturating_sub(clock).min(frames as u64) as usize;
        if wanted == 0 {
            return 0;
        }
        if self.core.is_paused() {
            return frames;
        }

        let Some(mut consumer) = self.consumer.try_claim() else {
            return frames;
        };
        let Some(consumer) = consumer.as_mut() else {
            return 0;
        };

        let channels = usize::from(self.core.channels());
        let amount = (consumer.slots() / channels).min(wanted);
        if let Ok(chunk) = consumer.read_chunk(amount * channels) {
            let (first, second) = chunk.as_slices();
            out[..first.len()].copy_from_slice(first);
            out[first.len()..first.len() + second.len()].copy_from_slice(second);
            chunk.commit_all();
        }

        let played = if self.closed.load(Ordering::Relaxed) || consumer.is_abandoned() {
            if amount == 0 && consumer.is_empty() {
                self.drained.store(true, Ordering::Relaxed);
            }
            amount
        } else {
            self.underruns.fetch_add((wanted - amount) as u64, Ordering::Relaxed);
            wanted
        };
        self.clock.store(clock + played as u64, Ordering::Relaxed);
        played
    }

    fn completed(&self) -> bool {
        !self.core.is_booted()
            || self.drained.load(Ordering::Relaxed)
            || self.clock.load(Ordering::Relaxed) >= self.deadline.load(Ordering::Relaxed)
    }

    fn dispose(&self) {
        if self.core.dispose() {
            match self.consumer.try_claim() {
                Some(mut consumer) => drop(consumer.take()),
                None => tracing::warn!("stream disposed while being read, keeping its ring buffer"),
            }
        }
    }

    /// Start counting positions from the current frame.
    fn mark(&self) -> bool {
        self.mark.store(self.clock.load(Ordering::Relaxed), Ordering::Relaxed);
        true
    }

    fn unmark(&self) -> bool {
        self.mark.store(UNSET, Ordering::Relaxed);
        true
    }

    /// Frames played since the mark.
    fn position(&self) -> Option<u64> {
        match self.mark.load(Ordering::Relaxed) {
            UNSET => None,
            mark => Some(self.clock.load(Ordering::Relaxed).saturating_sub(mark)),
        }
    }

    fn elapsed(&self) -> Option<f64> {
        self.position().map(|frames| self.frames_to_seconds(frames))
    }

    fn remaining(&self) -> Option<f64> {
        match self.deadline.load(Ordering::Relaxed) {
            UNSET => None,
            deadline => {
                let left = deadline.saturating_sub(self.clock.load(Ordering::Relaxed));
                Some(self.frames_to_seconds(left))
            }
        }
    }

    /// Time the stream out after `seconds`.
    fn set_remaining(&self, seconds: f64) -> Option<f64> {
        let frames = (seconds.max(0.0) * f64::from(self.core.sample_rate())) as u64;
        let clock = self.clock.load(Ordering::Relaxed);
        self.deadline.store(clock.saturating_add(frames), Ordering::Relaxed);
        Some(self.frames_to_seconds(frames))
    }
}
