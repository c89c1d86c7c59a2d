//! Audio sample player.

use alloc::sync::Arc;
use core::sync::atomic::{AtomicU64, Ordering};

use crate::error::{GraphError, Result};
use crate::node::{AudioNode, NodeCore};

const NO_MARK: u64 = u64::MAX;

/// Plays pre-decoded, interleaved audio held in memory.
///
/// The player supports the whole transport interface natively. Its read head
/// is an atomic frame index, so the control thread can seek while the audio
/// thread plays; a seek that lands during a read wins over the read's own
/// advance.
///
/// [`set_remaining`](AudioNode::set_remaining) moves the end of playback
/// rather than the read head. Players are usually created by
/// [`AudioSample::create_node`](crate::AudioSample::create_node).
#[derive(Debug)]
pub struct SamplePlayer {
    core: NodeCore,
    samples: Arc<[f32]>,
    frames: u64,
    position: AtomicU64,
    end: AtomicU64,
    mark: AtomicU64,
}

impl Default for SamplePlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl SamplePlayer {
    /// A degenerate player with nothing to play.
    pub fn new() -> Self {
        Self {
            core: NodeCore::new("SamplePlayer"),
            samples: Arc::from(&[][..]),
            frames: 0,
            position: AtomicU64::new(0),
            end: AtomicU64::new(0),
            mark: AtomicU64::new(NO_MARK),
        }
    }

    /// Allocate an initialized player for interleaved `samples`.
    pub fn alloc(samples: impl Into<Arc<[f32]>>, channels: u8, sample_rate: u32) -> Result<Arc<Self>> {
        let mut player = Self::new();
        player.init(samples.into(), channels, sample_rate)?;
        Ok(Arc::new(player))
    }

    /// Initialize with interleaved `samples`, which must hold whole frames.
    pub fn init(&mut self, samples: Arc<[f32]>, channels: u8, sample_rate: u32) -> Result<()> {
        if channels != 0 && samples.len() % usize::from(channels) != 0 {
            return Err(GraphError::InvalidSample {
                samples: samples.len(),
                channels,
            });
        }
        self.core.init(channels, sample_rate)?;

        self.frames = (samples.len() / usize::from(channels)) as u64;
        self.samples = samples;
        *self.position.get_mut() = 0;
        *self.end.get_mut() = self.frames;
        *self.mark.get_mut() = NO_MARK;
        Ok(())
    }

    /// Length of the sample in frames.
    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Length of the sample in seconds.
    pub fn duration(&self) -> f64 {
        self.to_seconds(self.frames)
    }

    fn to_seconds(&self, frames: u64) -> f64 {
        match self.core.sample_rate() {
            0 => 0.0,
            rate => frames as f64 / f64::from(rate),
        }
    }

    fn to_frames(&self, seconds: f64) -> u64 {
        (seconds.max(0.0) * f64::from(self.core.sample_rate())) as u64
    }
}

impl AudioNode for SamplePlayer {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn read(&self, buffer: &mut [f32], frames: usize) -> usize {
        let out = self.core.frames_mut(buffer, frames);
        if !self.core.is_booted() {
            out.fill(0.0);
            return 0;
        }
        if self.core.is_paused() {
            out.fill(0.0);
            return frames;
        }

        let channels = usize::from(self.core.channels());
        let position = self.position.load(Ordering::Relaxed);
        let end = self.end.load(Ordering::Relaxed).min(self.frames);
        let amount = end.saturating_sub(position).min(frames as u64) as usize;

        let start = position as usize * channels;
        let (played, tail) = out.split_at_mut(amount * channels);
        played.copy_from_slice(&self.samples[start..start + amount * channels]);
        tail.fill(0.0);

        if amount > 0 {
            // A failed exchange means the control thread seeked meanwhile; keep its position.
            let _ = self.position.compare_exchange(
                position,
                position + amount as u64,
                Ordering::Relaxed,
                Ordering::Relaxed,
            );
        }
        amount
    }

    fn completed(&self) -> bool {
        !self.core.is_booted()
            || self.position.load(Ordering::Relaxed) >= self.end.load(Ordering::Relaxed).min(self.frames)
    }

    fn mark(&self) -> bool {
        self.mark.store(self.position.load(Ordering::Relaxed), Ordering::Relaxed);
        true
    }

    fn unmark(&self) -> bool {
        self.mark.store(NO_MARK, Ordering::Relaxed);
        true
    }

    /// Return to the mark, or to the start when no mark is set.
    fn reset(&self) -> bool {
        let mark = self.mark.load(Ordering::Relaxed);
        let target = if mark == NO_MARK { 0 } else { mark };
        self.position.store(target, Ordering::Relaxed);
        true
    }

    fn advance(&self, frames: u64) -> Option<u64> {
        let end = self.end.load(Ordering::Relaxed).min(self.frames);
        let step = |position: u64| position.saturating_add(frames).min(end.max(position));
        let previous = self
            .position
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |position| Some(step(position)))
            .unwrap_or_else(|position| position);
        Some(step(previous) - previous)
    }

    fn position(&self) -> Option<u64> {
        Some(self.position.load(Ordering::Relaxed))
    }

    fn set_position(&self, frame: u64) -> Option<u64> {
        let frame = frame.min(self.frames);
        self.position.store(frame, Ordering::Relaxed);
        Some(frame)
    }

    fn elapsed(&self) -> Option<f64> {
        Some(self.to_seconds(self.position.load(Ordering::Relaxed)))
    }

    fn set_elapsed(&self, seconds: f64) -> Option<f64> {
        let frame = self.set_position(self.to_frames(seconds))?;
        Some(self.to_seconds(frame))
    }

    fn remaining(&self) -> Option<f64> {
        let end = self.end.load(Ordering::Relaxed).min(self.frames);
        let position = self.position.load(Ordering::Relaxed);
        Some(self.to_seconds(end.saturating_sub(position)))
    }

    fn set_remaining(&self, seconds: f64) -> Option<f64> {
        let position = self.position.load(Ordering::Relaxed);
        let end = position.saturating_add(self.to_frames(seconds)).min(self.frames);
        self.end.store(end, Ordering::Relaxed);
        Some(self.to_seconds(end - position.min(end)))
    }
}
