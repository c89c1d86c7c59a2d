//! Sine wave oscillator

use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::atomic::AtomicF32;
use crate::error::Result;
use crate::node::{AudioNode, NodeCore};

/// A never-ending sine wave, the same on every channel.
///
/// Frequency and amplitude can be changed from any thread and take effect on
/// the next read. The oscillator only completes once [`shutdown`](Self::shutdown)
/// is called.
#[derive(Debug)]
pub struct Sine {
    core: NodeCore,
    frequency: AtomicF32,
    amplitude: AtomicF32,
    /// In cycles, `[0, 1)`. Written by the audio thread, reset by the control thread.
    phase: AtomicF32,
    shutdown: AtomicBool,
}

impl Sine {
    pub fn new(frequency: f32) -> Self {
        Self {
            core: NodeCore::new("Sine"),
            frequency: AtomicF32::new(frequency.max(0.0)),
            amplitude: AtomicF32::new(0.25), // -12dB, safe default
            phase: AtomicF32::new(0.0),
            shutdown: AtomicBool::new(false),
        }
    }

    pub fn with_amplitude(self, amplitude: f32) -> Self {
        self.set_amplitude(amplitude);
        self
    }

    /// Allocate an initialized oscillator.
    pub fn alloc(frequency: f32, channels: u8, sample_rate: u32) -> Result<Arc<Self>> {
        let mut sine = Self::new(frequency);
        sine.init(channels, sample_rate)?;
        Ok(Arc::new(sine))
    }

    pub fn init(&mut self, channels: u8, sample_rate: u32) -> Result<()> {
        self.core.init(channels, sample_rate)?;
        *self.shutdown.get_mut() = false;
        Ok(())
    }

    #[inline]
    pub fn frequency(&self) -> f32 {
        self.frequency.get()
    }

    pub fn set_frequency(&self, frequency: f32) {
        self.frequency.set(frequency.max(0.0));
    }

    #[inline]
    pub fn amplitude(&self) -> f32 {
        self.amplitude.get()
    }

    pub fn set_amplitude(&self, amplitude: f32) {
        self.amplitude.set(amplitude.clamp(0.0, 1.0));
    }

    /// Stop for good: reads return 0 frames and the node reports completion.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }
}

impl AudioNode for Sine {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn read(&self, buffer: &mut [f32], frames: usize) -> usize {
        let out = self.core.frames_mut(buffer, frames);
        if !self.core.is_booted() || self.shutdown.load(Ordering::Relaxed) {
            out.fill(0.0);
            return 0;
        }
        if self.core.is_paused() {
            out.fill(0.0);
            return frames;
        }

        let channels = usize::from(self.core.channels());
        let phase_inc = self.frequency.get() / self.core.sample_rate() as f32;
        let amplitude = self.amplitude.get();
        let mut phase = self.phase.get();

        for frame in out.chunks_exact_mut(channels) {
            frame.fill((phase * core::f32::consts::TAU).sin() * amplitude);
            phase += phase_inc;
            phase -= phase.floor();
        }

        self.phase.set(phase);
        frames
    }

    fn completed(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    /// Restart the wave at phase zero.
    fn reset(&self) -> bool {
        self.phase.set(0.0);
        true
    }
}
