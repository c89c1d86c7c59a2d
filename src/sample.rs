//! Decoded audio held in memory.

use alloc::sync::Arc;

use crate::error::{GraphError, Result};
use crate::nodes::SamplePlayer;

/// Interleaved PCM plus its format.
///
/// The sample data is shared: every player created from one sample reads the
/// same allocation, and cloning an `AudioSample` is cheap.
#[derive(Clone, Debug)]
pub struct AudioSample {
    samples: Arc<[f32]>,
    channels: u8,
    sample_rate: u32,
}

impl AudioSample {
    /// Wrap interleaved `samples`, which must hold whole frames.
    pub fn new(samples: impl Into<Arc<[f32]>>, channels: u8, sample_rate: u32) -> Result<Self> {
        let samples = samples.into();
        if channels == 0 || sample_rate == 0 {
            return Err(GraphError::InvalidFormat { channels, sample_rate });
        }
        if samples.len() % usize::from(channels) != 0 {
            return Err(GraphError::InvalidSample {
                samples: samples.len(),
                channels,
            });
        }
        Ok(Self {
            samples,
            channels,
            sample_rate,
        })
    }

    #[inline]
    pub fn channels(&self) -> u8 {
        self.channels
    }

    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Length in frames.
    pub fn frames(&self) -> usize {
        self.samples.len() / usize::from(self.channels)
    }

    /// Length in seconds.
    pub fn duration(&self) -> f64 {
        self.frames() as f64 / f64::from(self.sample_rate)
    }

    /// A new player positioned at the start of this sample.
    pub fn create_node(&self) -> Result<Arc<SamplePlayer>> {
        SamplePlayer::alloc(self.samples.clone(), self.channels, self.sample_rate)
    }
}
