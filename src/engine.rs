//! High-level audio engine API

use alloc::sync::Arc;

use crate::error::Result;
use crate::graph::Topology;
use crate::node::{AudioNode, SharedNode, DEFAULT_CHANNELS, DEFAULT_READ_SIZE, DEFAULT_SAMPLE_RATE};
use crate::nodes::AudioOutput;

#[cfg(feature = "cpal_sink")]
use crate::device::CpalDevice;
#[cfg(feature = "cpal_sink")]
use crate::error::GraphError;

/// Output format and block size of an [`AudioEngine`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    pub channels: u8,
    pub sample_rate: u32,
    /// Frames per device callback; nodes size their scratch buffers from it.
    pub read_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            channels: DEFAULT_CHANNELS,
            sample_rate: DEFAULT_SAMPLE_RATE,
            read_size: DEFAULT_READ_SIZE,
        }
    }
}

impl EngineConfig {
    pub fn with_channels(mut self, channels: u8) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_read_size(mut self, read_size: usize) -> Self {
        self.read_size = read_size;
        self
    }
}

/// Owns the terminal [`AudioOutput`] of a graph and, with the `cpal_sink`
/// feature, the device stream that polls it.
///
/// Build the graph out of nodes, then [`attach`](Self::attach) its last node.
/// Without a device, [`render`](Self::render) pulls audio offline, which is
/// also how the graph is exercised in tests:
///
/// ```
/// use strom::{AudioEngine, EngineConfig, SharedNode};
/// use strom::nodes::Sine;
///
/// let engine = AudioEngine::new(EngineConfig::default()).unwrap();
/// let sine: SharedNode = Sine::alloc(440.0, 2, 48_000).unwrap();
/// engine.attach(sine).unwrap();
///
/// let mut block = vec![0.0; 2 * 512];
/// assert_eq!(engine.render(&mut block), 512);
/// ```
///
/// With a device, [`start`](Self::start) hands the output to the device
/// callback and the graph plays in real time:
///
/// ```no_run
/// # #[cfg(feature = "cpal_sink")]
/// # {
/// use strom::{AudioEngine, SharedNode};
/// use strom::nodes::Sine;
///
/// let mut engine = AudioEngine::default_output().expect("no audio device");
/// let sine: SharedNode = Sine::alloc(440.0, engine.channels(), engine.sample_rate()).unwrap();
/// engine.attach(sine).unwrap();
/// engine.start().unwrap();
/// # }
/// ```
///
/// Rewiring with [`attach`](Self::attach) is safe while the stream runs.
/// Dropping the engine stops the stream first and then disposes the output.
pub struct AudioEngine {
    config: EngineConfig,
    output: Arc<AudioOutput>,
    #[cfg(feature = "cpal_sink")]
    device: Option<CpalDevice>,
    #[cfg(feature = "cpal_sink")]
    stream: Option<cpal::Stream>,
}

impl AudioEngine {
    /// Create an engine with no device. Audio is pulled with [`render`](Self::render).
    pub fn new(config: EngineConfig) -> Result<Self> {
        let output = AudioOutput::alloc(config.channels, config.sample_rate)?;
        output.set_read_size(config.read_size);
        tracing::info!(
            channels = config.channels,
            sample_rate = config.sample_rate,
            read_size = config.read_size,
            "engine created"
        );

        Ok(Self {
            config,
            output,
            #[cfg(feature = "cpal_sink")]
            device: None,
            #[cfg(feature = "cpal_sink")]
            stream: None,
        })
    }

    /// Create an engine for the system's default output device.
    #[cfg(feature = "cpal_sink")]
    pub fn default_output() -> Result<Self> {
        let device = CpalDevice::default_output().ok_or(GraphError::NoDevice)?;
        Self::with_device(device)
    }

    /// Create an engine in the device's default format.
    ///
    /// The stream is built by [`start`](Self::start).
    #[cfg(feature = "cpal_sink")]
    pub fn with_device(device: CpalDevice) -> Result<Self> {
        let sample_rate = device.sample_rate();
        let channels = u8::try_from(device.channels())
            .map_err(|_| GraphError::InvalidFormat { channels: u8::MAX, sample_rate })?;
        tracing::info!(device = device.name(), "using output device");

        let mut engine = Self::new(EngineConfig::default().with_channels(channels).with_sample_rate(sample_rate))?;
        engine.device = Some(device);
        Ok(engine)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    pub fn channels(&self) -> u8 {
        self.config.channels
    }

    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    #[inline]
    pub fn read_size(&self) -> usize {
        self.config.read_size
    }

    /// The terminal node. Useful for transport calls and render statistics.
    pub fn output(&self) -> &Arc<AudioOutput> {
        &self.output
    }

    /// Make `node` the root of the graph, returning the previous root.
    ///
    /// `node` must match the engine's channels and sample rate.
    pub fn attach(&self, node: impl Into<Option<SharedNode>>) -> Result<Option<SharedNode>> {
        self.output.attach(node)
    }

    pub fn detach(&self) -> Option<SharedNode> {
        self.output.detach()
    }

    /// Change the block size and propagate it through the graph.
    ///
    /// Only takes effect on the device after a restart.
    pub fn set_read_size(&mut self, frames: usize) {
        self.config.read_size = frames;
        self.output.set_read_size(frames);
        tracing::debug!(frames, "engine read size changed");
    }

    /// Pull one buffer of interleaved audio from the graph. See [`AudioOutput::render`].
    pub fn render(&self, buffer: &mut [f32]) -> usize {
        self.output.render(buffer)
    }

    /// Silence the output without stopping the device. Returns `false` if already paused.
    pub fn pause(&self) -> bool {
        self.output.pause()
    }

    pub fn resume(&self) -> bool {
        self.output.resume()
    }

    /// Whether the graph has nothing more to play.
    pub fn completed(&self) -> bool {
        self.output.completed()
    }

    /// A snapshot of the graph as it is wired right now.
    pub fn topology(&self) -> Topology {
        Topology::of(&*self.output)
    }

    /// Build and play the device stream. Does nothing if it already runs.
    #[cfg(feature = "cpal_sink")]
    pub fn start(&mut self) -> Result<()> {
        use cpal::traits::StreamTrait;

        if self.stream.is_some() {
            return Ok(());
        }
        let device = self.device.as_ref().ok_or(GraphError::NoDevice)?;
        let stream = crate::nodes::sink::cpal_output::build_stream(device, self.output.clone(), self.config.read_size)?;
        stream.play()?;
        tracing::info!(device = device.name(), "output stream started");
        self.stream = Some(stream);
        Ok(())
    }

    /// Pause and drop the device stream. The graph is left intact.
    #[cfg(feature = "cpal_sink")]
    pub fn stop(&mut self) -> Result<()> {
        use cpal::traits::StreamTrait;

        if let Some(stream) = self.stream.take() {
            stream.pause()?;
            tracing::info!("output stream stopped");
        }
        Ok(())
    }

    #[cfg(feature = "cpal_sink")]
    pub fn is_running(&self) -> bool {
        self.stream.is_some()
    }
}

impl Drop for AudioEngine {
    fn drop(&mut self) {
        #[cfg(feature = "cpal_sink")]
        let _ = self
            .stop()
            .map_err(|err| tracing::warn!(%err, "failed to pause output stream on drop"));
        self.output.dispose();
    }
}

impl core::fmt::Debug for AudioEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AudioEngine")
            .field("config", &self.config)
            .field("output", &self.output)
            .finish()
    }
}
