//! Channel panner: remaps an input of one width to an output of another.

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use itertools::iproduct;

use crate::atomic::AtomicF32;
use crate::error::{GraphError, Result};
use crate::graph::admit;
use crate::node::{AudioNode, NodeCore, SharedNode, DEFAULT_CHANNELS, DEFAULT_SAMPLE_RATE};
use crate::scratch::ScratchBuffer;
use crate::slot::InputSlot;

/// A general purpose panner.
///
/// The panner reads `field` channels from its input and writes `channels`
/// channels, at the same sample rate. Entry `[i][j]` of its gain matrix is the
/// share of input channel `i` that goes to output channel `j`. Contributions
/// are summed per output channel without clipping.
///
/// A freshly initialized panner maps each input channel to the output channel
/// of the same index and drops the rest. With equal widths that is the
/// identity, and reads bypass the matrix entirely until the first
/// [`set_gain`](Self::set_gain).
///
/// All methods take `&self`: the input and the gains may be changed from the
/// control thread while the audio thread reads.
///
/// # Example
///
/// ```
/// use strom::nodes::{Panner, SamplePlayer};
/// use strom::{AudioNode, SharedNode};
///
/// // Mono to stereo, full level on both sides.
/// let panner = Panner::alloc(2, 1, 48_000).unwrap();
/// panner.set_gain(0, 1, 1.0);
///
/// let source: SharedNode = SamplePlayer::alloc(vec![0.5; 4], 1, 48_000).unwrap();
/// panner.attach(source).unwrap();
///
/// let mut buffer = [0.0; 8];
/// assert_eq!(panner.read(&mut buffer, 4), 4);
/// assert_eq!(buffer, [0.5; 8]);
/// ```
#[derive(Debug)]
pub struct Panner {
    core: NodeCore,
    field: AtomicU8,
    input: InputSlot,
    /// Row-major, `field × channels`.
    matrix: Box<[AtomicF32]>,
    identity: AtomicBool,
    scratch: ScratchBuffer,
}

impl Default for Panner {
    fn default() -> Self {
        Self::new()
    }
}

impl Panner {
    /// A degenerate panner with no channels. It must be initialized before use.
    pub fn new() -> Self {
        Self {
            core: NodeCore::new("Panner"),
            field: AtomicU8::new(0),
            input: InputSlot::new(),
            matrix: Box::default(),
            identity: AtomicBool::new(true),
            scratch: ScratchBuffer::new(),
        }
    }

    /// Allocate an initialized panner with `field` inputs and `channels` outputs.
    pub fn alloc(channels: u8, field: u8, sample_rate: u32) -> Result<Arc<Self>> {
        let mut panner = Self::new();
        panner.init_with_field(channels, field, sample_rate)?;
        Ok(Arc::new(panner))
    }

    /// Allocate a panner that takes its field and rate from `input` and is attached to it.
    pub fn alloc_with_input(channels: u8, input: SharedNode) -> Result<Arc<Self>> {
        let panner = Self::alloc(channels, input.channels(), input.sample_rate())?;
        panner.attach(input)?;
        Ok(panner)
    }

    /// Initialize as a stereo-to-stereo panner at the default rate.
    pub fn init_default(&mut self) -> Result<()> {
        self.init_with_field(DEFAULT_CHANNELS, DEFAULT_CHANNELS, DEFAULT_SAMPLE_RATE)
    }

    /// Initialize with as many inputs as outputs.
    pub fn init(&mut self, channels: u8, sample_rate: u32) -> Result<()> {
        self.init_with_field(channels, channels, sample_rate)
    }

    /// Initialize with `field` input channels and `channels` output channels.
    pub fn init_with_field(&mut self, channels: u8, field: u8, sample_rate: u32) -> Result<()> {
        if field == 0 {
            return Err(GraphError::InvalidFormat { channels: field, sample_rate });
        }
        self.core.init(channels, sample_rate)?;
        self.set_field(field)
    }

    /// Number of input channels the panner expects.
    #[inline]
    pub fn field(&self) -> u8 {
        self.field.load(Ordering::Relaxed)
    }

    /// Change the number of input channels.
    ///
    /// Resets the matrix to the default mapping. Fails while a node is attached.
    pub fn set_field(&mut self, field: u8) -> Result<()> {
        if self.input.is_attached() {
            tracing::error!("cannot set the field on an active panner");
            return Err(GraphError::FieldLocked);
        }

        let channels = usize::from(self.core.channels());
        *self.field.get_mut() = field;
        self.matrix = iproduct!(0..usize::from(field), 0..channels)
            .map(|(input, output)| AtomicF32::new(if input == output { 1.0 } else { 0.0 }))
            .collect();
        *self.identity.get_mut() = usize::from(field) == channels;
        self.scratch.set_size(self.core.read_size(), usize::from(field));
        Ok(())
    }

    /// Attach `node` as the input, or detach with `None`.
    ///
    /// Detaching always succeeds. Attaching needs an initialized panner, and
    /// the node must have `field` channels and the panner's sample rate. It is
    /// brought to the panner's read size before it goes live. The previous
    /// input, if any, is released. On error nothing changes.
    pub fn attach(&self, node: impl Into<Option<SharedNode>>) -> Result<()> {
        let Some(node) = node.into() else {
            self.detach();
            return Ok(());
        };

        admit(self, self.field(), &node)?;
        tracing::debug!(input = node.name(), "panner input attached");
        self.input.swap(Some(node));
        Ok(())
    }

    /// Remove the input and hand it back to the caller.
    pub fn detach(&self) -> Option<SharedNode> {
        if self.core.require_booted().is_err() {
            return None;
        }
        let previous = self.input.swap(None);
        if let Some(node) = &previous {
            tracing::debug!(input = node.name(), "panner input detached");
        }
        previous
    }

    /// The current input, if any.
    pub fn input(&self) -> Option<SharedNode> {
        self.input.get()
    }

    /// Share of input channel `field` sent to output channel `channel`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    pub fn gain(&self, field: usize, channel: usize) -> f32 {
        self.entry(field, channel).get()
    }

    /// Set the share of input channel `field` sent to output channel `channel`.
    ///
    /// Any edit disables the identity bypass, even one that happens to restore
    /// the identity matrix.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    pub fn set_gain(&self, field: usize, channel: usize, value: f32) {
        let entry = self.entry(field, channel);
        self.identity.store(false, Ordering::Relaxed);
        entry.set(value);
    }

    /// Whether reads currently bypass the matrix.
    pub fn is_identity(&self) -> bool {
        self.identity.load(Ordering::Relaxed)
    }

    fn entry(&self, field: usize, channel: usize) -> &AtomicF32 {
        let channels = usize::from(self.core.channels());
        assert!(field < usize::from(self.field()), "field {field} is out of range");
        assert!(channel < channels, "channel {channel} is out of range");
        &self.matrix[field * channels + channel]
    }

    /// Mix `frames` frames through the matrix, one scratch-sized chunk at a time.
    ///
    /// With no scratch to mix through (a read size of 0) nothing is pulled
    /// and the read reports 0 frames.
    fn mix(&self, input: &dyn AudioNode, out: &mut [f32], frames: usize, field: usize) -> usize {
        out.fill(0.0);
        let Some(mut scratch) = self.scratch.borrow() else {
            return frames;
        };

        let channels = usize::from(self.core.channels());
        let capacity = scratch.len().checked_div(field).unwrap_or(0);
        if capacity == 0 {
            return 0;
        }

        let mut actual = 0;
        while actual < frames {
            let chunk = (frames - actual).min(capacity);
            let current = &mut out[actual * channels..(actual + chunk) * channels];
            current.fill(0.0);

            let taken = input.read(&mut scratch[..chunk * field], chunk).min(chunk);
            for (ii, jj) in iproduct!(0..field, 0..channels) {
                let gain = self.matrix[ii * channels + jj].get();
                if gain != 0.0 {
                    let frames_out = current.chunks_exact_mut(channels);
                    let frames_in = scratch.chunks_exact(field);
                    for (frame_out, frame_in) in frames_out.zip(frames_in).take(taken) {
                        frame_out[jj] += frame_in[ii] * gain;
                    }
                }
            }

            if taken == 0 {
                out[actual * channels..].fill(0.0);
                break;
            }
            actual += taken;
        }
        actual
    }
}

impl AudioNode for Panner {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn read(&self, buffer: &mut [f32], frames: usize) -> usize {
        let out = self.core.frames_mut(buffer, frames);
        let input = self.input.load();
        let identity = self.identity.load(Ordering::Relaxed);
        let field = self.field();

        let node = match input.as_deref() {
            Some(node) if self.core.is_active() => node,
            _ => {
                out.fill(0.0);
                return if self.core.is_booted() { frames } else { 0 };
            }
        };

        if identity && field == self.core.channels() {
            return node.read(out, frames);
        }
        self.mix(&**node, out, frames, usize::from(field))
    }

    fn completed(&self) -> bool {
        self.input.with(|node| node.completed()).unwrap_or(true)
    }

    fn dispose(&self) {
        if self.core.dispose() {
            self.input.swap(None);
            self.field.store(0, Ordering::Relaxed);
            self.scratch.release();
        }
    }

    /// Post a scratch buffer of `frames` frames and forward the size upstream.
    ///
    /// Returns without waiting for a read in progress, which finishes on the
    /// old buffer. A read size of 0 leaves a mixing panner nothing to mix
    /// through, so its reads return 0 until a real size is set.
    fn set_read_size(&self, frames: usize) {
        self.core.set_read_size(frames);
        self.scratch.resize(frames, usize::from(self.field()));
        self.input.with(|node| node.set_read_size(frames));
        tracing::debug!(frames, "panner read size changed");
    }

    fn inputs(&self) -> Vec<SharedNode> {
        self.input.get().into_iter().collect()
    }

    fn mark(&self) -> bool {
        self.input.with(|node| node.mark()).unwrap_or(false)
    }

    fn unmark(&self) -> bool {
        self.input.with(|node| node.unmark()).unwrap_or(false)
    }

    fn reset(&self) -> bool {
        self.input.with(|node| node.reset()).unwrap_or(false)
    }

    fn advance(&self, frames: u64) -> Option<u64> {
        self.input.with(|node| node.advance(frames)).flatten()
    }

    fn position(&self) -> Option<u64> {
        self.input.with(|node| node.position()).flatten()
    }

    fn set_position(&self, frame: u64) -> Option<u64> {
        self.input.with(|node| node.set_position(frame)).flatten()
    }

    fn elapsed(&self) -> Option<f64> {
        self.input.with(|node| node.elapsed()).flatten()
    }

    fn set_elapsed(&self, seconds: f64) -> Option<f64> {
        self.input.with(|node| node.set_elapsed(seconds)).flatten()
    }

    fn remaining(&self) -> Option<f64> {
        self.input.with(|node| node.remaining()).flatten()
    }

    fn set_remaining(&self, seconds: f64) -> Option<f64> {
        self.input.with(|node| node.set_remaining(seconds)).flatten()
    }
}
