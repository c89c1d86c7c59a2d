//! Terminal node polled by the hardware callback

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU64, Ordering};

use crate::error::Result;
use crate::graph::admit;
use crate::node::{AudioNode, NodeCore, SharedNode};
use crate::slot::InputSlot;

/// The end of a graph: one input, rendered into whole device buffers.
///
/// Where other nodes may return short reads, [`render`](Self::render) always
/// fills the buffer it is given and pads with silence, which is what a device
/// callback needs. Transport calls are forwarded to the input, so the output
/// can stand in for "whatever is playing".
#[derive(Debug)]
pub struct AudioOutput {
    core: NodeCore,
    input: InputSlot,
    rendered: AtomicU64,
}

impl Default for AudioOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioOutput {
    pub fn new() -> Self {
        Self {
            core: NodeCore::new("AudioOutput"),
            input: InputSlot::new(),
            rendered: AtomicU64::new(0),
        }
    }

    /// Allocate an initialized output.
    pub fn alloc(channels: u8, sample_rate: u32) -> Result<Arc<Self>> {
        let mut output = Self::new();
        output.init(channels, sample_rate)?;
        Ok(Arc::new(output))
    }

    pub fn init(&mut self, channels: u8, sample_rate: u32) -> Result<()> {
        self.core.init(channels, sample_rate)?;
        *self.rendered.get_mut() = 0;
        Ok(())
    }

    /// Attach `node`, or detach with `None`. Returns the previous input.
    pub fn attach(&self, node: impl Into<Option<SharedNode>>) -> Result<Option<SharedNode>> {
        let Some(node) = node.into() else {
            return Ok(self.detach());
        };

        admit(self, self.core.channels(), &node)?;
        tracing::debug!(input = node.name(), "output input attached");
        Ok(self.input.swap(Some(node)))
    }

    pub fn detach(&self) -> Option<SharedNode> {
        let previous = self.input.swap(None);
        if let Some(node) = &previous {
            tracing::debug!(input = node.name(), "output input detached");
        }
        previous
    }

    pub fn input(&self) -> Option<SharedNode> {
        self.input.get()
    }

    /// Fill all of `buffer` with interleaved output.
    ///
    /// AUDIO THREAD. Returns the frames the input actually produced; the rest
    /// of the buffer, including any trailing partial frame, is silence.
    pub fn render(&self, buffer: &mut [f32]) -> usize {
        let channels = usize::from(self.core.channels());
        if channels == 0 {
            buffer.fill(0.0);
            return 0;
        }

        let frames = buffer.len() / channels;
        let produced = self.read(buffer, frames).min(frames);
        buffer[produced * channels..].fill(0.0);
        self.rendered.fetch_add(frames as u64, Ordering::Relaxed);
        produced
    }

    /// Frames handed to the device so far, silence included.
    pub fn rendered_frames(&self) -> u64 {
        self.rendered.load(Ordering::Relaxed)
    }
}

impl AudioNode for AudioOutput {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn read(&self, buffer: &mut [f32], frames: usize) -> usize {
        let out = self.core.frames_mut(buffer, frames);
        let input = self.input.load();
        match input.as_deref() {
            Some(node) if self.core.is_active() => {
                let produced = node.read(out, frames).min(frames);
                out[produced * usize::from(self.core.channels())..].fill(0.0);
                produced
            }
            _ => {
                out.fill(0.0);
                0
            }
        }
    }

    fn completed(&self) -> bool {
        self.input.with(|node| node.completed()).unwrap_or(true)
    }

    fn dispose(&self) {
        if self.core.dispose() {
            self.input.swap(None);
        }
    }

    fn set_read_size(&self, frames: usize) {
        self.core.set_read_size(frames);
        self.input.with(|node| node.set_read_size(frames));
        tracing::debug!(frames, "output read size changed");
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
