//! Core node trait and shared node state.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, AtomicUsize, Ordering};

use crate::error::{GraphError, Result};

/// Channel count used by the convenience constructors (stereo).
pub const DEFAULT_CHANNELS: u8 = 2;

/// Sample rate used by the convenience constructors, in Hz.
pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;

/// Block size a freshly constructed node buffers for, in frames.
pub const DEFAULT_READ_SIZE: usize = 512;

/// A node shared between its owner, the control thread and its downstream consumer.
pub type SharedNode = Arc<dyn AudioNode>;

/// State every node carries: format, block size, pause flag and lifecycle.
///
/// A `NodeCore` starts out degenerate (no channels, no sample rate). It becomes
/// usable through [`init`](Self::init), which may succeed only once until the
/// node is [disposed](Self::dispose) again. Format is fixed from `init` until
/// `dispose`, which zeroes it; the read size and pause flag may change at any
/// time from the control thread.
#[derive(Debug)]
pub struct NodeCore {
    name: &'static str,
    channels: AtomicU8,
    sample_rate: AtomicU32,
    read_size: AtomicUsize,
    paused: AtomicBool,
    booted: AtomicBool,
}

impl NodeCore {
    /// Create a degenerate core. `name` identifies the node type in logs and errors.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            channels: AtomicU8::new(0),
            sample_rate: AtomicU32::new(0),
            read_size: AtomicUsize::new(DEFAULT_READ_SIZE),
            paused: AtomicBool::new(false),
            booted: AtomicBool::new(false),
        }
    }

    /// Fix the output format and mark the node usable.
    ///
    /// Fails if the node is already initialized or the format is empty.
    pub fn init(&mut self, channels: u8, sample_rate: u32) -> Result<()> {
        if *self.booted.get_mut() {
            tracing::error!(node = self.name, "re-initializing an initialized node");
            return Err(GraphError::AlreadyInitialized { node: self.name });
        }
        if channels == 0 || sample_rate == 0 {
            return Err(GraphError::InvalidFormat { channels, sample_rate });
        }

        *self.channels.get_mut() = channels;
        *self.sample_rate.get_mut() = sample_rate;
        *self.paused.get_mut() = false;
        *self.booted.get_mut() = true;
        tracing::debug!(node = self.name, channels, sample_rate, "node initialized");
        Ok(())
    }

    /// Return the node to its degenerate state: no channels, no sample rate.
    ///
    /// Returns `true` if the node was initialized, so callers release their
    /// own resources exactly once.
    pub fn dispose(&self) -> bool {
        let was_booted = self.booted.swap(false, Ordering::Relaxed);
        if was_booted {
            self.channels.store(0, Ordering::Relaxed);
            self.sample_rate.store(0, Ordering::Relaxed);
            tracing::debug!(node = self.name, "node disposed");
        }
        was_booted
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn channels(&self) -> u8 {
        self.channels.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn read_size(&self) -> usize {
        self.read_size.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set_read_size(&self, frames: usize) {
        self.read_size.store(frames, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_booted(&self) -> bool {
        self.booted.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }

    /// Initialized and not paused: the node should produce real output.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.is_booted() && !self.is_paused()
    }

    /// Pause the node. Returns `false` if it was already paused.
    pub fn pause(&self) -> bool {
        !self.paused.swap(true, Ordering::Relaxed)
    }

    /// Resume the node. Returns `false` if it was not paused.
    pub fn resume(&self) -> bool {
        self.paused.swap(false, Ordering::Relaxed)
    }

    /// Error unless the node has been initialized.
    pub fn require_booted(&self) -> Result<()> {
        if self.is_booted() {
            Ok(())
        } else {
            tracing::error!(node = self.name, "operation on an uninitialized node");
            Err(GraphError::Uninitialized { node: self.name })
        }
    }

    /// The part of `buffer` that a read of `frames` frames writes to.
    ///
    /// # Panics
    ///
    /// Panics if `buffer` cannot hold `frames` interleaved frames. A short
    /// destination is a bug in the caller, not a runtime condition.
    #[inline]
    pub fn frames_mut<'a>(&self, buffer: &'a mut [f32], frames: usize) -> &'a mut [f32] {
        let samples = frames * usize::from(self.channels());
        assert!(
            buffer.len() >= samples,
            "{}: buffer holds {} samples, read of {} frames needs {}",
            self.name,
            buffer.len(),
            frames,
            samples
        );
        &mut buffer[..samples]
    }
}

/// The uniform pull-based processing unit of the graph.
///
/// A node produces interleaved `f32` frames on demand. Consumers hold their
/// upstream nodes as [`SharedNode`]s and call [`read`](Self::read) from the
/// audio thread; everything else is called from the control thread.
///
/// Implementors provide a [`NodeCore`] and the three required methods. The
/// format accessors, pause control and read size default to the core. The
/// transport methods default to "unsupported": `false` for the boolean
/// operations and `None` for positions and times.
///
/// # Audio thread rules
///
/// `read`, `completed` and the transport methods may run on the audio
/// thread. They must not block, allocate, log or panic on expected
/// conditions. A node with an upstream loads it once at entry and works with
/// that local copy for the rest of the call.
///
/// # Example
///
/// ```
/// use strom::{AudioNode, NodeCore};
///
/// /// Constant output on every channel.
/// struct Dc {
///     core: NodeCore,
///     level: f32,
/// }
///
/// impl AudioNode for Dc {
///     fn core(&self) -> &NodeCore {
///         &self.core
///     }
///
///     fn read(&self, buffer: &mut [f32], frames: usize) -> usize {
///         let out = self.core.frames_mut(buffer, frames);
///         let level = if self.core.is_active() { self.level } else { 0.0 };
///         out.fill(level);
///         frames
///     }
///
///     fn completed(&self) -> bool {
///         false
///     }
/// }
///
/// let mut dc = Dc { core: NodeCore::new("Dc"), level: 0.5 };
/// dc.core.init(1, 48_000).unwrap();
///
/// let mut buffer = [0.0; 4];
/// assert_eq!(dc.read(&mut buffer, 4), 4);
/// assert_eq!(buffer, [0.5; 4]);
/// ```
pub trait AudioNode: Send + Sync + 'static {
    /// Shared format and lifecycle state.
    fn core(&self) -> &NodeCore;

    /// Read up to `frames` frames into `buffer`.
    ///
    /// AUDIO THREAD. `buffer` must hold at least `frames * channels` samples.
    /// Returns the number of frames written; fewer than `frames` only at the
    /// end of the stream, and `0` once the node is exhausted.
    fn read(&self, buffer: &mut [f32], frames: usize) -> usize;

    /// Whether this node will never produce data again.
    fn completed(&self) -> bool;

    /// Release buffers and upstream references, returning to the degenerate state.
    ///
    /// Must not be called while the audio thread may still read this node.
    fn dispose(&self) {
        self.core().dispose();
    }

    fn name(&self) -> &'static str {
        self.core().name()
    }

    fn channels(&self) -> u8 {
        self.core().channels()
    }

    fn sample_rate(&self) -> u32 {
        self.core().sample_rate()
    }

    fn read_size(&self) -> usize {
        self.core().read_size()
    }

    /// Set the block size this node should buffer for.
    ///
    /// Nodes with internal buffers reallocate here and forward the size to
    /// their inputs. Call it from the control thread while the audio thread
    /// is not reading this node; normally through
    /// [`AudioEngine::set_read_size`](crate::AudioEngine::set_read_size).
    fn set_read_size(&self, frames: usize) {
        self.core().set_read_size(frames);
    }

    fn is_paused(&self) -> bool {
        self.core().is_paused()
    }

    /// Pause output. A paused node reads as silence. Returns `false` if already paused.
    fn pause(&self) -> bool {
        self.core().pause()
    }

    /// Resume output. Returns `false` if the node was not paused.
    fn resume(&self) -> bool {
        self.core().resume()
    }

    /// Nodes currently attached upstream. Control thread only.
    fn inputs(&self) -> Vec<SharedNode> {
        Vec::new()
    }

    /// Mark the current read position, typically as the target of [`reset`](Self::reset).
    fn mark(&self) -> bool {
        false
    }

    /// Clear the marked position.
    fn unmark(&self) -> bool {
        false
    }

    /// Move the read position back to the mark (or the start, node dependent).
    fn reset(&self) -> bool {
        false
    }

    /// Skip `frames` frames without reading them. Returns the frames actually skipped.
    fn advance(&self, _frames: u64) -> Option<u64> {
        None
    }

    /// Current read position in frames.
    fn position(&self) -> Option<u64> {
        None
    }

    /// Move the read position. Returns the new position.
    fn set_position(&self, _frame: u64) -> Option<u64> {
        None
    }

    /// Elapsed playback time in seconds.
    fn elapsed(&self) -> Option<f64> {
        None
    }

    /// Move the read position to `seconds`. Returns the new elapsed time.
    fn set_elapsed(&self, _seconds: f64) -> Option<f64> {
        None
    }

    /// Time left until the node completes, in seconds.
    fn remaining(&self) -> Option<f64> {
        None
    }

    /// Make the node complete after `seconds`. Returns the new remaining time.
    fn set_remaining(&self, _seconds: f64) -> Option<f64> {
        None
    }
}
