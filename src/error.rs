//! Errors raised while building or reconfiguring a graph.
//!
//! Nothing in here is ever produced on the audio thread. Expected runtime
//! conditions there (a detached input, a paused node, an exhausted source) are
//! answered with silence or a short frame count instead.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, GraphError>;

/// Misuse of the graph-construction contract, or a device failure.
#[derive(Debug, Error)]
pub enum GraphError {
    /// `init` was called on a node that is already initialized.
    #[error("{node} is already initialized")]
    AlreadyInitialized { node: &'static str },

    /// An operation that needs an initialized node met a degenerate one.
    #[error("{node} has not been initialized")]
    Uninitialized { node: &'static str },

    /// Zero channels or a zero sample rate.
    #[error("invalid format: {channels} channels at {sample_rate} Hz")]
    InvalidFormat { channels: u8, sample_rate: u32 },

    /// The upstream node does not produce the channel count the consumer expects.
    #[error("input node has {found} channels, expected {expected}")]
    ChannelMismatch { expected: u8, found: u8 },

    /// The upstream node runs at a different sample rate.
    #[error("input node runs at {found} Hz, expected {expected} Hz")]
    RateMismatch { expected: u32, found: u32 },

    /// Attaching the node would make the consumer its own upstream.
    #[error("attaching {node} would create a cycle")]
    Cycle { node: &'static str },

    /// The input field of a panner cannot change while a node is attached.
    #[error("cannot change the input field while a node is attached")]
    FieldLocked,

    /// Sample data whose length is not a whole number of frames.
    #[error("{samples} samples do not divide into frames of {channels} channels")]
    InvalidSample { samples: usize, channels: u8 },

    #[cfg(feature = "cpal_sink")]
    #[error("no audio output device available")]
    NoDevice,

    #[cfg(feature = "cpal_sink")]
    #[error("failed to query the default output config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[cfg(feature = "cpal_sink")]
    #[error("failed to build output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[cfg(feature = "cpal_sink")]
    #[error("failed to start output stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[cfg(feature = "cpal_sink")]
    #[error("failed to pause output stream: {0}")]
    PauseStream(#[from] cpal::PauseStreamError),
}
