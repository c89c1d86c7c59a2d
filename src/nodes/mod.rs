//! Built-in audio nodes.
//!
//! Nodes are organized into three categories:
//!
//! ## Sources ([`source`])
//!
//! Produce audio with no upstream:
//! - [`Sine`] - Sine wave oscillator with frequency/amplitude control
//! - [`SamplePlayer`] - Play in-memory samples, with full transport support
//! - [`StreamSource`] - Play samples pushed from another thread through a ring buffer
//!
//! ## Effects ([`effect`])
//!
//! Transform the audio of their inputs:
//! - [`Panner`] - Remap channels through a gain matrix
//! - [`Mixer`] - Sum several inputs together
//!
//! ## Sinks ([`sink`])
//!
//! End a graph:
//! - [`AudioOutput`] - Terminal node rendered by the device callback or [`AudioEngine`](crate::AudioEngine)
//!
//! Every node is allocated initialized through its `alloc` constructor and
//! shared as a [`SharedNode`](crate::SharedNode).

pub mod source;
pub mod effect;
pub mod sink;

pub use source::{SamplePlayer, Sine, StreamSource};
pub use effect::{Mixer, Panner};
pub use sink::AudioOutput;
