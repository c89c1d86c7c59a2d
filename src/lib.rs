//! # strom
//!
//! A pull-based audio graph for real-time playback.
//!
//! Every processing unit is an [`AudioNode`]: it produces interleaved `f32`
//! frames when its consumer calls [`read`](AudioNode::read). Graphs are built
//! by attaching nodes to the inputs of other nodes, ending at an
//! [`AudioOutput`](nodes::AudioOutput) that a device callback (or
//! [`AudioEngine::render`]) pulls from.
//!
//! Rewiring is lock-free. Inputs live in [`InputSlot`]s that the control
//! thread swaps atomically while the audio thread keeps reading, and the
//! audio thread never waits on the control thread: it loads each input once
//! per block, does not allocate and does not log.
//!
//! ## Quick start
//!
//! ```
//! use strom::{AudioEngine, EngineConfig, SharedNode};
//! use strom::nodes::{Panner, Sine};
//!
//! let engine = AudioEngine::new(EngineConfig::default()).unwrap();
//!
//! // A mono tone, panned hard left.
//! let tone: SharedNode = Sine::alloc(440.0, 1, 48_000).unwrap();
//! let panner = Panner::alloc_with_input(2, tone).unwrap();
//! panner.set_gain(0, 0, 1.0);
//! engine.attach(panner as SharedNode).unwrap();
//!
//! let mut block = vec![0.0; 2 * 256];
//! engine.render(&mut block);
//! assert!(block.chunks(2).all(|frame| frame[1] == 0.0));
//! ```
//!
//! ## Features
//!
//! - `cpal_sink` - play through a system audio device with [`CpalDevice`]
//!   and [`AudioEngine::start`].

extern crate alloc;

mod atomic;
mod claim;
mod engine;
mod error;
mod graph;
mod node;
mod sample;
mod scratch;
mod slot;

#[cfg(feature = "cpal_sink")]
mod device;

pub mod nodes;

pub use atomic::AtomicF32;
pub use engine::{AudioEngine, EngineConfig};
pub use error::{GraphError, Result};
pub use graph::{NodeInfo, Topology};
pub use node::{AudioNode, NodeCore, SharedNode, DEFAULT_CHANNELS, DEFAULT_READ_SIZE, DEFAULT_SAMPLE_RATE};
pub use sample::AudioSample;
pub use scratch::{Scratch, ScratchBuffer};
pub use slot::{InputSlot, SlotGuard};

#[cfg(feature = "cpal_sink")]
pub use device::CpalDevice;
