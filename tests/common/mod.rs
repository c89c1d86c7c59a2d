#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use strom::nodes::SamplePlayer;
use strom::{AudioNode, NodeCore};

pub const RATE: u32 = 48_000;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Emits `value` on every channel, optionally for a limited number of frames.
pub struct Constant {
    core: NodeCore,
    value: f32,
    left: AtomicU64,
}

impl Constant {
    pub fn alloc(value: f32, channels: u8) -> Arc<Self> {
        Self::finite(value, channels, u64::MAX)
    }

    pub fn finite(value: f32, channels: u8, frames: u64) -> Arc<Self> {
        let mut core = NodeCore::new("Constant");
        core.init(channels, RATE).unwrap();
        Arc::new(Self {
            core,
            value,
            left: AtomicU64::new(frames),
        })
    }
}

impl AudioNode for Constant {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn read(&self, buffer: &mut [f32], frames: usize) -> usize {
        let out = self.core.frames_mut(buffer, frames);
        let left = self.left.load(Ordering::Relaxed);
        let amount = left.min(frames as u64) as usize;
        let split = amount * usize::from(self.core.channels());
        out[..split].fill(self.value);
        out[split..].fill(0.0);
        if left != u64::MAX {
            self.left.store(left - amount as u64, Ordering::Relaxed);
        }
        amount
    }

    fn completed(&self) -> bool {
        self.left.load(Ordering::Relaxed) == 0
    }
}

/// A player over `samples` at [`RATE`].
pub fn player(samples: &[f32], channels: u8) -> Arc<SamplePlayer> {
    SamplePlayer::alloc(samples.to_vec(), channels, RATE).unwrap()
}
