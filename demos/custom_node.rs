//! Example: Creating a custom audio node
//!
//! This demonstrates how to implement the `AudioNode` trait for your own
//! oscillator, control it from the main thread through atomics, and pan it
//! around the stereo field.
//!
//! Run with: cargo run --example custom_node --features cpal_sink

use std::sync::Arc;
use std::thread::sleep;
use std::time::{Duration, Instant};

use strom::nodes::Panner;
use strom::{AtomicF32, AudioEngine, AudioNode, NodeCore, SharedNode};

/// A mono square wave oscillator with variable pulse width.
///
/// Parameters are atomics so the main thread can change them while the
/// audio thread reads. The phase is only touched by the audio thread.
pub struct Square {
    core: NodeCore,
    frequency: AtomicF32,
    pulse_width: AtomicF32,
    amplitude: AtomicF32,
    phase: AtomicF32,
}

impl Square {
    pub fn alloc(frequency: f32, sample_rate: u32) -> strom::Result<Arc<Self>> {
        let mut core = NodeCore::new("Square");
        core.init(1, sample_rate)?;
        Ok(Arc::new(Self {
            core,
            frequency: AtomicF32::new(frequency),
            pulse_width: AtomicF32::new(0.5),
            amplitude: AtomicF32::new(0.2),
            phase: AtomicF32::new(0.0),
        }))
    }

    pub fn set_pulse_width(&self, pulse_width: f32) {
        self.pulse_width.set(pulse_width.clamp(0.0, 1.0));
    }
}

impl AudioNode for Square {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn read(&self, buffer: &mut [f32], frames: usize) -> usize {
        let out = self.core.frames_mut(buffer, frames);
        if !self.core.is_active() {
            out.fill(0.0);
            return if self.core.is_booted() { frames } else { 0 };
        }

        let step = self.frequency.get() / self.core.sample_rate() as f32;
        let pulse_width = self.pulse_width.get();
        let amplitude = self.amplitude.get();
        let mut phase = self.phase.get();

        for sample in out.iter_mut() {
            *sample = if phase < pulse_width { amplitude } else { -amplitude };
            phase = (phase + step).fract();
        }

        self.phase.set(phase);
        frames
    }

    fn completed(&self) -> bool {
        false
    }

    fn reset(&self) -> bool {
        self.phase.set(0.0);
        true
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let mut engine = AudioEngine::default_output()?;
    println!("Playing at {} Hz on {} channels", engine.sample_rate(), engine.channels());

    let square = Square::alloc(220.0, engine.sample_rate())?;
    let panner = Panner::alloc_with_input(engine.channels(), square.clone() as SharedNode)?;
    engine.attach(panner.clone() as SharedNode)?;
    engine.start()?;

    // Sweep the pulse width and pan the square between the first two channels.
    let start = Instant::now();
    while start.elapsed() < Duration::from_secs(8) {
        let t = start.elapsed().as_secs_f32();
        square.set_pulse_width(0.5 + 0.4 * (t * 0.7).sin());

        let position = 0.5 + 0.5 * (t * 0.5 * std::f32::consts::PI).sin();
        panner.set_gain(0, 0, 1.0 - position);
        if panner.channels() > 1 {
            panner.set_gain(0, 1, position);
        }
        sleep(Duration::from_millis(10));
    }

    engine.stop()?;
    Ok(())
}
