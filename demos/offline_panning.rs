//! Example: render a graph offline, without an audio device
//!
//! Run with: cargo run --example offline_panning
//!
//! A mono tone is streamed in from a producer thread, panned from left to
//! right, and mixed with a quiet stereo bed. The per-channel level of every
//! tenth of a second is printed.

use std::thread;

use strom::nodes::{Mixer, Panner, Sine, StreamSource};
use strom::{AudioEngine, AudioNode, EngineConfig, SharedNode};

const RATE: u32 = 48_000;
const BLOCK: usize = 480;

fn rms(block: &[f32], channel: usize) -> f32 {
    let (sum, count) = block
        .iter()
        .skip(channel)
        .step_by(2)
        .fold((0.0, 0), |(sum, count), sample| (sum + sample * sample, count + 1));
    (sum / count.max(1) as f32).sqrt()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let engine = AudioEngine::new(EngineConfig::default().with_read_size(BLOCK))?;

    // Two seconds of a 330Hz tone, pushed by another thread.
    let (stream, mut producer) = StreamSource::alloc(1, RATE, 2 * RATE as usize)?;
    let feeder = thread::spawn(move || {
        for i in 0..2 * RATE {
            let sample = 0.5 * (i as f32 * 330.0 / RATE as f32 * std::f32::consts::TAU).sin();
            while producer.push(sample).is_err() {
                thread::yield_now();
            }
        }
    });

    let panner = Panner::alloc_with_input(2, stream.clone() as SharedNode)?;
    let bed = Sine::alloc(110.0, 2, RATE)?;
    bed.set_amplitude(0.05);

    let mixer = Mixer::alloc(2, 2, RATE)?;
    mixer.attach(0, panner.clone())?;
    mixer.attach(1, bed.clone())?;
    engine.attach(mixer as SharedNode)?;
    println!("graph: {}", engine.topology());

    feeder.join().map_err(|_| "feeder thread panicked")?;
    stream.close();

    let mut block = vec![0.0; 2 * BLOCK];
    let mut blocks = 0;
    while !stream.completed() {
        let position = (blocks as f32 / 200.0).min(1.0);
        panner.set_gain(0, 0, 1.0 - position);
        panner.set_gain(0, 1, position);

        engine.render(&mut block);
        if blocks % 10 == 0 {
            println!(
                "{:>5.2}s  left {:.3}  right {:.3}",
                blocks as f32 * BLOCK as f32 / RATE as f32,
                rms(&block, 0),
                rms(&block, 1)
            );
        }
        blocks += 1;
    }

    bed.shutdown();
    println!("rendered {} frames, {} underruns", engine.output().rendered_frames(), stream.underruns());
    Ok(())
}
