//! Simple example: play a sine wave with configurable output device
//!
//! Run with: cargo run --example simple_sine --features cpal_sink
//!
//! Lists available devices and lets you pick one, then plays a 440Hz sine
//! whose frequency drifts slowly for ten seconds.

use std::io::{self, Write};
use std::thread::sleep;
use std::time::{Duration, Instant};

use strom::nodes::Sine;
use strom::{AudioEngine, CpalDevice, SharedNode};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let devices = CpalDevice::list_outputs();
    if devices.is_empty() {
        eprintln!("No audio output devices found!");
        return Ok(());
    }

    println!("Available audio output devices:");
    for (i, device) in devices.iter().enumerate() {
        println!(
            "  [{}] {} ({}Hz, {} ch)",
            i,
            device.name(),
            device.sample_rate(),
            device.channels()
        );
    }

    print!("\nSelect device [0]: ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let choice: usize = input.trim().parse().unwrap_or(0);

    let device = match devices.into_iter().nth(choice) {
        Some(device) => device,
        None => {
            println!("Invalid choice, using default device");
            CpalDevice::default_output().ok_or("no default device")?
        }
    };
    println!("\nUsing: {} @ {}Hz", device.name(), device.sample_rate());

    let mut engine = AudioEngine::with_device(device)?;
    let sine = Sine::alloc(440.0, engine.channels(), engine.sample_rate())?;
    sine.set_amplitude(0.25);
    engine.attach(sine.clone() as SharedNode)?;
    engine.start()?;

    println!("Playing 440Hz sine wave for ten seconds...");
    let start = Instant::now();
    while start.elapsed() < Duration::from_secs(10) {
        let elapsed = start.elapsed().as_secs_f32();
        sine.set_frequency(440.0 + 220.0 * (elapsed * 0.5 * std::f32::consts::PI).sin());
        sleep(Duration::from_millis(10));
    }

    engine.stop()?;
    Ok(())
}
