use criterion::{black_box, criterion_group, criterion_main, Criterion};
use strom::nodes::{Mixer, Panner, Sine};
use strom::{AudioNode, SharedNode};

const RATE: u32 = 48_000;
const FRAMES: usize = 512;

pub fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("Sine.read()", |b| {
        let sine = Sine::alloc(440.0, 2, RATE).unwrap();
        let mut buffer = vec![0.0; 2 * FRAMES];
        b.iter(|| sine.read(black_box(&mut buffer), FRAMES))
    });

    c.bench_function("Panner.read() identity", |b| {
        let panner = Panner::alloc(2, 2, RATE).unwrap();
        panner.attach(Sine::alloc(440.0, 2, RATE).unwrap() as SharedNode).unwrap();
        let mut buffer = vec![0.0; 2 * FRAMES];
        b.iter(|| panner.read(black_box(&mut buffer), FRAMES))
    });

    c.bench_function("Panner.read() matrix", |b| {
        let panner = Panner::alloc(2, 2, RATE).unwrap();
        panner.set_gain(0, 1, 0.5);
        panner.set_gain(1, 0, 0.5);
        panner.attach(Sine::alloc(440.0, 2, RATE).unwrap() as SharedNode).unwrap();
        let mut buffer = vec![0.0; 2 * FRAMES];
        b.iter(|| panner.read(black_box(&mut buffer), FRAMES))
    });

    c.bench_function("Panner.read() mono to 5.1", |b| {
        let panner = Panner::alloc(6, 1, RATE).unwrap();
        for channel in 0..6 {
            panner.set_gain(0, channel, 0.4);
        }
        panner.attach(Sine::alloc(440.0, 1, RATE).unwrap() as SharedNode).unwrap();
        let mut buffer = vec![0.0; 6 * FRAMES];
        b.iter(|| panner.read(black_box(&mut buffer), FRAMES))
    });

    c.bench_function("Mixer.read() x4", |b| {
        let mixer = Mixer::alloc(4, 2, RATE).unwrap();
        for slot in 0..4 {
            mixer.attach(slot, Sine::alloc(110.0 * (slot + 1) as f32, 2, RATE).unwrap()).unwrap();
        }
        let mut buffer = vec![0.0; 2 * FRAMES];
        b.iter(|| mixer.read(black_box(&mut buffer), FRAMES))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
