mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use common::{Constant, RATE};
use strom::nodes::{Mixer, Panner};
use strom::{AudioNode, NodeCore, SharedNode};

/// Mono source of ones whose reads hold until released.
struct Stalled {
    core: NodeCore,
    entered: AtomicBool,
    release: AtomicBool,
}

impl Stalled {
    fn alloc() -> Arc<Self> {
        let mut core = NodeCore::new("Stalled");
        core.init(1, RATE).unwrap();
        Arc::new(Self {
            core,
            entered: AtomicBool::new(false),
            release: AtomicBool::new(false),
        })
    }
}

impl AudioNode for Stalled {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn read(&self, buffer: &mut [f32], frames: usize) -> usize {
        let out = self.core.frames_mut(buffer, frames);
        self.entered.store(true, Ordering::SeqCst);
        let start = Instant::now();
        while !self.release.load(Ordering::SeqCst) && start.elapsed() < Duration::from_secs(2) {
            thread::sleep(Duration::from_millis(1));
        }
        out.fill(1.0);
        frames
    }

    fn completed(&self) -> bool {
        false
    }
}

#[test]
fn set_read_size_does_not_wait_for_a_read_in_progress() {
    let source = Stalled::alloc();
    let panner = Panner::alloc(2, 1, RATE).unwrap();
    panner.set_gain(0, 1, 0.5);
    panner.attach(source.clone() as SharedNode).unwrap();

    thread::scope(|scope| {
        let reader = scope.spawn(|| {
            let mut buffer = vec![0.0; 2 * 256];
            let frames = panner.read(&mut buffer, 256);
            (frames, buffer)
        });

        while !source.entered.load(Ordering::SeqCst) {
            thread::yield_now();
        }
        let started = Instant::now();
        panner.set_read_size(128);
        let waited = started.elapsed();
        source.release.store(true, Ordering::SeqCst);
        assert!(waited < Duration::from_millis(500), "set_read_size waited {waited:?}");

        // The read in flight finishes on the old buffer and is not dropped.
        let (frames, buffer) = reader.join().unwrap();
        assert_eq!(frames, 256);
        assert!(buffer.chunks_exact(2).all(|frame| frame == [1.0, 0.5]));
    });

    assert_eq!(source.read_size(), 128);
    let mut buffer = vec![0.0; 2 * 256];
    assert_eq!(panner.read(&mut buffer, 256), 256);
    assert!(buffer.chunks_exact(2).all(|frame| frame == [1.0, 0.5]));
}

#[test]
fn rewiring_while_reading() {
    common::init_tracing();
    let panner = Panner::alloc(2, 1, RATE).unwrap();
    let sources: Vec<SharedNode> = vec![Constant::alloc(0.5, 1) as SharedNode, Constant::alloc(1.0, 1) as SharedNode];

    // Stays wired to a live source with a non-zero left gain, so every block must carry signal.
    let steady = Panner::alloc(2, 1, RATE).unwrap();
    steady.attach(Constant::alloc(1.0, 1) as SharedNode).unwrap();
    steady.set_gain(0, 1, 0.0);
    let done = AtomicBool::new(false);

    thread::scope(|scope| {
        let reader = scope.spawn(|| {
            let mut buffer = vec![0.0; 2 * 128];
            let mut blocks = 0;
            while !done.load(Ordering::Relaxed) || blocks < 2_000 {
                assert_eq!(panner.read(&mut buffer, 128), 128);
                assert!(buffer.iter().all(|&s| (0.0..=1.0).contains(&s)));

                assert_eq!(steady.read(&mut buffer, 128), 128);
                for frame in buffer.chunks_exact(2) {
                    assert!(frame[0] == 0.5 || frame[0] == 1.0, "silent block at {blocks}");
                    assert_eq!(frame[1], 0.0);
                }
                blocks += 1;
            }
            blocks
        });

        for round in 0..2_000 {
            let source = &sources[(round / 4) % sources.len()];
            match round % 4 {
                0 => panner.attach(source.clone()).unwrap(),
                1 => panner.set_gain(0, round % 2, (round % 10) as f32 / 10.0),
                2 => panner.set_read_size(if round % 8 == 2 { 32 } else { 256 }),
                _ => {
                    panner.detach();
                }
            }
            steady.set_read_size(if round % 2 == 0 { 16 } else { 256 });
            steady.set_gain(0, 0, if round % 3 == 0 { 0.5 } else { 1.0 });
        }
        done.store(true, Ordering::Relaxed);
        assert!(reader.join().unwrap() >= 2_000);
    });

    panner.attach(None).unwrap();
    for source in &sources {
        assert_eq!(std::sync::Arc::strong_count(source), 1);
    }
}

#[test]
fn mixer_slots_swap_while_reading() {
    let mixer = Mixer::alloc(2, 2, RATE).unwrap();
    let quiet: SharedNode = Constant::alloc(0.25, 2);
    let loud: SharedNode = Constant::alloc(0.5, 2);
    let done = AtomicBool::new(false);

    thread::scope(|scope| {
        scope.spawn(|| {
            let mut buffer = vec![0.0; 2 * 64];
            while !done.load(Ordering::Relaxed) {
                assert_eq!(mixer.read(&mut buffer, 64), 64);
                for frame in buffer.chunks_exact(2) {
                    assert_eq!(frame[0], frame[1]);
                    assert!([0.0, 0.25, 0.5, 0.75, 1.0].contains(&frame[0]));
                }
            }
        });

        for round in 0..5_000 {
            let slot = round % 2;
            if round % 3 == 0 {
                mixer.detach(slot);
            } else {
                let node = if round % 5 == 0 { &loud } else { &quiet };
                mixer.attach(slot, node.clone()).unwrap();
            }
        }
        done.store(true, Ordering::Relaxed);
    });
}
