mod common;

use common::{player, RATE};
use proptest::collection::vec;
use proptest::prelude::*;
use strom::nodes::Panner;
use strom::{AudioNode, SharedNode};

fn mono_to_stereo() -> std::sync::Arc<Panner> {
    let panner = Panner::alloc(2, 1, RATE).unwrap();
    panner.set_gain(0, 0, 0.0);
    panner
}

proptest! {
    #[test]
    fn identity_is_bit_exact(samples in vec(-1.0f32..1.0, 2..128)) {
        let frames = samples.len() / 2;
        let samples = &samples[..frames * 2];

        let panner = Panner::alloc(2, 2, RATE).unwrap();
        panner.attach(player(samples, 2) as SharedNode).unwrap();
        let direct = player(samples, 2);

        let mut expected = vec![0.0; samples.len()];
        let mut actual = vec![0.0; samples.len()];
        prop_assert_eq!(panner.read(&mut actual, frames), direct.read(&mut expected, frames));
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn single_gain_scales_its_channel(
        samples in vec(-1.0f32..1.0, 1..64),
        gain in -2.0f32..2.0,
        channel in 0usize..2,
    ) {
        let panner = mono_to_stereo();
        panner.set_gain(0, channel, gain);
        panner.attach(player(&samples, 1) as SharedNode).unwrap();

        let frames = samples.len();
        let mut buffer = vec![1.0; frames * 2];
        prop_assert_eq!(panner.read(&mut buffer, frames), frames);
        for (frame, sample) in buffer.chunks_exact(2).zip(&samples) {
            prop_assert_eq!(frame[channel], gain * sample);
            prop_assert_eq!(frame[1 - channel], 0.0);
        }
    }

    #[test]
    fn channels_superpose(
        frames in vec((-1.0f32..1.0, -1.0f32..1.0), 1..64),
        left in -2.0f32..2.0,
        right in -2.0f32..2.0,
    ) {
        let samples: Vec<f32> = frames.iter().flat_map(|&(a, b)| [a, b]).collect();
        let panner = Panner::alloc(1, 2, RATE).unwrap();
        panner.set_gain(0, 0, left);
        panner.set_gain(1, 0, right);
        panner.attach(player(&samples, 2) as SharedNode).unwrap();

        let mut buffer = vec![0.0; frames.len()];
        prop_assert_eq!(panner.read(&mut buffer, frames.len()), frames.len());
        for (&mixed, &(a, b)) in buffer.iter().zip(&frames) {
            prop_assert_eq!(mixed, left * a + right * b);
        }
    }

    #[test]
    fn short_upstream_truncates_read(
        available in 0usize..48,
        extra in 1usize..48,
        read_size in 1usize..16,
    ) {
        let samples: Vec<f32> = (0..available).map(|i| i as f32 + 1.0).collect();
        let panner = mono_to_stereo();
        panner.set_gain(0, 1, 1.0);
        panner.set_read_size(read_size);
        panner.attach(player(&samples, 1) as SharedNode).unwrap();

        let frames = available + extra;
        let mut buffer = vec![-1.0; frames * 2];
        prop_assert_eq!(panner.read(&mut buffer, frames), available);

        let (played, tail) = buffer.split_at(available * 2);
        for (frame, &sample) in played.chunks_exact(2).zip(&samples) {
            prop_assert_eq!(frame, &[0.0, sample][..]);
        }
        prop_assert!(tail.iter().all(|&s| s == 0.0));
    }
}
