mod common;

use common::{player, Constant, RATE};
use strom::nodes::{AudioOutput, Panner, Sine};
use strom::{AudioNode, AudioSample, GraphError, SharedNode};

fn ramp(frames: usize) -> Vec<f32> {
    (0..frames).map(|i| i as f32).collect()
}

#[test]
fn player_seeks_and_reports_time() {
    let player = player(&ramp(48_000), 1);
    assert_eq!(player.frames(), 48_000);
    assert_eq!(player.duration(), 1.0);
    assert_eq!(player.position(), Some(0));

    assert_eq!(player.set_elapsed(0.5), Some(0.5));
    assert_eq!(player.position(), Some(24_000));
    assert_eq!(player.remaining(), Some(0.5));

    let mut buffer = [0.0; 2];
    assert_eq!(player.read(&mut buffer, 2), 2);
    assert_eq!(buffer, [24_000.0, 24_001.0]);
    assert_eq!(player.elapsed(), Some(24_002.0 / 48_000.0));

    assert_eq!(player.set_position(60_000), Some(48_000));
    assert!(player.completed());
    assert_eq!(player.read(&mut buffer, 2), 0);
}

#[test]
fn advance_stops_at_the_end() {
    let player = player(&ramp(10), 1);
    assert_eq!(player.advance(4), Some(4));
    assert_eq!(player.advance(10), Some(6));
    assert_eq!(player.advance(1), Some(0));
    assert_eq!(player.position(), Some(10));
}

#[test]
fn reset_returns_to_mark_or_start() {
    let player = player(&ramp(10), 1);
    player.advance(3);
    assert!(player.mark());
    player.advance(4);

    assert!(player.reset());
    assert_eq!(player.position(), Some(3));

    assert!(player.unmark());
    assert!(player.reset());
    assert_eq!(player.position(), Some(0));
}

#[test]
fn set_remaining_moves_the_end() {
    let player = player(&ramp(48_000), 1);
    player.advance(100);
    assert_eq!(player.set_remaining(0.001), Some(0.001));

    let mut buffer = vec![0.0; 64];
    assert_eq!(player.read(&mut buffer, 64), 48);
    assert_eq!(buffer[47], 147.0);
    assert!(player.completed());

    assert_eq!(player.set_remaining(10.0), Some(47_852.0 / 48_000.0));
    assert!(!player.completed());
}

#[test]
fn panner_and_output_delegate_to_their_input() {
    let source = player(&ramp(100), 1);
    let panner = Panner::alloc_with_input(2, source.clone() as SharedNode).unwrap();
    let output = AudioOutput::alloc(2, RATE).unwrap();
    output.attach(panner.clone() as SharedNode).unwrap();

    assert_eq!(output.set_position(40), Some(40));
    assert_eq!(source.position(), Some(40));
    assert_eq!(panner.position(), Some(40));

    assert!(output.mark());
    assert_eq!(output.advance(10), Some(10));
    assert!(panner.reset());
    assert_eq!(source.position(), Some(40));

    assert_eq!(output.remaining(), Some(60.0 / 48_000.0));
    assert!(output.unmark());
}

#[test]
fn unsupported_operations_return_sentinels() {
    let panner = Panner::alloc(1, 1, RATE).unwrap();
    assert!(!panner.mark());
    assert!(!panner.unmark());
    assert!(!panner.reset());
    assert_eq!(panner.advance(4), None);
    assert_eq!(panner.position(), None);
    assert_eq!(panner.set_position(4), None);
    assert_eq!(panner.elapsed(), None);
    assert_eq!(panner.set_elapsed(1.0), None);
    assert_eq!(panner.remaining(), None);
    assert_eq!(panner.set_remaining(1.0), None);

    panner.attach(Constant::alloc(0.5, 1) as SharedNode).unwrap();
    assert!(!panner.mark());
    assert_eq!(panner.position(), None);

    let sine: SharedNode = Sine::alloc(440.0, 1, RATE).unwrap();
    panner.attach(sine).unwrap();
    assert!(panner.reset());
    assert_eq!(panner.elapsed(), None);
}

#[test]
fn samples_share_their_data_with_players() {
    let sample = AudioSample::new(vec![0.5, -0.5, 0.25, -0.25], 2, RATE).unwrap();
    assert_eq!(sample.frames(), 2);
    assert_eq!(sample.duration(), 2.0 / 48_000.0);

    let first = sample.create_node().unwrap();
    let second = sample.create_node().unwrap();
    first.advance(1);

    let mut buffer = [0.0; 4];
    assert_eq!(second.read(&mut buffer, 2), 2);
    assert_eq!(buffer, [0.5, -0.5, 0.25, -0.25]);
    assert_eq!(first.read(&mut buffer, 2), 1);
    assert_eq!(buffer, [0.25, -0.25, 0.0, 0.0]);
}

#[test]
fn samples_must_hold_whole_frames() {
    assert!(matches!(
        AudioSample::new(vec![0.0; 3], 2, RATE),
        Err(GraphError::InvalidSample { samples: 3, channels: 2 })
    ));
    assert!(matches!(
        AudioSample::new(vec![0.0; 2], 0, RATE),
        Err(GraphError::InvalidFormat { .. })
    ));
}
