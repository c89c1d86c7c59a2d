use strom::nodes::StreamSource;
use strom::AudioNode;

const RATE: u32 = 10;

#[test]
fn underruns_are_padded_and_counted() {
    let (stream, mut producer) = StreamSource::alloc(2, RATE, 16).unwrap();
    for sample in [0.1, 0.2, 0.3, 0.4, 0.5, 0.6] {
        producer.push(sample).unwrap();
    }

    let mut buffer = [9.0; 8];
    assert_eq!(stream.read(&mut buffer, 4), 4);
    assert_eq!(buffer, [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.0, 0.0]);
    assert_eq!(stream.underruns(), 1);
    assert!(!stream.completed());
}

#[test]
fn closed_stream_drains_then_completes() {
    let (stream, mut producer) = StreamSource::alloc(1, RATE, 8).unwrap();
    producer.push(0.5).unwrap();
    producer.push(0.25).unwrap();
    stream.close();

    let mut buffer = [0.0; 4];
    assert_eq!(stream.read(&mut buffer, 4), 2);
    assert_eq!(buffer, [0.5, 0.25, 0.0, 0.0]);
    assert!(!stream.completed());

    assert_eq!(stream.read(&mut buffer, 4), 0);
    assert!(stream.completed());
    assert_eq!(stream.underruns(), 0);
}

#[test]
fn dropped_producer_closes_the_stream() {
    let (stream, producer) = StreamSource::alloc(1, RATE, 8).unwrap();
    drop(producer);

    let mut buffer = [0.0; 4];
    assert_eq!(stream.read(&mut buffer, 4), 0);
    assert!(stream.completed());
}

#[test]
fn times_out_after_remaining() {
    let (stream, _producer) = StreamSource::alloc(1, RATE, 8).unwrap();
    assert_eq!(stream.remaining(), None);
    assert_eq!(stream.set_remaining(0.5), Some(0.5));

    let mut buffer = [0.0; 3];
    assert_eq!(stream.read(&mut buffer, 3), 3);
    assert_eq!(stream.read(&mut buffer, 3), 2);
    assert_eq!(stream.remaining(), Some(0.0));
    assert!(stream.completed());
    assert_eq!(stream.read(&mut buffer, 3), 0);
}

#[test]
fn positions_count_from_the_mark() {
    let (stream, _producer) = StreamSource::alloc(1, RATE, 8).unwrap();
    let mut buffer = [0.0; 4];
    stream.read(&mut buffer, 2);
    assert_eq!(stream.position(), None);
    assert_eq!(stream.elapsed(), None);

    assert!(stream.mark());
    stream.read(&mut buffer, 4);
    assert_eq!(stream.position(), Some(4));
    assert_eq!(stream.elapsed(), Some(0.4));

    assert!(stream.unmark());
    assert_eq!(stream.position(), None);
    assert!(!stream.reset());
    assert_eq!(stream.set_position(0), None);
    assert_eq!(stream.advance(1), None);
}

#[test]
fn paused_stream_keeps_its_data() {
    let (stream, mut producer) = StreamSource::alloc(1, RATE, 8).unwrap();
    producer.push(0.5).unwrap();
    producer.push(0.75).unwrap();

    stream.pause();
    let mut buffer = [1.0; 2];
    assert_eq!(stream.read(&mut buffer, 2), 2);
    assert_eq!(buffer, [0.0; 2]);

    stream.resume();
    assert_eq!(stream.read(&mut buffer, 2), 2);
    assert_eq!(buffer, [0.5, 0.75]);
}

#[test]
fn feeds_from_another_thread() {
    let (stream, mut producer) = StreamSource::alloc(1, RATE, 64).unwrap();
    let writer = std::thread::spawn(move || {
        for i in 0..32 {
            while producer.push(i as f32).is_err() {
                std::thread::yield_now();
            }
        }
    });
    writer.join().unwrap();
    stream.close();

    let mut received = Vec::new();
    let mut buffer = [0.0; 5];
    loop {
        let frames = stream.read(&mut buffer, 5);
        if frames == 0 {
            break;
        }
        received.extend_from_slice(&buffer[..frames]);
    }
    assert_eq!(received, (0..32).map(|i| i as f32).collect::<Vec<_>>());
}
