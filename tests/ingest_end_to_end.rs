//! End-to-end file ingestion: config file in, completed queue out.

use std::io::Write;

use tempfile::NamedTempFile;

use framefeed::{FeedConfig, SourceKind, Supervisor};

fn write_frame_file(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp frame file");
    file.write_all(bytes).expect("write frame bytes");
    file
}

#[test]
fn file_source_yields_exactly_its_frames_then_completes() {
    // 2x1 RGB = 6 bytes per frame; 18 bytes = exactly 3 frames.
    let payload: Vec<u8> = (0u8..18).collect();
    let frame_file = write_frame_file(&payload);

    let toml = format!(
        r#"
        queue_capacity = 8

        [[source]]
        name = "replay"
        type = "file"
        width = 2
        height = 1
        pixel_format = "RGB"
        frame_rate = {{ numerator = 30, denominator = 1 }}

        [source.options]
        path = "{}"
        loop = "false"
        "#,
        frame_file.path().display()
    );
    let cfg = FeedConfig::from_toml_str(&toml).expect("config");
    assert_eq!(cfg.sources.len(), 1);
    assert_eq!(cfg.sources[0].kind, SourceKind::File);

    let (supervisor, consumer) = Supervisor::start(&cfg.sources, cfg.queue_capacity);
    assert_eq!(supervisor.worker_count(), 1);

    for expected_seq in 0..3u64 {
        let frame = consumer.pop().expect("frame");
        assert_eq!(frame.sequence(), expected_seq);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 1);
        let start = expected_seq as usize * 6;
        assert_eq!(frame.data(), &payload[start..start + 6]);
    }

    // Source exhausted: the queue completes once the worker is done, with
    // nothing buffered.
    assert!(consumer.pop().is_none());
    assert!(consumer.is_empty());
    supervisor.shutdown();
}

#[test]
fn looping_file_source_replays_from_the_start() {
    let payload: Vec<u8> = (0u8..6).collect();
    let frame_file = write_frame_file(&payload);

    let toml = format!(
        r#"
        [[source]]
        name = "replay"
        type = "file"
        width = 2
        height = 1

        [source.options]
        path = "{}"
        loop = "true"
        "#,
        frame_file.path().display()
    );
    let cfg = FeedConfig::from_toml_str(&toml).expect("config");

    let (supervisor, consumer) = Supervisor::start(&cfg.sources, 4);

    // One frame in the file, but the loop keeps replaying it with the
    // sequence still advancing.
    for expected_seq in 0..5u64 {
        let frame = consumer.pop().expect("frame");
        assert_eq!(frame.sequence(), expected_seq);
        assert_eq!(frame.data(), &payload[..]);
    }

    // Dropping the consumer unblocks a worker waiting on a full queue, so
    // shutdown cannot wedge on the join.
    drop(consumer);
    supervisor.shutdown();
}

#[test]
fn merged_queue_carries_frames_from_all_sources() {
    let file_a = write_frame_file(&[0xAA; 9]);
    let file_b = write_frame_file(&[0xBB; 9]);

    let toml = format!(
        r#"
        [[source]]
        name = "a"
        type = "file"
        width = 1
        height = 1

        [source.options]
        path = "{}"

        [[source]]
        name = "b"
        type = "file"
        width = 1
        height = 1

        [source.options]
        path = "{}"
        "#,
        file_a.path().display(),
        file_b.path().display()
    );
    let cfg = FeedConfig::from_toml_str(&toml).expect("config");

    let (supervisor, consumer) = Supervisor::start(&cfg.sources, 16);
    assert_eq!(supervisor.worker_count(), 2);

    // 3 frames per file. Cross-source interleaving is unspecified, but
    // per-source sequences stay gapless.
    let mut seen_a = Vec::new();
    let mut seen_b = Vec::new();
    while let Some(frame) = consumer.pop() {
        match frame.data()[0] {
            0xAA => seen_a.push(frame.sequence()),
            0xBB => seen_b.push(frame.sequence()),
            other => panic!("unexpected frame byte {:#x}", other),
        }
    }
    assert_eq!(seen_a, vec![0, 1, 2]);
    assert_eq!(seen_b, vec![0, 1, 2]);

    supervisor.shutdown();
}
