//! TCP ingestion scenarios: inbound peers coming and going, and the forced
//! reconnect contract of the outbound client.

use std::io::Write;
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use framefeed::{
    frame_queue, FrameAssembler, FrameParameters, FrameRate, IngestWorker, PixelFormat,
    TcpClientSource, TcpServerSource,
};

fn params_1x1() -> FrameParameters {
    FrameParameters {
        width: 1,
        height: 1,
        pixel_format: PixelFormat::Rgb,
    }
}

#[test]
fn server_source_survives_peer_disconnects() {
    // Ephemeral port; the private-queue topology wires the worker by hand.
    let source = TcpServerSource::new("127.0.0.1", 0).expect("bind");
    let addr = source.local_addr().expect("addr");

    let (producer, consumer) = frame_queue(4);
    let stop = Arc::new(AtomicBool::new(false));
    let assembler = FrameAssembler::new(params_1x1(), FrameRate::default());
    let worker = IngestWorker::new("cam", Box::new(source), assembler, producer, stop.clone());
    let mut handle = worker.spawn().expect("spawn");

    // First peer sends exactly one 3-byte frame and closes.
    {
        let mut peer = TcpStream::connect(addr).expect("dial");
        peer.write_all(&[1, 2, 3]).expect("send");
    }
    let frame = consumer.pop().expect("first frame");
    assert_eq!(frame.sequence(), 0);
    assert_eq!(frame.data(), &[1, 2, 3]);

    // The worker detected the disconnect and went back to accepting; a new
    // peer keeps the same sequence counter going.
    {
        let mut peer = TcpStream::connect(addr).expect("dial again");
        peer.write_all(&[4, 5, 6]).expect("send");
    }
    let frame = consumer.pop().expect("second frame");
    assert_eq!(frame.sequence(), 1);
    assert_eq!(frame.data(), &[4, 5, 6]);

    stop.store(true, Ordering::SeqCst);
    while consumer.pop().is_some() {}
    handle.join();
}

#[test]
fn server_source_drops_partial_frames_at_disconnect() {
    let source = TcpServerSource::new("127.0.0.1", 0).expect("bind");
    let addr = source.local_addr().expect("addr");

    let (producer, consumer) = frame_queue(4);
    let stop = Arc::new(AtomicBool::new(false));
    // 2x1 RGB: 6 bytes per frame.
    let assembler = FrameAssembler::new(
        FrameParameters {
            width: 2,
            height: 1,
            pixel_format: PixelFormat::Rgb,
        },
        FrameRate::default(),
    );
    let worker = IngestWorker::new("cam", Box::new(source), assembler, producer, stop.clone());
    let mut handle = worker.spawn().expect("spawn");

    // 9 bytes = one full frame plus half of the next; the partial half must
    // be discarded, not delivered.
    {
        let mut peer = TcpStream::connect(addr).expect("dial");
        peer.write_all(&[1, 2, 3, 4, 5, 6, 7, 8, 9]).expect("send");
    }
    let frame = consumer.pop().expect("full frame");
    assert_eq!(frame.sequence(), 0);
    assert_eq!(frame.data(), &[1, 2, 3, 4, 5, 6]);

    // A fresh peer sends a clean frame; the sequence shows nothing was
    // delivered in between.
    {
        let mut peer = TcpStream::connect(addr).expect("dial again");
        peer.write_all(&[10, 11, 12, 13, 14, 15]).expect("send");
    }
    let frame = consumer.pop().expect("next frame");
    assert_eq!(frame.sequence(), 1);
    assert_eq!(frame.data(), &[10, 11, 12, 13, 14, 15]);

    stop.store(true, Ordering::SeqCst);
    while consumer.pop().is_some() {}
    handle.join();
}

#[test]
fn client_source_reads_frames_from_a_listener() {
    use framefeed::FrameSource;

    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");

    let sender = std::thread::spawn(move || {
        let (mut peer, _) = listener.accept().expect("accept");
        peer.write_all(&[7, 8, 9, 10, 11, 12]).expect("send");
    });

    let mut source = TcpClientSource::new("127.0.0.1", addr.port());
    assert!(source.connect());

    let mut assembler = FrameAssembler::new(params_1x1(), FrameRate::new(10, 1));
    let first = assembler.next_frame(&mut source).expect("frame");
    assert_eq!(first.data(), &[7, 8, 9]);
    let second = assembler.next_frame(&mut source).expect("frame");
    assert_eq!(second.data(), &[10, 11, 12]);
    assert_eq!(
        second.timestamp(),
        std::time::Duration::from_millis(100)
    );

    sender.join().expect("sender thread");

    // Listener side closed: the next attempt is a short read and the source
    // reports disconnected, not finished.
    assert!(assembler.next_frame(&mut source).is_none());
    assert!(!source.is_connected());
    assert!(!source.is_finished());
}
