use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use rolling_logger::{AsyncPipeline, LogError};

fn collecting_pipeline(capacity: usize, check_space: bool) -> (AsyncPipeline, Arc<Mutex<Vec<u8>>>) {
    let data = Arc::new(Mutex::new(Vec::new()));
    let sink_data = Arc::clone(&data);
    let pipeline = AsyncPipeline::with_capacity(capacity, check_space, move |bytes| {
        sink_data.lock().unwrap().extend_from_slice(bytes);
    });
    (pipeline, data)
}

#[test]
fn test_single_producer_round_trip() {
    let (pipeline, data) = collecting_pipeline(1024, true);
    pipeline.submit(b"one;").unwrap();
    pipeline.submit(b"two;").unwrap();
    pipeline.submit(b"three;").unwrap();
    pipeline.stop();

    let data = data.lock().unwrap();
    assert_eq!(&data[..], b"one;two;three;", "append order must survive delivery");
}

#[test]
fn test_concurrent_producers_deliver_everything_exactly_once() {
    const PRODUCERS: usize = 8;
    const RECORDS: usize = 200;

    let (pipeline, data) = collecting_pipeline(4096, true);
    let pipeline = Arc::new(pipeline);

    let mut handles = Vec::new();
    for p in 0..PRODUCERS {
        let pipeline = Arc::clone(&pipeline);
        handles.push(thread::spawn(move || {
            for r in 0..RECORDS {
                let line = format!("p{p:02}r{r:04};");
                pipeline.submit(line.as_bytes()).unwrap();
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }
    pipeline.stop();

    let data = data.lock().unwrap();
    let stream = String::from_utf8(data.clone()).unwrap();
    let entries: Vec<&str> = stream.split_terminator(';').collect();
    assert_eq!(
        entries.len(),
        PRODUCERS * RECORDS,
        "every submission must be delivered exactly once"
    );

    // Each producer's own records must appear in its submission order.
    for p in 0..PRODUCERS {
        let prefix = format!("p{p:02}");
        let ranks: Vec<usize> = entries
            .iter()
            .filter(|e| e.starts_with(&prefix))
            .map(|e| e[4..].parse().unwrap())
            .collect();
        assert_eq!(ranks.len(), RECORDS);
        for (expected, got) in ranks.iter().enumerate() {
            assert_eq!(*got, expected, "producer {p} records out of order");
        }
    }
}

#[test]
fn test_submit_after_stop_is_rejected() {
    let (pipeline, data) = collecting_pipeline(1024, true);
    pipeline.submit(b"kept;").unwrap();
    pipeline.stop();

    let err = pipeline.submit(b"dropped;").unwrap_err();
    assert!(matches!(err, LogError::PipelineStopped), "got: {err}");
    assert_eq!(&data.lock().unwrap()[..], b"kept;");
}

#[test]
fn test_stop_is_idempotent() {
    let (pipeline, _data) = collecting_pipeline(1024, true);
    pipeline.stop();
    pipeline.stop();
    assert!(!pipeline.is_running());
}

#[test]
fn test_drop_drains_pending_data() {
    let data = Arc::new(Mutex::new(Vec::new()));
    {
        let sink_data = Arc::clone(&data);
        let pipeline = AsyncPipeline::with_capacity(1024, true, move |bytes| {
            // Slow sink: without the drain guarantee the drop would race
            // ahead of this write.
            thread::sleep(Duration::from_millis(20));
            sink_data.lock().unwrap().extend_from_slice(bytes);
        });
        for i in 0..10 {
            pipeline.submit(format!("r{i};").as_bytes()).unwrap();
        }
    }
    let data = data.lock().unwrap();
    let count = data.iter().filter(|&&b| b == b';').count();
    assert_eq!(count, 10, "drop must deliver all accepted records");
}

#[test]
fn test_backpressure_bounds_batch_size() {
    const CAPACITY: usize = 64;
    let max_batch = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&max_batch);
    let pipeline = AsyncPipeline::with_capacity(CAPACITY, true, move |bytes| {
        seen.fetch_max(bytes.len(), Ordering::SeqCst);
        thread::sleep(Duration::from_millis(1));
    });

    for _ in 0..200 {
        pipeline.submit(&[b'x'; 16]).unwrap();
    }
    pipeline.stop();

    assert!(
        max_batch.load(Ordering::SeqCst) <= CAPACITY,
        "with backpressure the inbound buffer must never grow past its capacity"
    );
}

#[test]
fn test_unbounded_mode_accepts_more_than_capacity() {
    let (pipeline, data) = collecting_pipeline(16, false);
    // 10 x 8 bytes with nothing draining fast enough would overflow a
    // 16-byte buffer; without backpressure it grows instead.
    for i in 0..10 {
        pipeline.submit(format!("grow{i:03};").as_bytes()).unwrap();
    }
    pipeline.stop();
    let data = data.lock().unwrap();
    assert_eq!(data.iter().filter(|&&b| b == b';').count(), 10);
}

#[test]
fn test_producer_blocked_on_backpressure_errors_at_shutdown() {
    let (pipeline, data) = collecting_pipeline(16, true);
    let pipeline = Arc::new(pipeline);

    // Occupy the worker with a slow delivery so the inbound buffer stays
    // full long enough for the second producer to block.
    let gate = Arc::new(Mutex::new(()));
    let held = gate.lock().unwrap();
    let slow_gate = Arc::clone(&gate);
    let slow = AsyncPipeline::with_capacity(16, true, move |_bytes| {
        drop(slow_gate.lock().unwrap());
    });
    slow.submit(&[b'a'; 10]).unwrap();
    // First slow submit is being delivered (blocked on the gate); this one
    // parks in the inbound buffer.
    slow.submit(&[b'b'; 10]).unwrap();

    let blocked = {
        let slow = &slow;
        thread::scope(|scope| {
            let handle = scope.spawn(|| slow.submit(&[b'c'; 10]));
            thread::sleep(Duration::from_millis(50));
            drop(held);
            slow.stop();
            handle.join().unwrap()
        })
    };
    match blocked {
        // Woken by the worker freeing space before the stop landed.
        Ok(()) => {}
        Err(err) => assert!(matches!(err, LogError::PipelineStopped), "got: {err}"),
    }

    // The unrelated pipeline still works.
    pipeline.submit(b"alive;").unwrap();
    pipeline.stop();
    assert_eq!(&data.lock().unwrap()[..], b"alive;");
}
