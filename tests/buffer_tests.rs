use rolling_logger::buffer::{Buffer, BUFFER_DEFAULT_SIZE};
use rolling_logger::LogError;

#[test]
fn test_round_trip_preserves_bytes_in_order() {
    let mut buf = Buffer::new();
    let chunks: Vec<Vec<u8>> = (0u8..50).map(|i| vec![i; (i as usize % 7) + 1]).collect();
    let mut expected = Vec::new();
    for chunk in &chunks {
        buf.push(chunk);
        expected.extend_from_slice(chunk);
    }

    assert_eq!(buf.readable_size(), expected.len());
    assert_eq!(buf.peek(), &expected[..], "read-back must equal appends in order");

    // Consume in uneven steps and re-check the remaining view each time.
    let mut offset = 0;
    for step in [1usize, 10, 3, 25] {
        buf.pop(step).unwrap();
        offset += step;
        assert_eq!(buf.peek(), &expected[offset..]);
    }
}

#[test]
fn test_pop_past_write_cursor_fails_without_mutating() {
    let mut buf = Buffer::new();
    buf.push(b"abcdef");
    buf.pop(2).unwrap();

    let err = buf.pop(5).unwrap_err();
    assert!(
        matches!(err, LogError::OutOfRange { requested: 5, readable: 4 }),
        "expected OutOfRange, got: {err}"
    );
    // Cursors untouched: the same 4 bytes are still readable.
    assert_eq!(buf.peek(), b"cdef");
    buf.pop(4).unwrap();
    assert!(buf.is_empty());
}

#[test]
fn test_reset_reuses_capacity() {
    let mut buf = Buffer::with_capacity(16);
    buf.push(&[b'x'; 100]);
    let grown = buf.capacity();
    assert!(grown >= 100, "append beyond capacity must grow storage");

    buf.reset();
    assert!(buf.is_empty());
    assert_eq!(buf.capacity(), grown, "reset must not deallocate");
    assert_eq!(buf.writable_size(), grown);

    buf.push(b"again");
    assert_eq!(buf.peek(), b"again");
}

#[test]
fn test_growth_doubles_below_threshold() {
    let mut buf = Buffer::with_capacity(8);
    buf.push(&[b'a'; 9]);
    // One doubling step: 8 -> 16.
    assert_eq!(buf.capacity(), 16);
    buf.push(&[b'b'; 20]);
    // 16 -> 32 -> 64 to fit 9 + 20 written bytes plus the pending 20.
    assert!(buf.capacity() >= 29);
    assert_eq!(buf.readable_size(), 29);
}

#[test]
fn test_swap_exchanges_contents_and_cursors() {
    let mut full = Buffer::new();
    let mut empty = Buffer::new();
    full.push(b"payload");
    full.pop(3).unwrap();

    full.swap(&mut empty);

    assert!(full.is_empty(), "producer side must come back empty");
    assert_eq!(full.writable_size(), BUFFER_DEFAULT_SIZE);
    assert_eq!(empty.peek(), b"load", "consumer side must see the remaining span");
    assert_eq!(empty.readable_size(), 4);
}

#[test]
fn test_swap_is_symmetric() {
    let mut a = Buffer::with_capacity(8);
    let mut b = Buffer::with_capacity(8);
    a.push(b"aa");
    b.push(b"bbbb");

    a.swap(&mut b);
    assert_eq!(a.peek(), b"bbbb");
    assert_eq!(b.peek(), b"aa");

    a.swap(&mut b);
    assert_eq!(a.peek(), b"aa");
    assert_eq!(b.peek(), b"bbbb");
}
