#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! Edge cases for the ByteBuffer codec: cursor invariants, failure atomicity
//! and the wire layouts other implementations depend on.

use bytes::Bytes;
use wire_transport::core::vle::MAX_VLE_BYTES;
use wire_transport::{ByteBuffer, TransportError};

// ============================================================================
// CURSOR INVARIANTS
// ============================================================================

#[test]
fn test_clear_resets_to_full_write_mode() {
    let mut buf = ByteBuffer::new(32);
    buf.put_slice(&[1; 10]).unwrap();
    buf.flip();
    buf.get_u8().unwrap();

    buf.clear();
    assert_eq!(buf.position(), 0);
    assert_eq!(buf.limit(), buf.capacity());
}

#[test]
fn test_flip_limits_to_previous_position() {
    let mut buf = ByteBuffer::new(32);
    buf.put_slice(&[1; 7]).unwrap();
    buf.flip();
    assert_eq!(buf.limit(), 7);
    assert_eq!(buf.position(), 0);
    assert_eq!(buf.remaining(), 7);
}

#[test]
fn test_wrap_uses_array_length_as_capacity() {
    let buf = ByteBuffer::wrap(vec![9; 5]);
    assert_eq!(buf.capacity(), 5);
    assert_eq!(buf.remaining(), 5);
    assert_eq!(buf.as_slice(), &[9; 5]);
}

#[test]
fn test_from_slice_copies() {
    let source = [1u8, 2, 3];
    let mut buf = ByteBuffer::from(&source[..]);
    buf.set_position(1).unwrap();
    assert_eq!(buf.to_bytes(), Bytes::from_static(&[2, 3]));
    assert_eq!(buf.into_inner(), vec![1, 2, 3]);
}

// ============================================================================
// OVERFLOW / UNDERFLOW
// ============================================================================

#[test]
fn test_every_put_fails_when_full() {
    let mut buf = ByteBuffer::new(0);

    assert!(matches!(buf.put_u8(1), Err(TransportError::Overflow { .. })));
    assert!(matches!(buf.put_slice(&[1]), Err(TransportError::Overflow { .. })));
    assert!(matches!(buf.put_u16(1), Err(TransportError::Overflow { .. })));
    assert!(matches!(buf.put_vle(0), Err(TransportError::Overflow { .. })));
    assert!(matches!(buf.put_string(""), Err(TransportError::Overflow { .. })));
    assert!(matches!(buf.put_byte_array(&[]), Err(TransportError::Overflow { .. })));
    assert!(matches!(
        buf.put_string_array::<&str>(&[]),
        Err(TransportError::Overflow { .. })
    ));
    assert_eq!(buf.position(), 0);
}

#[test]
fn test_every_get_fails_when_empty() {
    let mut buf = ByteBuffer::new(8);
    buf.flip();

    assert!(matches!(buf.get_u8(), Err(TransportError::Underflow { .. })));
    assert!(matches!(buf.get_bytes(1), Err(TransportError::Underflow { .. })));
    assert!(matches!(buf.get_u16(), Err(TransportError::Underflow { .. })));
    assert!(matches!(buf.get_vle(), Err(TransportError::Underflow { .. })));
    assert!(matches!(buf.get_string(), Err(TransportError::Underflow { .. })));
    assert!(matches!(buf.get_byte_array(), Err(TransportError::Underflow { .. })));
    assert!(matches!(buf.get_string_array(), Err(TransportError::Underflow { .. })));
    assert_eq!(buf.position(), 0);
}

#[test]
fn test_get_bytes_zero_on_empty_buffer() {
    let mut buf = ByteBuffer::new(0);
    assert!(buf.get_bytes(0).unwrap().is_empty());
}

#[test]
fn test_reads_stop_at_limit_not_capacity() {
    let mut buf = ByteBuffer::new(16);
    buf.put_u8(1).unwrap();
    buf.flip();
    buf.get_u8().unwrap();
    // storage beyond the limit is zeroes but must not be readable
    assert!(buf.get_u8().is_err());
}

// ============================================================================
// WIRE LAYOUT
// ============================================================================

#[test]
fn test_string_layout() {
    let mut buf = ByteBuffer::new(16);
    buf.put_string("abc").unwrap();
    buf.flip();
    assert_eq!(buf.as_slice(), &[0x03, b'a', b'b', b'c']);
}

#[test]
fn test_long_string_uses_two_byte_prefix() {
    let text = "x".repeat(200);
    let mut buf = ByteBuffer::new(256);
    buf.put_string(&text).unwrap();
    buf.flip();

    assert_eq!(&buf.as_slice()[..2], &[0xc8, 0x01]);
    assert_eq!(buf.remaining(), 202);
    assert_eq!(buf.get_string().unwrap(), text);
}

#[test]
fn test_string_array_layout() {
    let mut buf = ByteBuffer::new(16);
    buf.put_string_array(&["hi", ""]).unwrap();
    buf.flip();
    assert_eq!(buf.as_slice(), &[0x02, 0x02, b'h', b'i', 0x00]);
}

#[test]
fn test_mixed_message_roundtrip() {
    let mut buf = ByteBuffer::new(128);
    buf.put_u8(0xfe)
        .unwrap()
        .put_u16(0xbeef)
        .unwrap()
        .put_vle(1_000_000)
        .unwrap()
        .put_string("日本語")
        .unwrap()
        .put_byte_array(&[0, 1, 2])
        .unwrap()
        .put_string_array(&["héllo", "wörld"])
        .unwrap();
    buf.flip();

    assert_eq!(buf.get_u8().unwrap(), 0xfe);
    assert_eq!(buf.get_u16().unwrap(), 0xbeef);
    assert_eq!(buf.get_vle().unwrap(), 1_000_000);
    assert_eq!(buf.get_string().unwrap(), "日本語");
    assert_eq!(buf.get_byte_array().unwrap(), vec![0, 1, 2]);
    assert_eq!(buf.get_string_array().unwrap(), vec!["héllo", "wörld"]);
    assert!(!buf.has_remaining());
}

#[test]
fn test_non_ascii_bytes_preserved() {
    let text = "héllo";
    let mut buf = ByteBuffer::new(16);
    buf.put_string(text).unwrap();
    buf.flip();

    assert_eq!(buf.get_u8().unwrap() as usize, text.len());
    assert_eq!(buf.as_slice(), text.as_bytes());
}

// ============================================================================
// MALFORMED INPUT
// ============================================================================

#[test]
fn test_vle_at_max_length_accepted() {
    let mut bytes = vec![0xff; MAX_VLE_BYTES - 1];
    bytes.push(0x01);
    let mut buf = ByteBuffer::wrap(bytes);
    assert_eq!(buf.get_vle().unwrap(), u64::MAX);
}

#[test]
fn test_vle_past_max_length_rejected() {
    let mut buf = ByteBuffer::wrap(vec![0xff; 64]);
    assert!(matches!(buf.get_vle(), Err(TransportError::InvalidFormat(_))));
    assert_eq!(buf.position(), 0);
}

#[test]
fn test_unterminated_vle_underflows() {
    let mut buf = ByteBuffer::wrap(vec![0x80; MAX_VLE_BYTES - 1]);
    assert!(matches!(buf.get_vle(), Err(TransportError::Underflow { .. })));
    assert_eq!(buf.position(), 0);
}

#[test]
fn test_huge_string_length_underflows() {
    // claims u64::MAX bytes follow
    let mut bytes = vec![0xff; MAX_VLE_BYTES - 1];
    bytes.push(0x01);
    bytes.extend_from_slice(b"tiny");
    let mut buf = ByteBuffer::wrap(bytes);

    assert!(buf.get_string().is_err());
    assert_eq!(buf.position(), 0);
}

#[test]
fn test_huge_array_count_does_not_allocate_wildly() {
    let mut buf = ByteBuffer::new(16);
    buf.put_vle(u32::MAX as u64).unwrap();
    buf.put_string("only").unwrap();
    buf.flip();

    assert!(matches!(
        buf.get_string_array(),
        Err(TransportError::Underflow { .. })
    ));
    assert_eq!(buf.position(), 0);
}

#[test]
fn test_invalid_utf8_in_array_rewinds_whole_array() {
    let mut buf = ByteBuffer::new(16);
    buf.put_vle(2).unwrap();
    buf.put_string("ok").unwrap();
    buf.put_byte_array(&[0xff, 0xfe]).unwrap();
    buf.flip();

    assert!(matches!(
        buf.get_string_array(),
        Err(TransportError::InvalidFormat(_))
    ));
    assert_eq!(buf.position(), 0);
}
