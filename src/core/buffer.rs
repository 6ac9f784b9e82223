//! # ByteBuffer
//!
//! Fixed-capacity byte container with a read/write cursor.
//!
//! ```text
//! 0 <= position <= limit <= capacity
//!
//! write mode (after clear):  [ written | free ..................... ]
//!                             0        position                    limit=capacity
//! read mode  (after flip):   [ unread ........ | ]
//!                             position=0        limit=old position
//! ```
//!
//! Every `put_*` and `get_*` either completes in full or fails without moving
//! the cursor. Nothing grows, wraps or truncates; size buffers for the
//! largest message they will carry.
//!
//! ## Usage
//! ```rust
//! use wire_transport::core::buffer::ByteBuffer;
//!
//! let mut buf = ByteBuffer::new(64);
//! buf.put_u16(7)?;
//! buf.put_string("héllo")?;
//! buf.flip();
//!
//! assert_eq!(buf.get_u16()?, 7);
//! assert_eq!(buf.get_string()?, "héllo");
//! assert_eq!(buf.remaining(), 0);
//! # Ok::<(), wire_transport::error::TransportError>(())
//! ```

use std::fmt;

use bytes::Bytes;

use super::vle::{self, MAX_VLE_BYTES};
use crate::error::{constants, Result, TransportError};

/// Cursor-tracked byte buffer. See the module docs for the cursor model.
pub struct ByteBuffer {
    storage: Box<[u8]>,
    position: usize,
    limit: usize,
}

impl ByteBuffer {
    /// Zero-filled buffer of `capacity` bytes, in write mode.
    pub fn new(capacity: usize) -> Self {
        Self::wrap(vec![0u8; capacity])
    }

    /// Take ownership of `bytes` as backing storage. Capacity is its length
    /// and the whole array is the active region.
    pub fn wrap(bytes: Vec<u8>) -> Self {
        let storage = bytes.into_boxed_slice();
        let limit = storage.len();
        Self {
            storage,
            position: 0,
            limit,
        }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline]
    pub fn limit(&self) -> usize {
        self.limit
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Bytes between position and limit.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.limit - self.position
    }

    #[inline]
    pub fn has_remaining(&self) -> bool {
        self.position < self.limit
    }

    /// Move the cursor. Fails with `Overflow` past the limit.
    pub fn set_position(&mut self, position: usize) -> Result<()> {
        if position > self.limit {
            return Err(TransportError::Overflow {
                needed: position - self.position,
                remaining: self.remaining(),
            });
        }
        self.position = position;
        Ok(())
    }

    /// Move the limit. Fails with `Overflow` past capacity; a cursor beyond
    /// the new limit is pulled back to it.
    pub fn set_limit(&mut self, limit: usize) -> Result<()> {
        if limit > self.capacity() {
            return Err(TransportError::Overflow {
                needed: limit,
                remaining: self.capacity(),
            });
        }
        self.limit = limit;
        if self.position > limit {
            self.position = limit;
        }
        Ok(())
    }

    /// Enter write mode over the whole storage.
    pub fn clear(&mut self) -> &mut Self {
        self.position = 0;
        self.limit = self.capacity();
        self
    }

    /// Turn the bytes written so far into the readable region.
    pub fn flip(&mut self) -> &mut Self {
        self.limit = self.position;
        self.position = 0;
        self
    }

    /// Skip `n` bytes of the active region.
    pub fn advance(&mut self, n: usize) -> Result<()> {
        self.ensure_writable(n)?;
        self.position += n;
        Ok(())
    }

    /// The active region `[position, limit)`.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.storage[self.position..self.limit]
    }

    /// Writable view of `[position, limit)`, handed to the OS on receive.
    /// Callers report how much they filled through [`ByteBuffer::advance`].
    #[inline]
    pub fn unused_mut(&mut self) -> &mut [u8] {
        &mut self.storage[self.position..self.limit]
    }

    /// Copy of the active region.
    pub fn to_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(self.as_slice())
    }

    /// Give back the backing storage, cursor discarded.
    pub fn into_inner(self) -> Vec<u8> {
        self.storage.into_vec()
    }

    // ---------------------------------------------------------------------
    // raw bytes
    // ---------------------------------------------------------------------

    pub fn put_u8(&mut self, byte: u8) -> Result<&mut Self> {
        self.ensure_writable(1)?;
        self.storage[self.position] = byte;
        self.position += 1;
        Ok(self)
    }

    pub fn get_u8(&mut self) -> Result<u8> {
        self.ensure_readable(1)?;
        let byte = self.storage[self.position];
        self.position += 1;
        Ok(byte)
    }

    /// Copy all of `bytes` in, or nothing.
    pub fn put_slice(&mut self, bytes: &[u8]) -> Result<&mut Self> {
        self.ensure_writable(bytes.len())?;
        let end = self.position + bytes.len();
        self.storage[self.position..end].copy_from_slice(bytes);
        self.position = end;
        Ok(self)
    }

    /// Read exactly `n` bytes, or nothing.
    pub fn get_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        self.ensure_readable(n)?;
        let end = self.position + n;
        let out = self.storage[self.position..end].to_vec();
        self.position = end;
        Ok(out)
    }

    // ---------------------------------------------------------------------
    // fixed-width integers
    // ---------------------------------------------------------------------

    /// Two bytes, little-endian.
    pub fn put_u16(&mut self, value: u16) -> Result<&mut Self> {
        self.put_slice(&value.to_le_bytes())
    }

    pub fn get_u16(&mut self) -> Result<u16> {
        self.ensure_readable(2)?;
        let p = self.position;
        let value = u16::from_le_bytes([self.storage[p], self.storage[p + 1]]);
        self.position += 2;
        Ok(value)
    }

    // ---------------------------------------------------------------------
    // variable-length encodings
    // ---------------------------------------------------------------------

    pub fn put_vle(&mut self, value: u64) -> Result<&mut Self> {
        let mut scratch = [0u8; MAX_VLE_BYTES];
        let n = vle::encode(value, &mut scratch);
        self.put_slice(&scratch[..n])
    }

    pub fn get_vle(&mut self) -> Result<u64> {
        let (value, consumed) = vle::decode(self.as_slice())?;
        self.position += consumed;
        Ok(value)
    }

    /// VLE length prefix followed by the raw bytes.
    pub fn put_byte_array(&mut self, bytes: &[u8]) -> Result<&mut Self> {
        self.ensure_writable(prefixed_len(bytes.len()))?;
        self.put_vle(bytes.len() as u64)?;
        self.put_slice(bytes)
    }

    pub fn get_byte_array(&mut self) -> Result<Vec<u8>> {
        let (len, header) = self.peek_length()?;
        self.position += header;
        self.get_bytes(len)
    }

    /// VLE byte length followed by UTF-8, no terminator.
    pub fn put_string(&mut self, s: &str) -> Result<&mut Self> {
        self.put_byte_array(s.as_bytes())
    }

    /// Fails with `InvalidFormat` if the payload is not UTF-8; the cursor is
    /// left before the length prefix in that case.
    pub fn get_string(&mut self) -> Result<String> {
        let (len, header) = self.peek_length()?;

        let start = self.position + header;
        let text = std::str::from_utf8(&self.storage[start..start + len])
            .map_err(|_| TransportError::InvalidFormat(constants::ERR_INVALID_UTF8.to_string()))?
            .to_owned();

        self.position = start + len;
        Ok(text)
    }

    /// VLE element count followed by each string.
    pub fn put_string_array<S: AsRef<str>>(&mut self, items: &[S]) -> Result<&mut Self> {
        let body: usize = items
            .iter()
            .map(|s| prefixed_len(s.as_ref().len()))
            .sum();
        self.ensure_writable(vle::encoded_len(items.len() as u64) + body)?;

        self.put_vle(items.len() as u64)?;
        for item in items {
            self.put_string(item.as_ref())?;
        }
        Ok(self)
    }

    pub fn get_string_array(&mut self) -> Result<Vec<String>> {
        let start = self.position;
        self.read_string_array().inspect_err(|_| {
            self.position = start;
        })
    }

    fn read_string_array(&mut self) -> Result<Vec<String>> {
        let count = to_usize(self.get_vle()?)?;
        // each element takes at least one byte, so `remaining` caps the
        // allocation a hostile count can force
        let mut items = Vec::with_capacity(count.min(self.remaining()));
        for _ in 0..count {
            items.push(self.get_string()?);
        }
        Ok(items)
    }

    // ---------------------------------------------------------------------
    // helpers
    // ---------------------------------------------------------------------

    /// Decode a length prefix without consuming it and check that the
    /// payload it announces is present.
    fn peek_length(&self) -> Result<(usize, usize)> {
        let (len, header) = vle::decode(self.as_slice())?;
        let len = to_usize(len)?;
        if len > self.remaining() - header {
            return Err(TransportError::Underflow {
                needed: header.saturating_add(len),
                remaining: self.remaining(),
            });
        }
        Ok((len, header))
    }

    #[inline]
    fn ensure_writable(&self, needed: usize) -> Result<()> {
        if needed > self.remaining() {
            return Err(TransportError::Overflow {
                needed,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }

    #[inline]
    fn ensure_readable(&self, needed: usize) -> Result<()> {
        if needed > self.remaining() {
            return Err(TransportError::Underflow {
                needed,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }
}

#[inline]
fn prefixed_len(len: usize) -> usize {
    vle::encoded_len(len as u64) + len
}

fn to_usize(value: u64) -> Result<usize> {
    usize::try_from(value)
        .map_err(|_| TransportError::InvalidFormat(constants::ERR_LENGTH_TOO_LARGE.to_string()))
}

impl From<Vec<u8>> for ByteBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self::wrap(bytes)
    }
}

impl From<&[u8]> for ByteBuffer {
    fn from(bytes: &[u8]) -> Self {
        Self::wrap(bytes.to_vec())
    }
}

impl From<Bytes> for ByteBuffer {
    fn from(bytes: Bytes) -> Self {
        Self::wrap(bytes.to_vec())
    }
}

impl fmt::Display for ByteBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ByteBuffer[pos={}, lim={}, cap={}]",
            self.position,
            self.limit,
            self.capacity()
        )
    }
}

impl fmt::Debug for ByteBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteBuffer")
            .field("position", &self.position)
            .field("limit", &self.limit)
            .field("capacity", &self.capacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer_is_in_write_mode() {
        let buf = ByteBuffer::new(16);
        assert_eq!(buf.position(), 0);
        assert_eq!(buf.limit(), 16);
        assert_eq!(buf.capacity(), 16);
        assert!(buf.as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_clear_and_flip() {
        let mut buf = ByteBuffer::new(8);
        buf.put_slice(&[1, 2, 3]).unwrap();
        buf.flip();
        assert_eq!((buf.position(), buf.limit()), (0, 3));

        buf.get_u8().unwrap();
        buf.clear();
        assert_eq!((buf.position(), buf.limit()), (0, 8));
    }

    #[test]
    fn test_put_slice_is_all_or_nothing() {
        let mut buf = ByteBuffer::new(4);
        buf.put_u8(9).unwrap();
        let err = buf.put_slice(&[1, 2, 3, 4]).unwrap_err();
        assert!(matches!(err, TransportError::Overflow { needed: 4, remaining: 3 }));
        assert_eq!(buf.position(), 1);
        assert_eq!(&buf.storage[..], &[9, 0, 0, 0]);
    }

    #[test]
    fn test_get_bytes_is_all_or_nothing() {
        let mut buf = ByteBuffer::wrap(vec![1, 2, 3]);
        assert!(matches!(
            buf.get_bytes(4),
            Err(TransportError::Underflow { needed: 4, remaining: 3 })
        ));
        assert_eq!(buf.position(), 0);
        assert_eq!(buf.get_bytes(3).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_u16_is_little_endian() {
        let mut buf = ByteBuffer::new(2);
        buf.put_u16(0x1234).unwrap();
        assert_eq!(&buf.storage[..], &[0x34, 0x12]);
        buf.flip();
        assert_eq!(buf.get_u16().unwrap(), 0x1234);
    }

    #[test]
    fn test_u16_needs_two_bytes() {
        let mut buf = ByteBuffer::new(1);
        assert!(buf.put_u16(1).is_err());
        assert_eq!(buf.position(), 0);

        let mut buf = ByteBuffer::wrap(vec![0xff]);
        assert!(buf.get_u16().is_err());
        assert_eq!(buf.position(), 0);
    }

    #[test]
    fn test_vle_overflow_leaves_cursor() {
        let mut buf = ByteBuffer::new(2);
        assert!(buf.put_vle(1 << 20).is_err());
        assert_eq!(buf.position(), 0);
        buf.put_vle(300).unwrap();
        assert_eq!(buf.remaining(), 0);
    }

    #[test]
    fn test_truncated_vle_leaves_cursor() {
        let mut buf = ByteBuffer::wrap(vec![0x80, 0x80]);
        assert!(matches!(buf.get_vle(), Err(TransportError::Underflow { .. })));
        assert_eq!(buf.position(), 0);
    }

    #[test]
    fn test_string_header_counted_before_write() {
        // 5 bytes of text + 1 byte prefix does not fit in 5
        let mut buf = ByteBuffer::new(5);
        assert!(buf.put_string("hello").is_err());
        assert_eq!(buf.position(), 0);
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let mut buf = ByteBuffer::wrap(vec![0x02, 0xc3, 0x28]);
        assert!(matches!(buf.get_string(), Err(TransportError::InvalidFormat(_))));
        assert_eq!(buf.position(), 0);
    }

    #[test]
    fn test_string_shorter_than_prefix_underflows() {
        let mut buf = ByteBuffer::wrap(vec![0x05, b'a', b'b']);
        assert!(matches!(buf.get_string(), Err(TransportError::Underflow { .. })));
        assert_eq!(buf.position(), 0);
    }

    #[test]
    fn test_string_array_failure_rewinds() {
        let mut buf = ByteBuffer::new(32);
        buf.put_vle(3).unwrap();
        buf.put_string("one").unwrap();
        buf.put_string("two").unwrap();
        buf.flip();

        assert!(buf.get_string_array().is_err());
        assert_eq!(buf.position(), 0);
    }

    #[test]
    fn test_string_array_overflow_writes_nothing() {
        let mut buf = ByteBuffer::new(6);
        assert!(buf.put_string_array(&["abc", "def"]).is_err());
        assert_eq!(buf.position(), 0);
    }

    #[test]
    fn test_set_limit_pulls_position_back() {
        let mut buf = ByteBuffer::new(10);
        buf.set_position(8).unwrap();
        buf.set_limit(4).unwrap();
        assert_eq!((buf.position(), buf.limit()), (4, 4));
        assert!(buf.set_limit(11).is_err());
        assert!(buf.set_position(5).is_err());
    }

    #[test]
    fn test_advance_bounded_by_limit() {
        let mut buf = ByteBuffer::new(4);
        buf.advance(3).unwrap();
        assert!(buf.advance(2).is_err());
        assert_eq!(buf.position(), 3);
    }

    #[test]
    fn test_display() {
        let mut buf = ByteBuffer::new(12);
        buf.put_u16(1).unwrap();
        assert_eq!(buf.to_string(), "ByteBuffer[pos=2, lim=12, cap=12]");
    }

    #[test]
    fn test_from_bytes_copies_active_region() {
        let buf = ByteBuffer::from(Bytes::from_static(b"abc"));
        assert_eq!(buf.capacity(), 3);
        assert_eq!(buf.to_bytes(), Bytes::from_static(b"abc"));
    }
}
