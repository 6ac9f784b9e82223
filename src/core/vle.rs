//! # Variable-Length Integers
//!
//! Unsigned integers are written 7 bits at a time, least-significant group
//! first. Bit 7 of every byte is a continuation flag: set when more bytes
//! follow, clear on the final byte.
//!
//! ```text
//! 300 = 0b1_0010_1100  ->  [0xAC, 0x02]
//!        ^^^^^^^ low 7 bits (0x2C) | 0x80, then 300 >> 7 = 0x02
//! ```
//!
//! A `u64` never needs more than [`MAX_VLE_BYTES`] bytes. Decoding stops
//! there, so malformed input cannot drive an unbounded read.

use crate::error::{constants, Result, TransportError};

/// Maximum encoded length of a `u64` (ceil(64 / 7)).
pub const MAX_VLE_BYTES: usize = 10;

const CONTINUATION: u8 = 0x80;
const PAYLOAD_MASK: u8 = 0x7f;

/// Number of bytes `value` occupies on the wire. Always at least 1.
#[inline]
pub fn encoded_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.div_ceil(7).max(1)
}

/// Encode `value` into `out`, returning how many leading bytes were used.
#[inline]
pub fn encode(mut value: u64, out: &mut [u8; MAX_VLE_BYTES]) -> usize {
    let mut n = 0;
    while value > PAYLOAD_MASK as u64 {
        out[n] = (value as u8 & PAYLOAD_MASK) | CONTINUATION;
        value >>= 7;
        n += 1;
    }
    out[n] = value as u8;
    n + 1
}

/// Decode one integer from the front of `src`.
///
/// Returns the value and the number of bytes consumed. Fails with
/// `Underflow` when `src` ends before a terminating byte and with
/// `InvalidFormat` when the encoding is longer than [`MAX_VLE_BYTES`] or its
/// value does not fit in 64 bits.
pub fn decode(src: &[u8]) -> Result<(u64, usize)> {
    let mut value = 0u64;

    for (i, &byte) in src.iter().enumerate().take(MAX_VLE_BYTES) {
        let payload = byte & PAYLOAD_MASK;

        if i == MAX_VLE_BYTES - 1 {
            if byte & CONTINUATION != 0 {
                return Err(TransportError::InvalidFormat(
                    constants::ERR_VLE_TOO_LONG.to_string(),
                ));
            }
            // only the top bit of a u64 is left for the 10th group
            if payload > 1 {
                return Err(TransportError::InvalidFormat(
                    constants::ERR_VLE_OVERFLOW.to_string(),
                ));
            }
        }

        value |= (payload as u64) << (7 * i);

        if byte & CONTINUATION == 0 {
            return Ok((value, i + 1));
        }
    }

    Err(TransportError::Underflow {
        needed: src.len() + 1,
        remaining: src.len(),
    })
}
