//! # Error Types
//!
//! Error handling for the buffer codec and the socket channels.
//!
//! ## Error Categories
//! - **Buffer errors**: `Overflow`, `Underflow`, `InvalidFormat`. Local,
//!   deterministic conditions; never retried.
//! - **I/O errors**: `ReadFailed`, `ShortWrite`, `WriteFailed`, `CloseFailed`,
//!   `SocketClosed`, `SocketOption`. Surfaced to the immediate caller.
//! - **Setup errors**: `InvalidAddress`, `ConfigError`.
//!
//! A signal-interrupted system call is the only condition retried inside the
//! crate. A peer closing a TCP stream is reported as an empty read, not as an
//! error.
//!
//! ## Example Usage
//! ```rust
//! use wire_transport::core::buffer::ByteBuffer;
//! use wire_transport::error::{Result, TransportError};
//!
//! fn first_byte(buf: &mut ByteBuffer) -> Result<u8> {
//!     buf.get_u8()
//! }
//!
//! let mut empty = ByteBuffer::new(0);
//! assert!(matches!(first_byte(&mut empty), Err(TransportError::Underflow { .. })));
//! ```

use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// Static error messages, borrowed to keep error paths allocation-free.
pub mod constants {
    /// Codec errors
    pub const ERR_INVALID_UTF8: &str = "String payload is not valid UTF-8";
    pub const ERR_VLE_TOO_LONG: &str = "VLE integer exceeds maximum encoded length";
    pub const ERR_VLE_OVERFLOW: &str = "VLE integer overflows 64 bits";
    pub const ERR_LENGTH_TOO_LARGE: &str = "Decoded length does not fit in memory";
}

// TransportError is the single error type for buffer and channel operations
#[derive(Error, Debug, Serialize, Deserialize)]
pub enum TransportError {
    #[error("Buffer overflow: need {needed} bytes, {remaining} remaining")]
    Overflow { needed: usize, remaining: usize },

    #[error("Buffer underflow: need {needed} bytes, {remaining} remaining")]
    Underflow { needed: usize, remaining: usize },

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Read failed: {0}")]
    #[serde(skip)]
    ReadFailed(#[source] io::Error),

    #[error("Short write: sent {sent} of {expected} bytes")]
    ShortWrite { expected: usize, sent: usize },

    #[error("Write failed: {0}")]
    #[serde(skip)]
    WriteFailed(#[source] io::Error),

    #[error("Close failed: {0}")]
    #[serde(skip)]
    CloseFailed(#[source] io::Error),

    #[error("Socket is closed")]
    SocketClosed,

    #[error("Socket option failed: {0}")]
    #[serde(skip)]
    SocketOption(#[source] io::Error),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl TransportError {
    /// True for failures raised by the buffer codec.
    pub fn is_buffer_error(&self) -> bool {
        matches!(
            self,
            TransportError::Overflow { .. }
                | TransportError::Underflow { .. }
                | TransportError::InvalidFormat(_)
        )
    }

    /// True for failures raised by a channel talking to the OS.
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            TransportError::ReadFailed(_)
                | TransportError::ShortWrite { .. }
                | TransportError::WriteFailed(_)
                | TransportError::CloseFailed(_)
                | TransportError::SocketClosed
                | TransportError::SocketOption(_)
        )
    }
}

/// Type alias for Results using TransportError
pub type Result<T> = std::result::Result<T, TransportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(TransportError::Overflow { needed: 1, remaining: 0 }.is_buffer_error());
        assert!(TransportError::InvalidFormat("x".into()).is_buffer_error());
        assert!(!TransportError::SocketClosed.is_buffer_error());
        assert!(TransportError::SocketClosed.is_io_error());
        assert!(TransportError::ShortWrite { expected: 4, sent: 2 }.is_io_error());
        assert!(!TransportError::ConfigError("x".into()).is_io_error());
    }

    #[test]
    fn test_display_carries_counts() {
        let err = TransportError::ShortWrite { expected: 10, sent: 3 };
        assert_eq!(err.to_string(), "Short write: sent 3 of 10 bytes");
    }
}
