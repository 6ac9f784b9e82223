//! # TCP Channel
//!
//! Blocking read/write over a connected stream.
//!
//! ## Read outcomes
//! | OS result | Channel result |
//! |---|---|
//! | `n > 0` bytes | those `n` bytes (short reads are normal) |
//! | `0` bytes | peer shut down: local side closed, empty result |
//! | `ConnectionReset` | peer reset: local side closed, empty result |
//! | `Interrupted` | reissued |
//! | anything else | `ReadFailed` |
//!
//! After a graceful close every further operation fails with `SocketClosed`.
//!
//! ## Cursor contract
//! [`TcpChannel::read_into`] fills `[position, limit)` and advances
//! `position` by the bytes received. [`TcpChannel::write_buffer`] sends
//! `[position, limit)` and leaves `position == limit` on success. UDP follows
//! the same contract.
//!
//! ## Writes
//! One send call per write. If the OS takes fewer bytes than offered the
//! write fails with `ShortWrite`; there is no continuation loop.

use std::net::TcpStream;

use bytes::{Bytes, BytesMut};
use tracing::{debug, trace, warn};

use super::{retry_interrupted, StreamSocket};
use crate::core::buffer::ByteBuffer;
use crate::error::{Result, TransportError};
use crate::utils::metrics::global_metrics;

/// Owns one stream socket until it is closed.
pub struct TcpChannel<S: StreamSocket = TcpStream> {
    socket: Option<S>,
}

impl<S: StreamSocket> TcpChannel<S> {
    pub fn new(socket: S) -> Self {
        Self {
            socket: Some(socket),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.socket.is_none()
    }

    /// The underlying socket, `None` once closed.
    pub fn get_ref(&self) -> Option<&S> {
        self.socket.as_ref()
    }

    /// Receive up to `max` bytes. An empty result means the peer went away
    /// (or `max` was zero).
    pub fn read(&mut self, max: usize) -> Result<Bytes> {
        let mut scratch = BytesMut::zeroed(max);
        let n = self.recv_into(&mut scratch)?;
        scratch.truncate(n);
        Ok(scratch.freeze())
    }

    /// Receive into `buf`'s unused region and advance its position by the
    /// count returned.
    pub fn read_into(&mut self, buf: &mut ByteBuffer) -> Result<usize> {
        let n = self.recv_into(buf.unused_mut())?;
        buf.advance(n)?;
        Ok(n)
    }

    /// Send all of `data` in a single call.
    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        let socket = self.socket_mut()?;
        let sent = retry_interrupted(|| socket.send(data)).map_err(TransportError::WriteFailed)?;

        if sent != data.len() {
            global_metrics().short_write();
            warn!(expected = data.len(), sent, "Short write on stream");
            return Err(TransportError::ShortWrite {
                expected: data.len(),
                sent,
            });
        }

        global_metrics().bytes_sent(sent as u64);
        trace!(bytes = sent, "Stream write");
        Ok(())
    }

    /// Send `buf`'s remaining region; on success the buffer is fully
    /// consumed. On failure the cursor is not moved.
    pub fn write_buffer(&mut self, buf: &mut ByteBuffer) -> Result<()> {
        self.write(buf.as_slice())?;
        buf.advance(buf.remaining())
    }

    /// Writes are unbuffered at this layer.
    pub fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    /// Release the socket. The first call reports OS failures as
    /// `CloseFailed`; later calls do nothing.
    pub fn close(&mut self) -> Result<()> {
        match self.socket.take() {
            Some(socket) => socket.close().map_err(|e| {
                global_metrics().close_failure();
                TransportError::CloseFailed(e)
            }),
            None => Ok(()),
        }
    }

    fn socket_mut(&mut self) -> Result<&mut S> {
        self.socket.as_mut().ok_or(TransportError::SocketClosed)
    }

    fn recv_into(&mut self, dst: &mut [u8]) -> Result<usize> {
        // a zero-length recv also returns 0 and would look like a shutdown
        if dst.is_empty() {
            self.socket_mut()?;
            return Ok(0);
        }

        let socket = self.socket_mut()?;
        match retry_interrupted(|| socket.recv(dst)) {
            Ok(0) => {
                debug!("Peer closed stream");
                global_metrics().graceful_close();
                if let Err(e) = self.close() {
                    debug!(error = %e, "Ignoring close failure after peer shutdown");
                }
                Ok(0)
            }
            Ok(n) => {
                global_metrics().bytes_received(n as u64);
                trace!(bytes = n, "Stream read");
                Ok(n)
            }
            Err(e) if e.kind() == std::io::ErrorKind::ConnectionReset => {
                debug!("Peer reset stream");
                global_metrics().graceful_close();
                self.close()?;
                Ok(0)
            }
            Err(e) => {
                global_metrics().read_failure();
                Err(TransportError::ReadFailed(e))
            }
        }
    }
}

impl<S: StreamSocket> Drop for TcpChannel<S> {
    fn drop(&mut self) {
        if let Some(socket) = self.socket.take() {
            if let Err(e) = socket.close() {
                debug!(error = %e, "Close on drop failed");
            }
        }
    }
}
