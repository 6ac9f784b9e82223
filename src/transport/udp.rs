//! # UDP Channel
//!
//! Datagram send/receive plus multicast group membership.
//!
//! Every send must be accepted whole: a datagram is atomic, so a short send
//! is reported as `ShortWrite` and never continued. Receives return the
//! sender's address and treat a zero-length datagram as ordinary data.
//!
//! Sends take an optional destination; `None` means the peer the channel was
//! created with.
//!
//! ```rust,no_run
//! use std::net::{Ipv4Addr, UdpSocket};
//! use wire_transport::core::buffer::ByteBuffer;
//! use wire_transport::transport::udp::UdpChannel;
//!
//! let socket = UdpSocket::bind("0.0.0.0:7447")?;
//! let mut channel = UdpChannel::new(socket, "239.255.0.1:7447".parse()?);
//! channel.join_group(Ipv4Addr::new(239, 255, 0, 1), Ipv4Addr::UNSPECIFIED)?;
//!
//! let mut buf = ByteBuffer::new(1500);
//! buf.put_string("hello")?;
//! buf.flip();
//! channel.send_buffer_to(&mut buf, None)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::net::{Ipv4Addr, Ipv6Addr, UdpSocket};

use bytes::{Bytes, BytesMut};
use tracing::{debug, trace, warn};

use super::{retry_interrupted, DatagramSocket, ResolvedAddress};
use crate::core::buffer::ByteBuffer;
use crate::error::{Result, TransportError};
use crate::utils::metrics::global_metrics;

/// Owns one datagram socket and the default peer it sends to.
pub struct UdpChannel<S: DatagramSocket = UdpSocket> {
    socket: Option<S>,
    peer: ResolvedAddress,
}

impl<S: DatagramSocket> UdpChannel<S> {
    pub fn new(socket: S, peer: ResolvedAddress) -> Self {
        Self {
            socket: Some(socket),
            peer,
        }
    }

    /// Destination used when a send is given none.
    pub fn peer(&self) -> ResolvedAddress {
        self.peer
    }

    pub fn is_closed(&self) -> bool {
        self.socket.is_none()
    }

    pub fn get_ref(&self) -> Option<&S> {
        self.socket.as_ref()
    }

    /// Send `data` as one datagram to `destination`, or to the channel's
    /// peer when `None`.
    pub fn send_to(&mut self, data: &[u8], destination: Option<&ResolvedAddress>) -> Result<()> {
        let target = destination.copied().unwrap_or(self.peer);
        let socket = self.socket_ref()?;

        let sent = retry_interrupted(|| socket.send_to(data, &target))
            .map_err(TransportError::WriteFailed)?;

        if sent != data.len() {
            global_metrics().short_write();
            warn!(expected = data.len(), sent, %target, "Short datagram send");
            return Err(TransportError::ShortWrite {
                expected: data.len(),
                sent,
            });
        }

        global_metrics().datagram_sent(sent as u64);
        trace!(bytes = sent, %target, "Datagram sent");
        Ok(())
    }

    /// Send `buf`'s remaining region as one datagram. On success the buffer
    /// is fully consumed; on failure the cursor is not moved.
    pub fn send_buffer_to(
        &mut self,
        buf: &mut ByteBuffer,
        destination: Option<&ResolvedAddress>,
    ) -> Result<()> {
        self.send_to(buf.as_slice(), destination)?;
        buf.advance(buf.remaining())
    }

    /// Receive one datagram into `buf`'s unused region, advance its position
    /// by the datagram length and return the sender. Bytes beyond the
    /// region are dropped by the OS.
    pub fn receive_into(&mut self, buf: &mut ByteBuffer) -> Result<ResolvedAddress> {
        let (n, sender) = self.recv_from(buf.unused_mut())?;
        buf.advance(n)?;
        Ok(sender)
    }

    /// Receive one datagram of at most `max` bytes.
    pub fn receive(&mut self, max: usize) -> Result<(Bytes, ResolvedAddress)> {
        let mut scratch = BytesMut::zeroed(max);
        let (n, sender) = self.recv_from(&mut scratch)?;
        scratch.truncate(n);
        Ok((scratch.freeze(), sender))
    }

    /// Add membership of an IPv4 group on the interface with address
    /// `interface` (`Ipv4Addr::UNSPECIFIED` lets the OS pick).
    pub fn join_group(&mut self, group: Ipv4Addr, interface: Ipv4Addr) -> Result<()> {
        self.socket_ref()?
            .join_multicast_v4(group, interface)
            .map_err(TransportError::SocketOption)?;
        debug!(%group, %interface, "Joined multicast group");
        Ok(())
    }

    /// Drop membership of an IPv4 group.
    pub fn leave_group(&mut self, group: Ipv4Addr, interface: Ipv4Addr) -> Result<()> {
        self.socket_ref()?
            .leave_multicast_v4(group, interface)
            .map_err(TransportError::SocketOption)?;
        debug!(%group, %interface, "Left multicast group");
        Ok(())
    }

    /// Add membership of an IPv6 group on interface index `interface`
    /// (0 lets the OS pick).
    pub fn join_group_v6(&mut self, group: Ipv6Addr, interface: u32) -> Result<()> {
        self.socket_ref()?
            .join_multicast_v6(group, interface)
            .map_err(TransportError::SocketOption)?;
        debug!(%group, interface, "Joined multicast group");
        Ok(())
    }

    pub fn leave_group_v6(&mut self, group: Ipv6Addr, interface: u32) -> Result<()> {
        self.socket_ref()?
            .leave_multicast_v6(group, interface)
            .map_err(TransportError::SocketOption)?;
        debug!(%group, interface, "Left multicast group");
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

    fn socket_ref(&self) -> Result<&S> {
        self.socket.as_ref().ok_or(TransportError::SocketClosed)
    }

    fn recv_from(&mut self, dst: &mut [u8]) -> Result<(usize, ResolvedAddress)> {
        let socket = self.socket_ref()?;
        match retry_interrupted(|| socket.recv_from(dst)) {
            Ok((n, sender)) => {
                global_metrics().datagram_received(n as u64);
                trace!(bytes = n, %sender, "Datagram received");
                Ok((n, sender))
            }
            Err(e) => {
                global_metrics().read_failure();
                Err(TransportError::ReadFailed(e))
            }
        }
    }
}

impl<S: DatagramSocket> Drop for UdpChannel<S> {
    fn drop(&mut self) {
        if let Some(socket) = self.socket.take() {
            if let Err(e) = socket.close() {
                debug!(error = %e, "Close on drop failed");
            }
        }
    }
}
