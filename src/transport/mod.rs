//! # Transport Layer
//!
//! Blocking channels that move bytes between an open socket and a
//! [`ByteBuffer`](crate::core::buffer::ByteBuffer).
//!
//! ## Channels
//! - **TCP** ([`tcp::TcpChannel`]): stream read/write, graceful close on
//!   peer shutdown or reset
//! - **UDP** ([`udp::UdpChannel`]): datagram send/receive with sender
//!   address, IPv4/IPv6 multicast membership
//!
//! ## Socket seams
//! Channels never create descriptors. They are handed something that
//! implements [`StreamSocket`] or [`DatagramSocket`]; the std socket types
//! implement both traits, and tests plug in scripted sockets.
//!
//! ## Interruption
//! A system call failing with `ErrorKind::Interrupted` is reissued, up to
//! [`MAX_INTERRUPT_RETRIES`] times. No other failure is retried here.

pub mod address;
pub mod tcp;
pub mod udp;

use std::io::{self, Read, Write};
use std::net::{Ipv4Addr, Ipv6Addr, TcpStream, UdpSocket};

use tracing::debug;

use crate::utils::metrics::global_metrics;
pub use address::ResolvedAddress;

/// Upper bound on reissuing a signal-interrupted system call.
pub const MAX_INTERRUPT_RETRIES: usize = 32;

/// A connected, open byte stream.
pub trait StreamSocket {
    /// One receive call. `Ok(0)` means the peer shut down.
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// One send call; may accept fewer bytes than offered.
    fn send(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Release the descriptor, reporting what the OS says about it.
    fn close(self) -> io::Result<()>
    where
        Self: Sized;
}

/// An open datagram socket.
pub trait DatagramSocket {
    fn send_to(&self, buf: &[u8], target: &ResolvedAddress) -> io::Result<usize>;

    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, ResolvedAddress)>;

    fn join_multicast_v4(&self, group: Ipv4Addr, interface: Ipv4Addr) -> io::Result<()>;

    fn leave_multicast_v4(&self, group: Ipv4Addr, interface: Ipv4Addr) -> io::Result<()>;

    fn join_multicast_v6(&self, group: Ipv6Addr, interface: u32) -> io::Result<()>;

    fn leave_multicast_v6(&self, group: Ipv6Addr, interface: u32) -> io::Result<()>;

    fn close(self) -> io::Result<()>
    where
        Self: Sized;
}

impl StreamSocket for TcpStream {
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read(buf)
    }

    fn send(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write(buf)
    }

    fn close(self) -> io::Result<()> {
        close_descriptor(self)
    }
}

#[cfg(unix)]
impl StreamSocket for std::os::unix::net::UnixStream {
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read(buf)
    }

    fn send(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write(buf)
    }

    fn close(self) -> io::Result<()> {
        close_descriptor(self)
    }
}

impl DatagramSocket for UdpSocket {
    fn send_to(&self, buf: &[u8], target: &ResolvedAddress) -> io::Result<usize> {
        UdpSocket::send_to(self, buf, target.socket_addr())
    }

    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, ResolvedAddress)> {
        UdpSocket::recv_from(self, buf).map(|(n, from)| (n, ResolvedAddress::from(from)))
    }

    fn join_multicast_v4(&self, group: Ipv4Addr, interface: Ipv4Addr) -> io::Result<()> {
        UdpSocket::join_multicast_v4(self, &group, &interface)
    }

    fn leave_multicast_v4(&self, group: Ipv4Addr, interface: Ipv4Addr) -> io::Result<()> {
        UdpSocket::leave_multicast_v4(self, &group, &interface)
    }

    fn join_multicast_v6(&self, group: Ipv6Addr, interface: u32) -> io::Result<()> {
        UdpSocket::join_multicast_v6(self, &group, interface)
    }

    fn leave_multicast_v6(&self, group: Ipv6Addr, interface: u32) -> io::Result<()> {
        UdpSocket::leave_multicast_v6(self, &group, interface)
    }

    fn close(self) -> io::Result<()> {
        close_descriptor(self)
    }
}

/// Close a descriptor with `close(2)` so the OS result is not lost in `Drop`.
#[cfg(unix)]
fn close_descriptor<T: std::os::unix::io::IntoRawFd>(socket: T) -> io::Result<()> {
    let fd = socket.into_raw_fd();
    // SAFETY: `into_raw_fd` released ownership; nothing else holds `fd`.
    if unsafe { libc::close(fd) } == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn close_descriptor<T>(socket: T) -> io::Result<()> {
    drop(socket);
    Ok(())
}

/// Reissue `op` while it fails with `Interrupted`, at most
/// [`MAX_INTERRUPT_RETRIES`] times. The last error is returned once the bound
/// is hit.
pub(crate) fn retry_interrupted<T>(mut op: impl FnMut() -> io::Result<T>) -> io::Result<T> {
    let mut attempts = 0;
    loop {
        match op() {
            Err(e) if e.kind() == io::ErrorKind::Interrupted && attempts < MAX_INTERRUPT_RETRIES => {
                attempts += 1;
                global_metrics().interrupted_retry();
                debug!(attempt = attempts, "System call interrupted, retrying");
            }
            other => return other,
        }
    }
}
