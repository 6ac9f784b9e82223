//! # wire-transport
//!
//! Low-level transport for a binary protocol: a position/limit
//! [`ByteBuffer`] with a compact wire codec, and blocking TCP/UDP channels
//! that move bytes between sockets and that buffer.
//!
//! ## Layout
//! - [`core`]: `ByteBuffer` and the VLE integer codec
//! - [`transport`]: `TcpChannel`, `UdpChannel`, `ResolvedAddress` and the
//!   socket traits they sit on
//! - [`config`]: TOML / environment configuration
//! - [`utils`]: buffer pool, logging setup, metrics
//! - [`error`]: `TransportError`
//!
//! ## Example
//! ```rust
//! use std::net::{TcpListener, TcpStream};
//! use wire_transport::{ByteBuffer, TcpChannel};
//!
//! let listener = TcpListener::bind("127.0.0.1:0")?;
//! let mut client = TcpChannel::new(TcpStream::connect(listener.local_addr()?)?);
//! let mut server = TcpChannel::new(listener.accept()?.0);
//!
//! let mut out = ByteBuffer::new(64);
//! out.put_string_array(&["a", "b"])?;
//! out.flip();
//! client.write_buffer(&mut out)?;
//!
//! let mut inbound = ByteBuffer::new(64);
//! server.read_into(&mut inbound)?;
//! inbound.flip();
//! assert_eq!(inbound.get_string_array()?, vec!["a", "b"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod transport;
pub mod utils;

pub use crate::core::buffer::ByteBuffer;
pub use crate::error::{Result, TransportError};
pub use crate::transport::tcp::TcpChannel;
pub use crate::transport::udp::UdpChannel;
pub use crate::transport::{DatagramSocket, ResolvedAddress, StreamSocket};
