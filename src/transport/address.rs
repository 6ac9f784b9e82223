//! Resolved peer addresses.
//!
//! Name resolution happens elsewhere. This type only carries the result:
//! a concrete IP and port, either handed in by the caller or reported by a
//! datagram receive.

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TransportError;

/// An already-resolved socket address. Immutable and cheap to copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedAddress(SocketAddr);

impl ResolvedAddress {
    pub fn new(addr: SocketAddr) -> Self {
        Self(addr)
    }

    #[inline]
    pub fn socket_addr(&self) -> SocketAddr {
        self.0
    }

    #[inline]
    pub fn ip(&self) -> IpAddr {
        self.0.ip()
    }

    #[inline]
    pub fn port(&self) -> u16 {
        self.0.port()
    }

    pub fn is_ipv4(&self) -> bool {
        self.0.is_ipv4()
    }

    pub fn is_multicast(&self) -> bool {
        self.0.ip().is_multicast()
    }
}

impl From<SocketAddr> for ResolvedAddress {
    fn from(addr: SocketAddr) -> Self {
        Self(addr)
    }
}

impl From<ResolvedAddress> for SocketAddr {
    fn from(addr: ResolvedAddress) -> Self {
        addr.0
    }
}

/// Parses numeric literals only (`"10.0.0.1:9000"`, `"[::1]:9000"`).
/// Hostnames are rejected rather than looked up.
impl FromStr for ResolvedAddress {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<SocketAddr>()
            .map(Self)
            .map_err(|e| TransportError::InvalidAddress(format!("'{s}': {e}")))
    }
}

impl fmt::Display for ResolvedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_literals() {
        let v4: ResolvedAddress = "239.1.2.3:7447".parse().unwrap();
        assert!(v4.is_ipv4());
        assert!(v4.is_multicast());
        assert_eq!(v4.port(), 7447);

        let v6: ResolvedAddress = "[::1]:9000".parse().unwrap();
        assert!(!v6.is_ipv4());
        assert_eq!(v6.to_string(), "[::1]:9000");
    }

    #[test]
    fn test_hostnames_are_not_resolved() {
        let err = "localhost:80".parse::<ResolvedAddress>().unwrap_err();
        assert!(matches!(err, TransportError::InvalidAddress(_)));
    }
}
