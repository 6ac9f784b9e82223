//! # Configuration Management
//!
//! Settings for buffers, channels and logging.
//!
//! The crate never opens sockets itself, so nothing here binds or connects.
//! The values size buffers, set receive scratch lengths and name the default
//! UDP peer and multicast group that a caller hands to the channels.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()` / `from_toml()`
//! - `WIRE_TRANSPORT_*` environment variables via `from_env()`
//! - Direct instantiation with defaults

use crate::error::{Result, TransportError};
use crate::transport::ResolvedAddress;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::net::Ipv4Addr;
use std::path::Path;
use tracing::Level;

/// Default capacity of a message buffer (one Ethernet MTU)
pub const DEFAULT_BUFFER_CAPACITY: usize = 1500;

/// Default scratch size for `TcpChannel::read`
pub const DEFAULT_READ_CHUNK: usize = 4096;

/// Largest UDP payload over IPv4
pub const MAX_UDP_PAYLOAD: usize = 65_507;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct TransportConfig {
    #[serde(default)]
    pub buffer: BufferConfig,

    #[serde(default)]
    pub tcp: TcpConfig,

    #[serde(default)]
    pub udp: UdpConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TransportConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path).map_err(|e| {
            TransportError::ConfigError(format!("Failed to open config file: {e}"))
        })?;

        let mut contents = String::new();
        file.read_to_string(&mut contents).map_err(|e| {
            TransportError::ConfigError(format!("Failed to read config file: {e}"))
        })?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| TransportError::ConfigError(format!("Failed to parse TOML: {e}")))
    }

    /// Defaults overridden by `WIRE_TRANSPORT_*` environment variables.
    /// Unparseable numeric values are ignored.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(capacity) = std::env::var("WIRE_TRANSPORT_BUFFER_CAPACITY") {
            if let Ok(val) = capacity.parse::<usize>() {
                config.buffer.capacity = val;
            }
        }

        if let Ok(size) = std::env::var("WIRE_TRANSPORT_POOL_SIZE") {
            if let Ok(val) = size.parse::<usize>() {
                config.buffer.pool_size = val;
            }
        }

        if let Ok(chunk) = std::env::var("WIRE_TRANSPORT_TCP_READ_CHUNK") {
            if let Ok(val) = chunk.parse::<usize>() {
                config.tcp.read_chunk_size = val;
            }
        }

        if let Ok(peer) = std::env::var("WIRE_TRANSPORT_UDP_PEER") {
            config.udp.peer_address = peer;
        }

        if let Ok(group) = std::env::var("WIRE_TRANSPORT_UDP_GROUP") {
            config.udp.multicast_group = Some(group);
        }

        if let Ok(level) = std::env::var("WIRE_TRANSPORT_LOG_LEVEL") {
            if let Ok(val) = level.parse::<Level>() {
                config.logging.log_level = val;
            }
        }

        Ok(config)
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Generate example configuration file content
    pub fn example_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate example config"))
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| {
            TransportError::ConfigError(format!("Failed to serialize config: {e}"))
        })?;

        std::fs::write(path, content).map_err(|e| {
            TransportError::ConfigError(format!("Failed to write config file: {e}"))
        })?;

        Ok(())
    }

    /// Validate the configuration. An empty list means it is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        errors.extend(self.buffer.validate());
        errors.extend(self.tcp.validate());
        errors.extend(self.udp.validate());
        errors.extend(self.logging.validate());

        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(TransportError::ConfigError(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// Buffer sizing
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BufferConfig {
    /// Capacity of each ByteBuffer in bytes
    pub capacity: usize,

    /// Buffers pre-allocated (and retained) by a BufferPool
    pub pool_size: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_BUFFER_CAPACITY,
            pool_size: 32,
        }
    }
}

impl BufferConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.capacity == 0 {
            errors.push("Buffer capacity must be greater than 0".to_string());
        } else if self.capacity > 64 * 1024 * 1024 {
            errors.push(format!(
                "Buffer capacity too large: {} bytes (maximum: 64 MB)",
                self.capacity
            ));
        }

        if self.pool_size > 100_000 {
            errors.push(format!(
                "Pool size very high: {} (each entry holds {} bytes)",
                self.pool_size, self.capacity
            ));
        }

        errors
    }
}

/// Stream channel settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TcpConfig {
    /// Scratch length passed to `TcpChannel::read`
    pub read_chunk_size: usize,
}

impl Default for TcpConfig {
    fn default() -> Self {
        Self {
            read_chunk_size: DEFAULT_READ_CHUNK,
        }
    }
}

impl TcpConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.read_chunk_size == 0 {
            errors.push("TCP read chunk size must be greater than 0".to_string());
        }

        errors
    }
}

/// Datagram channel settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UdpConfig {
    /// Default destination, a numeric `ip:port` literal
    pub peer_address: String,

    /// Scratch length passed to `UdpChannel::receive`
    pub max_datagram_size: usize,

    /// IPv4 multicast group to join, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multicast_group: Option<String>,

    /// Address of the interface used for membership
    #[serde(default = "default_interface")]
    pub multicast_interface: String,
}

fn default_interface() -> String {
    Ipv4Addr::UNSPECIFIED.to_string()
}

impl Default for UdpConfig {
    fn default() -> Self {
        Self {
            peer_address: String::from("127.0.0.1:7447"),
            max_datagram_size: DEFAULT_BUFFER_CAPACITY,
            multicast_group: None,
            multicast_interface: default_interface(),
        }
    }
}

impl UdpConfig {
    /// The default peer as a resolved address.
    pub fn peer(&self) -> Result<ResolvedAddress> {
        self.peer_address.parse()
    }

    /// Group and interface to join, when a group is configured.
    pub fn membership(&self) -> Result<Option<(Ipv4Addr, Ipv4Addr)>> {
        let Some(group) = &self.multicast_group else {
            return Ok(None);
        };
        let group = parse_ipv4(group)?;
        let interface = parse_ipv4(&self.multicast_interface)?;
        Ok(Some((group, interface)))
    }

    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.peer_address.is_empty() {
            errors.push("UDP peer address cannot be empty".to_string());
        } else if self.peer().is_err() {
            errors.push(format!(
                "Invalid UDP peer address format: '{}' (expected format: '10.0.0.1:7447')",
                self.peer_address
            ));
        }

        if self.max_datagram_size == 0 {
            errors.push("Max datagram size must be greater than 0".to_string());
        } else if self.max_datagram_size > MAX_UDP_PAYLOAD {
            errors.push(format!(
                "Max datagram size too large: {} bytes (maximum: {MAX_UDP_PAYLOAD})",
                self.max_datagram_size
            ));
        }

        if let Some(group) = &self.multicast_group {
            match group.parse::<Ipv4Addr>() {
                Ok(addr) if addr.is_multicast() => {}
                Ok(_) => errors.push(format!("Not a multicast group address: '{group}'")),
                Err(_) => errors.push(format!("Invalid multicast group address: '{group}'")),
            }
        }

        if self.multicast_interface.parse::<Ipv4Addr>().is_err() {
            errors.push(format!(
                "Invalid multicast interface address: '{}'",
                self.multicast_interface
            ));
        }

        errors
    }
}

fn parse_ipv4(s: &str) -> Result<Ipv4Addr> {
    s.parse()
        .map_err(|e| TransportError::InvalidAddress(format!("'{s}': {e}")))
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Application name for logs
    pub app_name: String,

    /// Log level
    #[serde(with = "log_level_serde")]
    pub log_level: Level,

    /// Whether to use JSON formatting for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: String::from("wire-transport"),
            log_level: Level::INFO,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.app_name.is_empty() {
            errors.push("Application name cannot be empty".to_string());
        } else if self.app_name.len() > 64 {
            errors.push(format!(
                "Application name too long: {} characters (maximum: 64)",
                self.app_name.len()
            ));
        }

        errors
    }
}

/// Helper module for tracing::Level serialization/deserialization
mod log_level_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;
    use tracing::Level;

    pub fn serialize<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let level_str = match *level {
            Level::TRACE => "trace",
            Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            Level::ERROR => "error",
        };
        level_str.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let level_str = String::deserialize(deserializer)?;
        Level::from_str(&level_str)
            .map_err(|_| serde::de::Error::custom(format!("Invalid log level: {level_str}")))
    }
}
