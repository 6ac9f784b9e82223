//! # Utility Modules
//!
//! Supporting pieces around the codec and channels.
//!
//! ## Components
//! - **Buffer Pool**: reusable fixed-capacity ByteBuffers
//! - **Logging**: tracing-subscriber setup from `LoggingConfig`
//! - **Metrics**: process-wide channel counters

pub mod buffer_pool;
pub mod logging;
pub mod metrics;

pub use buffer_pool::{BufferPool, PooledBuffer};
