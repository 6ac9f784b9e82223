//! # Buffer Pool
//!
//! Reuses fixed-capacity [`ByteBuffer`]s so each in-flight message can own a
//! buffer without allocating one per message.
//!
//! ## Usage
//! ```rust
//! use wire_transport::utils::buffer_pool::BufferPool;
//!
//! let pool = BufferPool::new(4, 1500);
//! let mut buf = pool.acquire();
//! buf.put_u16(42)?;
//! // Buffer returns to the pool on drop
//! # Ok::<(), wire_transport::error::TransportError>(())
//! ```

use std::sync::{Arc, Mutex};

use crate::config::DEFAULT_BUFFER_CAPACITY;
use crate::core::buffer::ByteBuffer;

/// A pooled buffer that returns itself to the pool when dropped
pub struct PooledBuffer {
    buffer: ByteBuffer,
    pool: Arc<Mutex<Vec<ByteBuffer>>>,
    capacity: usize,
    retain: usize,
}

impl PooledBuffer {
    /// Detach the buffer from the pool for good.
    pub fn into_inner(mut self) -> ByteBuffer {
        std::mem::replace(&mut self.buffer, ByteBuffer::new(0))
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        // a detached guard holds an empty placeholder, which is not kept
        if self.buffer.capacity() != self.capacity {
            return;
        }
        let mut buffer = std::mem::replace(&mut self.buffer, ByteBuffer::new(0));
        buffer.clear();
        if let Ok(mut pool) = self.pool.lock() {
            if pool.len() < self.retain {
                pool.push(buffer);
            }
        }
    }
}

impl std::ops::Deref for PooledBuffer {
    type Target = ByteBuffer;

    fn deref(&self) -> &Self::Target {
        &self.buffer
    }
}

impl std::ops::DerefMut for PooledBuffer {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.buffer
    }
}

/// Thread-safe pool of equally sized byte buffers
pub struct BufferPool {
    pool: Arc<Mutex<Vec<ByteBuffer>>>,
    capacity: usize,
    retain: usize,
}

impl BufferPool {
    /// Pre-allocate `pool_size` buffers of `capacity` bytes. At most
    /// `pool_size` buffers are kept once returned.
    pub fn new(pool_size: usize, capacity: usize) -> Self {
        let pool = (0..pool_size).map(|_| ByteBuffer::new(capacity)).collect();

        Self {
            pool: Arc::new(Mutex::new(pool)),
            capacity,
            retain: pool_size,
        }
    }

    /// Take a cleared buffer from the pool, allocating if it is empty.
    pub fn acquire(&self) -> PooledBuffer {
        let buffer = self
            .pool
            .lock()
            .ok()
            .and_then(|mut pool| pool.pop())
            .unwrap_or_else(|| ByteBuffer::new(self.capacity));

        PooledBuffer {
            buffer,
            pool: self.pool.clone(),
            capacity: self.capacity,
            retain: self.retain,
        }
    }

    /// Capacity of every buffer handed out
    pub fn buffer_capacity(&self) -> usize {
        self.capacity
    }

    /// Get the current number of available buffers in the pool
    pub fn available(&self) -> usize {
        self.pool.lock().map(|p| p.len()).unwrap_or(0)
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(50, DEFAULT_BUFFER_CAPACITY)
    }
}

impl Clone for BufferPool {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            capacity: self.capacity,
            retain: self.retain,
        }
    }
}
