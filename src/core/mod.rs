//! # Core Codec Components
//!
//! The byte buffer and the wire encodings it speaks. Nothing in here touches
//! a socket.
//!
//! ## Components
//! - **ByteBuffer**: position/limit cursor over fixed storage
//! - **VLE**: 7-bit variable-length unsigned integers
//!
//! ## Wire Format
//! ```text
//! uint16        [lo] [hi]
//! vle           [1xxxxxxx]* [0xxxxxxx]          (max 10 bytes)
//! byte array    [vle len] [bytes...]
//! string        [vle len] [utf-8 bytes...]
//! string array  [vle count] [string]*
//! ```

pub mod buffer;
pub mod vle;
