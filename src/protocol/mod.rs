//! Wire Protocol Module
//!
//! Framing and encoding for every exchange in the system. Both hops
//! (client↔coordinator and coordinator↔node) speak the same format: one
//! request message followed by one response message, on a freshly opened
//! connection that is closed after the exchange.
//!
//! ## Field encodings
//! Message fields are emitted in a fixed order using three encodings:
//! - **string**: big-endian `u16` byte length + that many UTF-8 bytes
//!   (action tokens, names, status messages),
//! - **count / shard index**: big-endian `u32`,
//! - **payload**: big-endian `u64` byte length + exactly that many raw bytes.
//!
//! A malformed frame (declared length running past the end of the stream,
//! non-UTF-8 text, or an unrecognized action token) is a protocol error: the
//! connection is closed without a response and the error is logged, never
//! retried.

pub mod codec;
pub mod types;
