//! Sharded File Store Library
//!
//! This library crate defines the core modules of the sharded file store.
//! It serves as the foundation for the two binary executables
//! (`coordinator` and `node`).
//!
//! ## Architecture Modules
//! The system is composed of four subsystems plus shared plumbing:
//!
//! - **`protocol`**: The wire format shared by both hops (client↔coordinator
//!   and coordinator↔node). Length-prefixed UTF-8 strings, big-endian
//!   fixed-width integers, and length-prefixed raw payloads, framed over one
//!   fresh TCP connection per exchange.
//! - **`coordinator`**: The request orchestration layer. Partitions incoming
//!   files into contiguous byte-range shards, fans each operation out to the
//!   fixed node table, and folds per-node outcomes back into one result.
//! - **`node`**: The storage node. Persists, retrieves, deletes, and lists
//!   shards in a local port-keyed directory, addressed by exact shard name.
//! - **`client`**: A programmatic client for the coordinator's four
//!   operations (store, fetch, delete, list).
//! - **`config`** / **`error`**: The immutable startup configuration value
//!   and the error taxonomy used across the crate.

pub mod client;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod node;
pub mod protocol;
