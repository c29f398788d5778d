//! Coordinator Module
//!
//! The orchestration layer between clients and the fixed node table.
//!
//! ## Core Concepts
//! - **Partitioning**: a stored file is split into N contiguous byte
//!   ranges, one per configured node, by `partitioner`.
//! - **Static routing**: shard i is always sent to and requested from node
//!   endpoint i; the mapping never rebalances.
//! - **Fan-out / fan-in**: `service` runs every node round-trip
//!   concurrently under the configured timeout and folds per-node outcomes
//!   into one aggregate result. A dead node degrades its own shard, never
//!   the whole operation.
//! - **Statelessness**: nothing survives a request; the only state is the
//!   immutable configuration and the nodes' filesystems.

pub mod partitioner;
pub mod server;
pub mod service;

#[cfg(test)]
mod tests;
