//! Fan-out / Fan-in Orchestration
//!
//! One method per client operation. Every node round-trip opens a fresh
//! connection, is bounded by the configured timeout, and reports its
//! outcome keyed by shard index, so reassembly order never depends on
//! arrival order. A node that is down, slow, or misbehaving degrades its
//! own shard only; the operation as a whole always completes and answers.

use crate::config::{Config, NodeEndpoint};
use crate::coordinator::partitioner;
use crate::error::{Error, Result};
use crate::protocol::codec;
use crate::protocol::types::{
    shard_name, Action, DeleteOutcome, DeleteStatus, STATUS_FOUND, STATUS_NOT_FOUND,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncWriteExt, BufStream};
use tokio::net::TcpStream;
use tokio::task::JoinSet;

pub struct Coordinator {
    config: Arc<Config>,
}

impl Coordinator {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    /// Partitions `payload` and sends shard i to node endpoint i.
    ///
    /// Per-node failures are logged and swallowed: a store never reports
    /// per-node outcomes to the client, which receives the one generic
    /// acknowledgment either way. There is no rollback of shards that did
    /// land.
    pub async fn store(&self, file: &str, payload: &[u8]) {
        let ranges = partitioner::split(payload.len(), self.config.shard_count());

        let mut tasks = JoinSet::new();
        for (i, range) in ranges.into_iter().enumerate() {
            let endpoint = self.config.nodes[i].clone();
            let timeout = self.config.node_timeout;
            let file = file.to_string();
            let part = payload[range].to_vec();
            let index = (i + 1) as u32;
            tasks.spawn(async move {
                let sent = bounded(timeout, send_shard(&endpoint, &file, index, &part)).await;
                (index, endpoint, sent)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let Ok((index, endpoint, sent)) = joined else {
                continue;
            };
            if let Err(e) = sent {
                tracing::error!(
                    "storing shard {} of {:?} on {} failed: {}",
                    index,
                    file,
                    endpoint.addr(),
                    e
                );
            }
        }
    }

    /// Requests `<file>.part<i>` from node i and reassembles whatever came
    /// back in index order.
    ///
    /// The file counts as found if at least one shard was found; with an
    /// interior shard missing the returned bytes are silently truncated
    /// (see `partitioner::reassemble`).
    pub async fn fetch(&self, file: &str) -> Option<Vec<u8>> {
        let count = self.config.shard_count();
        let mut parts: Vec<Option<Vec<u8>>> = vec![None; count];

        let mut tasks = JoinSet::new();
        for (i, endpoint) in self.config.nodes.iter().cloned().enumerate() {
            let timeout = self.config.node_timeout;
            let shard = shard_name(file, (i + 1) as u32);
            tasks.spawn(async move {
                let fetched = bounded(timeout, fetch_shard(&endpoint, &shard)).await;
                (i, endpoint, shard, fetched)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let Ok((i, endpoint, shard, fetched)) = joined else {
                continue;
            };
            match fetched {
                Ok(Some(bytes)) => parts[i] = Some(bytes),
                Ok(None) => {
                    tracing::debug!("shard {} not found on {}", shard, endpoint.addr())
                }
                Err(e) => {
                    tracing::warn!("fetching {} from {} failed: {}", shard, endpoint.addr(), e)
                }
            }
        }

        if parts.iter().all(Option::is_none) {
            return None;
        }
        Some(partitioner::reassemble(parts))
    }

    /// Asks every node to delete its shards matching the base-name prefix
    /// and folds the answers into the tri-state aggregate.
    ///
    /// A connection error or timeout carries the same weight as a node-side
    /// partial failure. A node only counts as having deleted something when
    /// it reports a full `all-deleted`.
    pub async fn delete(&self, base: &str) -> DeleteStatus {
        let mut tasks = JoinSet::new();
        for endpoint in self.config.nodes.iter().cloned() {
            let timeout = self.config.node_timeout;
            let base = base.to_string();
            tasks.spawn(async move {
                let outcome = bounded(timeout, delete_on_node(&endpoint, &base)).await;
                (endpoint, outcome)
            });
        }

        let mut any_deleted = false;
        let mut any_error = false;
        while let Some(joined) = tasks.join_next().await {
            let Ok((endpoint, outcome)) = joined else {
                continue;
            };
            match outcome {
                Ok(DeleteOutcome::AllDeleted) => any_deleted = true,
                Ok(DeleteOutcome::NoneFound) => {}
                Ok(DeleteOutcome::PartialFailure) => {
                    tracing::warn!("{} only partially deleted {:?}", endpoint.addr(), base);
                    any_error = true;
                }
                Err(e) => {
                    tracing::warn!("delete on {} failed: {}", endpoint.addr(), e);
                    any_error = true;
                }
            }
        }

        match (any_deleted, any_error) {
            (true, false) => DeleteStatus::AllDeleted,
            (true, true) => DeleteStatus::Partial,
            (false, _) => DeleteStatus::Failed,
        }
    }

    /// Union of every reachable node's raw shard-name listing, deduplicated
    /// and sorted. Entries are shard names (`file.part1`), not logical file
    /// names — the pass-through is intentional.
    pub async fn list(&self) -> Vec<String> {
        let mut tasks = JoinSet::new();
        for endpoint in self.config.nodes.iter().cloned() {
            let timeout = self.config.node_timeout;
            tasks.spawn(async move {
                let listed = bounded(timeout, list_on_node(&endpoint)).await;
                (endpoint, listed)
            });
        }

        let mut union = HashSet::new();
        while let Some(joined) = tasks.join_next().await {
            let Ok((endpoint, listed)) = joined else {
                continue;
            };
            match listed {
                Ok(names) => union.extend(names),
                Err(e) => tracing::warn!("listing {} failed: {}", endpoint.addr(), e),
            }
        }

        let mut names: Vec<String> = union.into_iter().collect();
        names.sort();
        names
    }
}

// Applies the per-round-trip bound; an elapsed timer weighs the same as a
// connection error everywhere it is folded.
async fn bounded<T>(
    timeout: Duration,
    exchange: impl std::future::Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(timeout, exchange).await {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout(timeout)),
    }
}

async fn connect(endpoint: &NodeEndpoint) -> Result<BufStream<TcpStream>> {
    let stream = TcpStream::connect((endpoint.host.as_str(), endpoint.port))
        .await
        .map_err(Error::Connection)?;
    Ok(BufStream::new(stream))
}

// Fire-and-forget by protocol: the node persists and closes without an
// acknowledgment, so a fully written request is the success signal.
async fn send_shard(
    endpoint: &NodeEndpoint,
    file: &str,
    index: u32,
    payload: &[u8],
) -> Result<()> {
    let mut stream = connect(endpoint).await?;
    codec::write_action(&mut stream, Action::Send).await?;
    codec::write_string(&mut stream, file).await?;
    codec::write_count(&mut stream, index).await?;
    codec::write_payload(&mut stream, payload).await?;
    stream.shutdown().await.map_err(Error::Connection)?;
    Ok(())
}

async fn fetch_shard(endpoint: &NodeEndpoint, shard: &str) -> Result<Option<Vec<u8>>> {
    let mut stream = connect(endpoint).await?;
    codec::write_action(&mut stream, Action::Get).await?;
    codec::write_string(&mut stream, shard).await?;
    codec::flush(&mut stream).await?;

    let flag = codec::read_string(&mut stream).await?;
    match flag.as_str() {
        STATUS_FOUND => Ok(Some(codec::read_payload(&mut stream).await?)),
        STATUS_NOT_FOUND => Ok(None),
        other => Err(Error::Protocol(format!(
            "unexpected fetch status {:?}",
            other
        ))),
    }
}

async fn delete_on_node(endpoint: &NodeEndpoint, base: &str) -> Result<DeleteOutcome> {
    let mut stream = connect(endpoint).await?;
    codec::write_action(&mut stream, Action::Delete).await?;
    codec::write_string(&mut stream, base).await?;
    codec::flush(&mut stream).await?;

    let token = codec::read_string(&mut stream).await?;
    DeleteOutcome::parse(&token)
}

async fn list_on_node(endpoint: &NodeEndpoint) -> Result<Vec<String>> {
    let mut stream = connect(endpoint).await?;
    codec::write_action(&mut stream, Action::List).await?;
    codec::flush(&mut stream).await?;

    let count = codec::read_count(&mut stream).await?;
    let mut names = Vec::with_capacity(count as usize);
    for _ in 0..count {
        names.push(codec::read_string(&mut stream).await?);
    }
    Ok(names)
}
