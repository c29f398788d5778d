//! Coordinator Client
//!
//! A thin programmatic client for the coordinator's four operations. Each
//! call opens a fresh connection, performs one request/response exchange,
//! and closes it — connections are never pooled or reused. This is the
//! surface an interactive front end would sit on.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::protocol::codec;
use crate::protocol::types::{Action, DeleteStatus};
use tokio::io::BufStream;
use tokio::net::TcpStream;

pub struct Client {
    host: String,
    port: u16,
}

impl Client {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.coordinator_host.clone(), config.coordinator_port)
    }

    /// Stores a file under `name`. Returns the coordinator's generic
    /// acknowledgment string; per-node outcomes are not reported for
    /// stores.
    pub async fn store(&self, name: &str, payload: &[u8]) -> Result<String> {
        let mut stream = self.connect().await?;
        codec::write_action(&mut stream, Action::Send).await?;
        codec::write_string(&mut stream, name).await?;
        codec::write_payload(&mut stream, payload).await?;
        codec::flush(&mut stream).await?;

        codec::read_string(&mut stream).await
    }

    /// Fetches a file. `None` means the coordinator answered with a
    /// zero-length payload, which this hop's encoding uses for "not
    /// found". If some nodes were unreachable the bytes may be silently
    /// truncated (missing interior shards are skipped, not padded).
    pub async fn fetch(&self, name: &str) -> Result<Option<Vec<u8>>> {
        let mut stream = self.connect().await?;
        codec::write_action(&mut stream, Action::Get).await?;
        codec::write_string(&mut stream, name).await?;
        codec::flush(&mut stream).await?;

        let payload = codec::read_payload(&mut stream).await?;
        if payload.is_empty() {
            Ok(None)
        } else {
            Ok(Some(payload))
        }
    }

    /// Deletes every shard whose name starts with `name`, across all
    /// nodes. The returned status is the coordinator's tri-state
    /// aggregate.
    pub async fn delete(&self, name: &str) -> Result<DeleteStatus> {
        let mut stream = self.connect().await?;
        codec::write_action(&mut stream, Action::Delete).await?;
        codec::write_string(&mut stream, name).await?;
        codec::flush(&mut stream).await?;

        let token = codec::read_string(&mut stream).await?;
        DeleteStatus::parse(&token)
    }

    /// Lists the deduplicated union of raw shard names across all
    /// reachable nodes. Entries are `file.partN` names, not logical file
    /// names.
    pub async fn list(&self) -> Result<Vec<String>> {
        let mut stream = self.connect().await?;
        codec::write_action(&mut stream, Action::List).await?;
        codec::flush(&mut stream).await?;

        let count = codec::read_count(&mut stream).await?;
        let mut names = Vec::with_capacity(count as usize);
        for _ in 0..count {
            names.push(codec::read_string(&mut stream).await?);
        }
        Ok(names)
    }

    async fn connect(&self) -> Result<BufStream<TcpStream>> {
        let stream = TcpStream::connect((self.host.as_str(), self.port))
            .await
            .map_err(Error::Connection)?;
        Ok(BufStream::new(stream))
    }
}
