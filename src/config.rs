//! Startup Configuration
//!
//! Loads the `key=value` configuration file shared by every process and the
//! client, and turns it into one immutable [`Config`] value. The value is
//! constructed once before the core starts and passed explicitly to the
//! coordinator and node constructors; nothing else in the crate parses
//! configuration.
//!
//! Recognized keys:
//!
//! - `COORDINATOR_HOST` / `COORDINATOR_PORT` — the coordinator endpoint.
//! - `NODE_HOSTS` — comma-separated node hosts; the list length fixes the
//!   shard count N.
//! - `NODE_PORT` — the port shared by all nodes.
//! - `NODE_STORAGE_PATH` — base path under which each node creates its
//!   port-keyed storage root.
//! - `NODE_TIMEOUT_MS` — bound on every coordinator↔node round-trip
//!   (optional, default 5000).

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_NODE_TIMEOUT: Duration = Duration::from_millis(5000);

/// One storage node address. The position of an endpoint in
/// [`Config::nodes`] is significant: shard `i` is always routed to
/// endpoint `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeEndpoint {
    pub host: String,
    pub port: u16,
}

impl NodeEndpoint {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// The immutable configuration value handed to every constructor.
#[derive(Debug, Clone)]
pub struct Config {
    pub coordinator_host: String,
    pub coordinator_port: u16,
    pub nodes: Vec<NodeEndpoint>,
    pub node_port: u16,
    pub storage_path: PathBuf,
    pub node_timeout: Duration,
}

impl Config {
    /// Number of shards every stored file is split into. Fixed at process
    /// start by the length of the node table.
    pub fn shard_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::parse(&contents)
    }

    /// Parses the `key=value` format. Blank lines and `#` comments are
    /// ignored; keys and values are trimmed.
    pub fn parse(contents: &str) -> Result<Self> {
        let mut values = HashMap::new();
        for (lineno, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(Error::Config(format!(
                    "line {}: expected key=value, got {:?}",
                    lineno + 1,
                    line
                )));
            };
            values.insert(key.trim().to_string(), value.trim().to_string());
        }

        let coordinator_host = required(&values, "COORDINATOR_HOST")?;
        let coordinator_port = port(&values, "COORDINATOR_PORT")?;
        let node_port = port(&values, "NODE_PORT")?;

        let nodes: Vec<NodeEndpoint> = required(&values, "NODE_HOSTS")?
            .split(',')
            .map(str::trim)
            .filter(|host| !host.is_empty())
            .map(|host| NodeEndpoint {
                host: host.to_string(),
                port: node_port,
            })
            .collect();
        if nodes.is_empty() {
            return Err(Error::Config(
                "NODE_HOSTS must name at least one node".to_string(),
            ));
        }

        let storage_path = PathBuf::from(required(&values, "NODE_STORAGE_PATH")?);

        let node_timeout = match values.get("NODE_TIMEOUT_MS") {
            Some(ms) => Duration::from_millis(ms.parse().map_err(|_| {
                Error::Config(format!("NODE_TIMEOUT_MS is not a number: {:?}", ms))
            })?),
            None => DEFAULT_NODE_TIMEOUT,
        };

        Ok(Config {
            coordinator_host,
            coordinator_port,
            nodes,
            node_port,
            storage_path,
            node_timeout,
        })
    }
}

fn required(values: &HashMap<String, String>, key: &str) -> Result<String> {
    values
        .get(key)
        .cloned()
        .ok_or_else(|| Error::Config(format!("missing required key {}", key)))
}

fn port(values: &HashMap<String, String>, key: &str) -> Result<u16> {
    required(values, key)?
        .parse()
        .map_err(|_| Error::Config(format!("{} is not a valid port", key)))
}
