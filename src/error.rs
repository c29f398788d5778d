//! Error Taxonomy
//!
//! One variant per failure class. `Connection` and `Timeout` are recovered
//! per-node during fan-out and folded into aggregate outcomes; `Protocol`
//! drops the offending connection without a response; `Config` is fatal at
//! startup; `Storage` is a local disk failure on a node. Partial failure is
//! not an error: it is an aggregate status string defined in `protocol`.

use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("connection error: {0}")]
    Connection(#[source] std::io::Error),

    #[error("node did not answer within {0:?}")]
    Timeout(Duration),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("storage error: {0}")]
    Storage(#[source] std::io::Error),
}
