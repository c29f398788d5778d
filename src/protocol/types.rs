//! Protocol Vocabulary
//!
//! The action tokens and status strings exchanged on the wire, plus the
//! typed outcomes they map to. Constants define the exact bytes sent; the
//! enums are what the rest of the crate matches on.

use crate::error::{Error, Result};

// --- Action tokens (shared by both hops) ---

pub const ACTION_SEND: &str = "SEND";
pub const ACTION_GET: &str = "GET";
pub const ACTION_DELETE: &str = "DELETE";
pub const ACTION_LIST: &str = "LIST";

// --- Status strings ---

/// Node response flag for a fetch hit, followed by the payload.
pub const STATUS_FOUND: &str = "found";
/// Node response flag for a fetch miss; nothing follows.
pub const STATUS_NOT_FOUND: &str = "not found";
/// The single generic acknowledgment a store operation returns to the
/// client, regardless of per-node outcomes.
pub const STORE_ACK: &str = "file stored and partitioned";

/// The request verb at the head of every message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Send,
    Get,
    Delete,
    List,
}

impl Action {
    pub fn token(self) -> &'static str {
        match self {
            Action::Send => ACTION_SEND,
            Action::Get => ACTION_GET,
            Action::Delete => ACTION_DELETE,
            Action::List => ACTION_LIST,
        }
    }

    pub fn parse(token: &str) -> Option<Action> {
        match token {
            ACTION_SEND => Some(Action::Send),
            ACTION_GET => Some(Action::Get),
            ACTION_DELETE => Some(Action::Delete),
            ACTION_LIST => Some(Action::List),
            _ => None,
        }
    }
}

/// A single node's answer to a prefix delete.
///
/// `PartialFailure` means the node matched at least one shard but could not
/// remove all of them; the coordinator weighs it the same as a connection
/// error when aggregating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// At least one shard matched and every match was removed.
    AllDeleted,
    /// No stored shard name matched the prefix.
    NoneFound,
    /// At least one match, at least one removal failed.
    PartialFailure,
}

impl DeleteOutcome {
    pub fn token(self) -> &'static str {
        match self {
            DeleteOutcome::AllDeleted => "all-deleted",
            DeleteOutcome::NoneFound => "none-found",
            DeleteOutcome::PartialFailure => "partial-failure",
        }
    }

    pub fn parse(token: &str) -> Result<DeleteOutcome> {
        match token {
            "all-deleted" => Ok(DeleteOutcome::AllDeleted),
            "none-found" => Ok(DeleteOutcome::NoneFound),
            "partial-failure" => Ok(DeleteOutcome::PartialFailure),
            other => Err(Error::Protocol(format!(
                "unknown delete outcome {:?}",
                other
            ))),
        }
    }
}

/// The coordinator's aggregate delete result, as reported to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteStatus {
    /// At least one node deleted shards and no node erred.
    AllDeleted,
    /// At least one node deleted shards, but at least one node erred or
    /// reported a partial failure.
    Partial,
    /// No node deleted anything.
    Failed,
}

impl DeleteStatus {
    pub fn token(self) -> &'static str {
        match self {
            DeleteStatus::AllDeleted => "all-deleted",
            DeleteStatus::Partial => "partially-deleted",
            DeleteStatus::Failed => "delete-failed",
        }
    }

    pub fn parse(token: &str) -> Result<DeleteStatus> {
        match token {
            "all-deleted" => Ok(DeleteStatus::AllDeleted),
            "partially-deleted" => Ok(DeleteStatus::Partial),
            "delete-failed" => Ok(DeleteStatus::Failed),
            other => Err(Error::Protocol(format!(
                "unknown delete status {:?}",
                other
            ))),
        }
    }
}

/// Derived persisted identity of one shard. Shard indices are 1-based on
/// the wire: index `i` lives on node endpoint `i`.
pub fn shard_name(file: &str, index: u32) -> String {
    format!("{}.part{}", file, index)
}
