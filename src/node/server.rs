//! Node Request Handling
//!
//! Accept loop plus one handler per action. Every inbound connection gets
//! its own task; a handler error is logged and the connection dropped
//! without a response, which is the protocol's only error signal at this
//! level.

use crate::error::{Error, Result};
use crate::node::storage::ShardStore;
use crate::protocol::codec;
use crate::protocol::types::{shard_name, Action, STATUS_FOUND, STATUS_NOT_FOUND};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite, BufStream};
use tokio::net::TcpListener;

pub async fn run(listener: TcpListener, store: Arc<ShardStore>) -> Result<()> {
    loop {
        let (stream, peer) = listener.accept().await.map_err(Error::Connection)?;
        let store = store.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, &store).await {
                tracing::error!("request from {} failed: {}", peer, e);
            }
        });
    }
}

pub(crate) async fn handle_connection<S>(stream: S, store: &ShardStore) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut stream = BufStream::new(stream);
    match codec::read_action(&mut stream).await? {
        Action::Send => handle_store(&mut stream, store).await,
        Action::Get => handle_fetch(&mut stream, store).await,
        Action::Delete => handle_delete(&mut stream, store).await,
        Action::List => handle_list(&mut stream, store).await,
    }
}

// A shard store request carries no response: the coordinator takes a fully
// written request as success, and a disk failure aborts the connection.
async fn handle_store<S>(stream: &mut BufStream<S>, store: &ShardStore) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let file = codec::read_string(stream).await?;
    let index = codec::read_count(stream).await?;
    let payload = codec::read_payload(stream).await?;

    let name = shard_name(&file, index);
    store.store(&name, &payload).await?;
    tracing::info!("stored shard {} ({} bytes)", name, payload.len());
    Ok(())
}

async fn handle_fetch<S>(stream: &mut BufStream<S>, store: &ShardStore) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let name = codec::read_string(stream).await?;
    match store.fetch(&name).await? {
        Some(bytes) => {
            codec::write_string(stream, STATUS_FOUND).await?;
            codec::write_payload(stream, &bytes).await?;
        }
        None => {
            codec::write_string(stream, STATUS_NOT_FOUND).await?;
        }
    }
    codec::flush(stream).await
}

async fn handle_delete<S>(stream: &mut BufStream<S>, store: &ShardStore) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let base = codec::read_string(stream).await?;
    let outcome = store.delete_by_prefix(&base).await;
    codec::write_string(stream, outcome.token()).await?;
    codec::flush(stream).await
}

async fn handle_list<S>(stream: &mut BufStream<S>, store: &ShardStore) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let names = store.list().await;
    codec::write_count(stream, names.len() as u32).await?;
    for name in &names {
        codec::write_string(stream, name).await?;
    }
    codec::flush(stream).await
}
