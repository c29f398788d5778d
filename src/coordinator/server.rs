//! Client-Facing Request Handling
//!
//! Accept loop and dispatch for the coordinator's four operations. Every
//! dispatched operation answers the client — a mid-operation node failure
//! is folded into the aggregate result by the service layer and never
//! surfaces as a dropped client connection. Only a malformed request
//! (protocol error) closes the connection without a response.

use crate::coordinator::service::Coordinator;
use crate::error::{Error, Result};
use crate::protocol::codec;
use crate::protocol::types::{Action, STORE_ACK};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite, BufStream};
use tokio::net::TcpListener;

pub async fn run(listener: TcpListener, coordinator: Arc<Coordinator>) -> Result<()> {
    loop {
        let (stream, peer) = listener.accept().await.map_err(Error::Connection)?;
        let coordinator = coordinator.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_client(stream, &coordinator).await {
                tracing::error!("client request from {} failed: {}", peer, e);
            }
        });
    }
}

pub(crate) async fn handle_client<S>(stream: S, coordinator: &Coordinator) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut stream = BufStream::new(stream);
    match codec::read_action(&mut stream).await? {
        Action::Send => {
            let file = codec::read_string(&mut stream).await?;
            let payload = codec::read_payload(&mut stream).await?;
            tracing::info!("store {:?} ({} bytes)", file, payload.len());

            coordinator.store(&file, &payload).await;
            codec::write_string(&mut stream, STORE_ACK).await?;
        }
        Action::Get => {
            let file = codec::read_string(&mut stream).await?;
            tracing::info!("fetch {:?}", file);

            // Not-found is encoded as a zero-length payload on this hop.
            let payload = coordinator.fetch(&file).await.unwrap_or_default();
            codec::write_payload(&mut stream, &payload).await?;
        }
        Action::Delete => {
            let base = codec::read_string(&mut stream).await?;
            tracing::info!("delete {:?}", base);

            let status = coordinator.delete(&base).await;
            codec::write_string(&mut stream, status.token()).await?;
        }
        Action::List => {
            tracing::info!("list");

            let names = coordinator.list().await;
            codec::write_count(&mut stream, names.len() as u32).await?;
            for name in &names {
                codec::write_string(&mut stream, name).await?;
            }
        }
    }
    codec::flush(&mut stream).await
}
