//! Framing Primitives
//!
//! Reads and writes the three field encodings over any async stream.
//! Callers are expected to wrap the connection in a buffered stream and
//! flush once the full message has been written.
//!
//! An unexpected end of stream while a declared length is still outstanding
//! is a malformed frame and surfaces as [`Error::Protocol`]; every other
//! I/O failure is an [`Error::Connection`].

use crate::error::{Error, Result};
use crate::protocol::types::Action;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

pub async fn write_string<W>(writer: &mut W, value: &str) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let bytes = value.as_bytes();
    if bytes.len() > u16::MAX as usize {
        return Err(Error::Protocol(format!(
            "string field too long: {} bytes",
            bytes.len()
        )));
    }
    writer.write_u16(bytes.len() as u16).await.map_err(write_err)?;
    writer.write_all(bytes).await.map_err(write_err)?;
    Ok(())
}

pub async fn read_string<R>(reader: &mut R) -> Result<String>
where
    R: AsyncRead + Unpin,
{
    let len = reader.read_u16().await.map_err(read_err)? as usize;
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).await.map_err(read_err)?;
    String::from_utf8(buf).map_err(|_| Error::Protocol("text field is not valid UTF-8".to_string()))
}

pub async fn write_count<W>(writer: &mut W, value: u32) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_u32(value).await.map_err(write_err)
}

pub async fn read_count<R>(reader: &mut R) -> Result<u32>
where
    R: AsyncRead + Unpin,
{
    reader.read_u32().await.map_err(read_err)
}

pub async fn write_payload<W>(writer: &mut W, payload: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer
        .write_u64(payload.len() as u64)
        .await
        .map_err(write_err)?;
    writer.write_all(payload).await.map_err(write_err)?;
    Ok(())
}

pub async fn read_payload<R>(reader: &mut R) -> Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let len = reader.read_u64().await.map_err(read_err)? as usize;
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).await.map_err(read_err)?;
    Ok(buf)
}

pub async fn write_action<W>(writer: &mut W, action: Action) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    write_string(writer, action.token()).await
}

pub async fn read_action<R>(reader: &mut R) -> Result<Action>
where
    R: AsyncRead + Unpin,
{
    let token = read_string(reader).await?;
    Action::parse(&token)
        .ok_or_else(|| Error::Protocol(format!("unrecognized action token {:?}", token)))
}

pub async fn flush<W>(writer: &mut W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.flush().await.map_err(write_err)
}

fn read_err(e: std::io::Error) -> Error {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        Error::Protocol("frame truncated: declared length exceeds remaining stream".to_string())
    } else {
        Error::Connection(e)
    }
}

fn write_err(e: std::io::Error) -> Error {
    Error::Connection(e)
}
