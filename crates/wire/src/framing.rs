// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Newline-delimited JSON line framing, shared by every transport.
//!
//! One JSON value per line, terminated by `\n`; readers buffer by line
//! rather than by a length prefix, and writers serialize access per
//! connection so concurrent callers never interleave partial lines.

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// Generous cap on a single line's length. requires
/// accommodating at least 1 MiB; we allow a wide margin above that so a
/// pathological `zpool status` dump on a pool with thousands of vdevs
/// doesn't get truncated mid-frame.
pub const MAX_LINE_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("connection closed")]
    ConnectionClosed,
    #[error("read timed out")]
    Timeout,
    #[error("malformed frame: {0}")]
    Malformed(String),
    #[error("line exceeded {MAX_LINE_BYTES} bytes")]
    LineTooLong,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Read one line (without its trailing `\n`/`\r\n`) from a buffered async
/// reader. Returns `Ok(None)` on clean EOF with no partial data buffered.
pub async fn read_line<R>(reader: &mut BufReader<R>) -> Result<Option<String>, ProtocolError>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    let n = reader.read_until(b'\n', &mut buf).await?;
    if n == 0 {
        return Ok(None);
    }
    if buf.len() > MAX_LINE_BYTES {
        return Err(ProtocolError::LineTooLong);
    }
    while buf.last() == Some(&b'\n') || buf.last() == Some(&b'\r') {
        buf.pop();
    }
    let line = String::from_utf8(buf)
        .map_err(|e| ProtocolError::Malformed(format!("invalid UTF-8: {e}")))?;
    Ok(Some(line))
}

/// Serialize `value` and write it as one line, appending `\n` if the
/// caller's string doesn't already end with one. Callers are responsible
/// for holding the connection's write lock across this call so concurrent
/// writers never interleave partial frames.
pub async fn write_line<W>(writer: &mut W, line: &str) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(line.as_bytes()).await?;
    if !line.ends_with('\n') {
        writer.write_all(b"\n").await?;
    }
    writer.flush().await?;
    Ok(())
}

/// Serialize a JSON-able value to a single line (panics never — callers
/// get a `Malformed` error instead, since a `Serialize` impl failing is a
/// programmer error but must never crash the daemon).
pub fn encode_line<T: serde::Serialize>(value: &T) -> Result<String, ProtocolError> {
    serde_json::to_string(value).map_err(|e| ProtocolError::Malformed(e.to_string()))
}

pub fn decode_line<T: serde::de::DeserializeOwned>(line: &str) -> Result<T, ProtocolError> {
    serde_json::from_str(line).map_err(|e| ProtocolError::Malformed(e.to_string()))
}
