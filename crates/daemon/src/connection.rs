// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Server-side half of one accepted connection: a boxed reader plus a
//! mutex-guarded boxed writer, so concurrent worker tasks can each call
//! [`Connection::send_line`] without interleaving partial frames — writes
//! to a connection are always serialized.

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::Mutex as AsyncMutex;

use zfdash_wire::{write_line, ProtocolError};

pub type BoxedReader = Box<dyn AsyncRead + Unpin + Send>;
pub type BoxedWriter = Box<dyn AsyncWrite + Unpin + Send>;

/// One live connection, already past any transport-level handshake
/// (TLS upgrade, version hello, auth) by the time [`crate::dispatch`]
/// takes ownership of it.
pub struct Connection {
    pub reader: BoxedReader,
    writer: Arc<AsyncMutex<BoxedWriter>>,
}

impl Connection {
    pub fn new(reader: BoxedReader, writer: BoxedWriter) -> Self {
        Self { reader, writer: Arc::new(AsyncMutex::new(writer)) }
    }

    /// A cloneable handle to this connection's writer half, so worker
    /// tasks can reply without holding the connection's read loop.
    pub fn writer_handle(&self) -> ConnectionWriter {
        ConnectionWriter { writer: Arc::clone(&self.writer) }
    }

    pub async fn send_line(&self, line: &str) -> Result<(), ProtocolError> {
        let mut writer = self.writer.lock().await;
        write_line(&mut *writer, line).await
    }
}

/// A cheaply-cloneable handle to a connection's write half. Every worker
/// task dispatched for a given connection gets one of these rather than
/// the whole [`Connection`], so the read loop keeps `reader` to itself.
#[derive(Clone)]
pub struct ConnectionWriter {
    writer: Arc<AsyncMutex<BoxedWriter>>,
}

impl ConnectionWriter {
    pub async fn send_line(&self, line: &str) -> Result<(), ProtocolError> {
        let mut writer = self.writer.lock().await;
        write_line(&mut *writer, line).await
    }
}

/// Split an owned `AsyncRead + AsyncWrite` stream into boxed halves, the
/// same technique `zfdash-client::transport::split_boxed` uses, kept
/// un-shared between the two crates since the daemon never needs a
/// privileged client's transport types and vice versa.
pub fn split_boxed<S>(stream: S) -> (BoxedReader, BoxedWriter)
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (r, w) = tokio::io::split(stream);
    (Box::new(r), Box::new(w))
}
