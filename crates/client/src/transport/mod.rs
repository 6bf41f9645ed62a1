// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The three client-side transports: anonymous pipe (via
//! the privilege-escalated launcher), Unix-domain socket, and TLS-TCP
//! (agent mode). Each produces a [`Connection`]: a boxed async
//! reader/writer pair plus enough bookkeeping for [`crate::runtime`] to
//! own daemon lifecycle correctly.

pub mod pipe;
pub mod tls;
pub mod uds;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::process::Child;

/// Type-erased half of a transport, generic over whichever concrete
/// stream type produced it (`ChildStdout`, `OwnedReadHalf`,
/// `ReadHalf<TlsStream<TcpStream>>`, ...), collapsed to trait objects
/// since the client runtime stores exactly one active transport at a
/// time behind a single concrete type.
pub type BoxedReader = Box<dyn AsyncRead + Unpin + Send>;
pub type BoxedWriter = Box<dyn AsyncWrite + Unpin + Send>;

/// One established connection to a daemon, ready for the version/auth
/// handshake (if any) to have already completed.
pub struct Connection {
    pub reader: BoxedReader,
    pub writer: BoxedWriter,
    /// `true` if this client spawned the daemon process and therefore owns
    /// its lifetime ("owns_daemon"). Only ever true for the
    /// pipe transport.
    pub owns_daemon: bool,
    /// `true` if the connection is TLS-encrypted (for UI display only).
    pub tls_active: bool,
    /// The spawned child process, present only in pipe mode, so
    /// [`crate::runtime::ClientRuntime`] can terminate it on close.
    pub child: Option<Child>,
}

impl Connection {
    pub fn plain(reader: BoxedReader, writer: BoxedWriter, owns_daemon: bool) -> Self {
        Self { reader, writer, owns_daemon, tls_active: false, child: None }
    }
}

/// Split an owned `AsyncRead + AsyncWrite` stream into boxed halves using
/// `tokio::io::split`, the one splitting mechanism that works uniformly
/// across `UnixStream`, `TcpStream`, and `tokio_rustls::client::TlsStream`
/// (unlike `into_split`, which only some of those types expose).
pub fn split_boxed<S>(stream: S) -> (BoxedReader, BoxedWriter)
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (r, w) = tokio::io::split(stream);
    (Box::new(r), Box::new(w))
}
