// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! zfdash-wire: the IPC protocol — newline-delimited JSON frames shared by
//! every transport (pipe, Unix-domain socket, TLS-TCP).
//!
//! Wire format: one UTF-8 JSON object per line, terminated
//! by `\n`. This is deliberately *not* the 4-byte length-prefixed framing
//! used elsewhere in this workspace's ancestry — see `framing` below.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod framing;
pub mod handshake;
pub mod request;
pub mod response;

pub use framing::{read_line, write_line, ProtocolError, MAX_LINE_BYTES};
pub use handshake::{
    AuthChallenge, AuthErrorCode, AuthOutcome, AuthResponse, AuthStatus, HelloAction, Ready,
    TlsErrorCode, VersionHello, PROTOCOL_VERSION,
};
pub use request::{Request, RequestMeta};
pub use response::Response;

#[cfg(test)]
mod wire_tests;
