// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transport-specific accept loops. Each submodule produces
//! a stream of already-handshaken [`crate::connection::Connection`]s for
//! [`crate::dispatch::run`] to drive; the dispatcher itself never knows
//! which transport it's talking over.

pub mod pipe;
pub mod tls;
pub mod uds;
