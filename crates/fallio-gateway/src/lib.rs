// SPDX-FileCopyrightText: 2026 Fallio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Fallio generation triggers.
//!
//! Exposes the synchronous generation endpoint, the cron trigger
//! endpoints (queue drain, horoscope batch, horoscope push), the model
//! catalog, and a public health probe.

pub mod auth;
pub mod handlers;
pub mod server;

pub use server::{GatewayState, build_router, start_server};
