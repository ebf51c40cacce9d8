// SPDX-FileCopyrightText: 2026 Fallio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for external collaborators.
//!
//! All traits use `#[async_trait]` for dynamic dispatch compatibility.

pub mod object_store;
pub mod provider;

pub use object_store::ObjectStore;
pub use provider::FortuneProvider;
