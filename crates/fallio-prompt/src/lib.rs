// SPDX-FileCopyrightText: 2026 Fallio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Context normalization and prompt assembly.
//!
//! Turns raw request fields into a [`GenerationContext`] and renders the
//! provider-neutral system prompt and user message. Pure and
//! deterministic: no I/O, no clocks, no randomness.

pub mod assembler;
pub mod category;
pub mod context;
pub mod personas;

pub use assembler::{build_system_prompt, build_user_message, language_directive};
pub use category::FortuneCategory;
pub use context::{ContextParts, GenerationContext};
pub use personas::default_persona;
