// SPDX-FileCopyrightText: 2026 Fallio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The Fallio generation engine.
//!
//! Ties the prompt layer, provider adapters, and storage together:
//! provider orchestration with fallback, the attachment pipeline, the
//! fortune queue consumer, the horoscope batch generator, push dispatch,
//! and the provider model catalog.

pub mod attachments;
pub mod consumer;
pub mod horoscope;
pub mod models;
pub mod orchestrator;
pub mod push;

pub use attachments::{HttpObjectStore, fetch_image_parts};
pub use consumer::{ItemOutcome, QueueOptions, QueueReport, process_queue};
pub use horoscope::{HoroscopeOptions, UnitOutcome, run_batch, scopes_for};
pub use models::{ProviderModels, model_catalog};
pub use orchestrator::{GenerationOutcome, Orchestrator, teller_model_override};
pub use push::{PushClient, daily_horoscope_push, notify_fortune_completed};
