// SPDX-FileCopyrightText: 2026 Fallio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Fallio integration tests.

pub mod scripted_provider;

pub use scripted_provider::ScriptedProvider;
