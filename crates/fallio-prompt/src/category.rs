// SPDX-FileCopyrightText: 2026 Fallio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fortune-type normalization.
//!
//! Mobile clients send free-text fortune types in Turkish or English;
//! everything downstream (persona lookup, built-in defaults) works on a
//! small fixed category set.

use strum::Display;

/// Normalized fortune category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum FortuneCategory {
    Coffee,
    Tarot,
    Palm,
    Love,
    Dream,
    Default,
}

impl FortuneCategory {
    /// The persona-store key for this category.
    pub fn key(self) -> &'static str {
        match self {
            FortuneCategory::Coffee => "coffee",
            FortuneCategory::Tarot => "tarot",
            FortuneCategory::Palm => "palm",
            FortuneCategory::Love => "love",
            FortuneCategory::Dream => "dream",
            FortuneCategory::Default => "default",
        }
    }

    /// Case-insensitive substring matching against known Turkish and
    /// English spellings. Match order matters: earlier checks win.
    /// Unmatched types fall through to [`FortuneCategory::Default`].
    pub fn normalize(fortune_type: &str) -> FortuneCategory {
        let t = fortune_type.to_lowercase();
        if t.contains("kahve") || t.contains("coffee") {
            return FortuneCategory::Coffee;
        }
        if t.contains("tarot") {
            return FortuneCategory::Tarot;
        }
        if t.contains("el") || t.contains("palm") {
            return FortuneCategory::Palm;
        }
        if t.contains("katina") || t.contains("ask") || t.contains("love") {
            return FortuneCategory::Love;
        }
        if t.contains("ruya") || t.contains("dream") {
            return FortuneCategory::Dream;
        }
        FortuneCategory::Default
    }
}
