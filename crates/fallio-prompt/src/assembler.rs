// SPDX-FileCopyrightText: 2026 Fallio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt assembly: two pure functions of (context, persona).
//!
//! Both functions are referentially transparent — no clocks, no
//! randomness — so identical inputs always produce byte-identical
//! prompt strings. Tests depend on this.

use std::fmt::Write;

use crate::context::GenerationContext;
use crate::personas::default_persona;

/// Assemble the system prompt: persona body, language directive, and the
/// fixed behavioral rules.
///
/// `persona_override` is the admin-stored persona body for the context's
/// category; `None` falls back to the built-in default.
pub fn build_system_prompt(ctx: &GenerationContext, persona_override: Option<&str>) -> String {
    let persona = persona_override
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| default_persona(ctx.category));

    let language_instruction = language_directive(ctx.language_or_default());

    format!(
        "{persona}\n\n{language_instruction}\n\nCORE RULES:\n\
         1. Be authentic. Do not say \"I am an AI\". Act as the persona.\n\
         2. If images are provided, YOU MUST REFERENCE THEM.\n\
         3. Use the user's provided context (Zodiac, Job, etc.) to personalize the reading.\n\
         4. Structure your response nicely with paragraphs. Do not use Markdown headers like '##'. Use mystical separators if needed."
    )
}

/// The output-language directive for a language code.
///
/// Recognized locales get a tailored directive; anything else gets the
/// generic form naming the code — never an empty directive.
pub fn language_directive(lang: &str) -> String {
    if lang.starts_with("tr") {
        return "ÇIKTI DİLİ: TÜRKÇE. (Kesinlikle Türkçe yanıt ver). Üslubun samimi, 'Canım', 'Bakıyorum da...' gibi geleneksel falcı ağzına yakın ama profesyonel olsun.".to_string();
    }
    if lang.starts_with("en") {
        return "OUTPUT LANGUAGE: ENGLISH. Use a mystical, engaging tone. You are a wise fortune teller. Use phrases like 'I see...', 'The cards reveal...'.".to_string();
    }
    if lang.starts_with("de") {
        return "AUSGABESPRACHE: DEUTSCH. Antworte in einem mystischen, aber professionellen Ton. Du bist eine weise Wahrsagerin. Benutze Phrasen wie 'Ich sehe...', 'Die Karten offenbaren...'.".to_string();
    }
    if lang.starts_with("fr") {
        return "LANGUE DE SORTIE : FRANÇAIS. Utilisez un ton mystique et engageant. Vous êtes une voyante sage.".to_string();
    }
    if lang.starts_with("es") {
        return "IDIOMA DE SALIDA: ESPAÑOL. Usa un tono místico y cautivador. Eres una adivina sabia.".to_string();
    }
    if lang.starts_with("az") {
        return "ÇIXIŞ DİLİ: AZƏRBAYCAN TÜRKCƏSİ. Səmimi və peşəkar falçı tonunda danış. 'Canım', 'Baxıram ki...' kimi ifadələr işlət.".to_string();
    }
    format!(
        "OUTPUT LANGUAGE: {}. Translate your mystical persona to this language. Be wise and professional.",
        lang.to_uppercase()
    )
}

/// Render the user message: every context field, always in the same
/// shape, with already-normalized placeholder values for absences.
pub fn build_user_message(ctx: &GenerationContext) -> String {
    let mut message = format!(
        "Please interpret my fortune. Here are my details:\n\n\
         - **Fortune Type:** {}\n\
         - **Zodiac Sign:** {}\n\
         - **Gender:** {}\n\
         - **Job/Career:** {}\n\
         - **Relationship Status:** {}\n\
         - **My Question/Note:** \"{}\"",
        ctx.fortune_type, ctx.zodiac_sign, ctx.gender, ctx.job, ctx.relationship_status, ctx.note
    );

    if let Some(cards) = selected_cards(ctx) {
        message.push_str("\n\n**SELECTED CARDS (The Spread):**");
        for (i, card) in cards.iter().enumerate() {
            let _ = write!(message, "\n{}. {}", i + 1, card);
        }
        message.push_str(
            "\n\nAnalyze these specific cards and their positions in the spread regarding my question.",
        );
    }

    if let Some(category) = ctx.metadata.get("category").and_then(|v| v.as_str()) {
        let _ = write!(message, "\n- **Focus Category:** {category}");
    }

    if ctx.image_count > 0 {
        let _ = write!(
            message,
            "\n\nI have visually attached {} images of my cup/hand/spread. Look at them closely. Describe what you see in the images to prove you are really reading them.",
            ctx.image_count
        );
    }

    if let Some(lang) = &ctx.language {
        let _ = write!(
            message,
            "\n\nIMPORTANT: Please write your response in the language code: \"{lang}\"."
        );
    }

    message
}

/// Selected card names from metadata, when present and non-empty.
fn selected_cards(ctx: &GenerationContext) -> Option<Vec<String>> {
    let cards: Vec<String> = ctx
        .metadata
        .get("selected_cards")?
        .as_array()?
        .iter()
        .filter_map(|v| v.as_str().map(|s| s.to_string()))
        .collect();
    if cards.is_empty() { None } else { Some(cards) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextParts;
    use serde_json::json;

    fn tarot_context() -> GenerationContext {
        GenerationContext::build(ContextParts {
            fortune_type: "tarot".into(),
            zodiac_sign: Some("Aries".into()),
            note: Some("will I get the job?".into()),
            metadata: Some(json!({"selected_cards": ["The Tower", "The Star"]})),
            language: Some("en".into()),
            ..Default::default()
        })
    }

    #[test]
    fn prompt_assembly_is_deterministic() {
        let ctx = tarot_context();
        assert_eq!(
            build_system_prompt(&ctx, None),
            build_system_prompt(&ctx, None)
        );
        assert_eq!(build_user_message(&ctx), build_user_message(&ctx));
    }

    #[test]
    fn tarot_scenario_renders_cards_as_numbered_list() {
        let message = build_user_message(&tarot_context());
        assert!(message.contains("Aries"), "got: {message}");
        assert!(message.contains("will I get the job?"), "got: {message}");
        assert!(message.contains("1. The Tower"), "got: {message}");
        assert!(message.contains("2. The Star"), "got: {message}");
    }

    #[test]
    fn supported_languages_get_their_directive() {
        for (code, marker) in [
            ("tr", "ÇIKTI DİLİ: TÜRKÇE"),
            ("en", "OUTPUT LANGUAGE: ENGLISH"),
            ("de", "AUSGABESPRACHE: DEUTSCH"),
            ("fr", "LANGUE DE SORTIE : FRANÇAIS"),
            ("es", "IDIOMA DE SALIDA: ESPAÑOL"),
            ("az", "ÇIXIŞ DİLİ: AZƏRBAYCAN"),
        ] {
            let directive = language_directive(code);
            assert!(directive.contains(marker), "{code}: {directive}");
        }
    }

    #[test]
    fn regional_variants_match_their_base_language() {
        assert!(language_directive("en-US").contains("OUTPUT LANGUAGE: ENGLISH"));
        assert!(language_directive("tr-TR").contains("TÜRKÇE"));
    }

    #[test]
    fn unrecognized_language_gets_generic_directive_never_empty() {
        let directive = language_directive("pt");
        assert!(directive.contains("OUTPUT LANGUAGE: PT"), "got: {directive}");
        assert!(!directive.is_empty());
    }

    #[test]
    fn system_prompt_contains_persona_and_directive() {
        let ctx = tarot_context();
        let prompt = build_system_prompt(&ctx, None);
        assert!(prompt.contains("Grand Master of Tarot"), "got: {prompt}");
        assert!(prompt.contains("OUTPUT LANGUAGE: ENGLISH"), "got: {prompt}");
        assert!(prompt.contains("CORE RULES"), "got: {prompt}");
    }

    #[test]
    fn stored_persona_overrides_builtin_but_blank_does_not() {
        let ctx = tarot_context();
        let prompt = build_system_prompt(&ctx, Some("You are a test oracle."));
        assert!(prompt.contains("You are a test oracle."));
        assert!(!prompt.contains("Grand Master of Tarot"));

        let prompt = build_system_prompt(&ctx, Some("   "));
        assert!(prompt.contains("Grand Master of Tarot"));
    }

    #[test]
    fn zero_images_never_claims_attachments() {
        let ctx = GenerationContext::build(ContextParts {
            fortune_type: "coffee".into(),
            ..Default::default()
        });
        let message = build_user_message(&ctx);
        assert!(!message.contains("visually attached"), "got: {message}");
    }

    #[test]
    fn image_count_is_stated_when_present() {
        let ctx = GenerationContext::build(ContextParts {
            fortune_type: "coffee".into(),
            image_count: 3,
            ..Default::default()
        });
        let message = build_user_message(&ctx);
        assert!(
            message.contains("attached 3 images"),
            "got: {message}"
        );
    }

    #[test]
    fn absent_fields_render_placeholders_in_message() {
        let ctx = GenerationContext::build(ContextParts {
            fortune_type: "dream".into(),
            ..Default::default()
        });
        let message = build_user_message(&ctx);
        assert!(message.contains("**Zodiac Sign:** Unknown"));
        assert!(message.contains("**Gender:** Not specified"));
        assert!(message.contains("\"No specific question.\""));
    }

    #[test]
    fn focus_category_metadata_is_rendered() {
        let ctx = GenerationContext::build(ContextParts {
            fortune_type: "card".into(),
            metadata: Some(json!({"category": "career"})),
            ..Default::default()
        });
        let message = build_user_message(&ctx);
        assert!(message.contains("**Focus Category:** career"));
    }

    #[test]
    fn empty_card_list_is_ignored() {
        let ctx = GenerationContext::build(ContextParts {
            fortune_type: "tarot".into(),
            metadata: Some(json!({"selected_cards": []})),
            ..Default::default()
        });
        let message = build_user_message(&ctx);
        assert!(!message.contains("SELECTED CARDS"));
    }

    #[test]
    fn language_reminder_follows_the_request_language() {
        let ctx = tarot_context();
        let message = build_user_message(&ctx);
        assert!(message.contains("language code: \"en\""));
    }
}
