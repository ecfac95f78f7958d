//! Instruction text for caption generation.
//!
//! Category, vibes and context are interpolated verbatim. Nothing is escaped,
//! so whatever the user typed reaches the model unchanged.

/// Stands in for an empty context so the model has nothing to embellish.
pub const NO_ADDITIONAL_INFO: &str = "No additional information provided.";

pub const VIBE_DELIMITER: &str = ", ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionPrompt {
    pub system: String,
    pub user: String,
}

pub fn build_caption_prompt(category: &str, vibes: &[String], context: &str) -> CaptionPrompt {
    let vibes = vibes.join(VIBE_DELIMITER);
    let context = if context.trim().is_empty() {
        NO_ADDITIONAL_INFO
    } else {
        context
    };

    let system = format!(
        "You write short-form social media captions. Produce a single, scroll-stopping \
caption for an Instagram post.

IMAGE CONTEXT:
- Type: {category}
- Vibes: {vibes}
- Description: {context}

RULES:
1. Write exactly ONE sentence of at most 10 words.
2. Match the tone of these vibes: {vibes}.
3. Stay true to the {category} subject; complement the image rather than describing it literally.
4. End the sentence with exactly one emoji that fits its mood.
5. Do not use hashtags unless the description contains them.
6. If the description says no additional information was provided, do not invent details about the image.
7. Output only the caption. Never explain your process or ask questions."
    );

    let user = format!(
        "Generate a trendy image caption based on the provided information:
- Image Type: {category}
- Vibes: {vibes}
- Additional Information: {context}"
    );

    CaptionPrompt { system, user }
}
