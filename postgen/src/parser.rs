//! Structured output parsing
//!
//! Coerces free-form model output into a [`GeneratedPost`]. This is an
//! explicit parse step with a tagged result: anything that cannot be
//! coerced to the schema comes back as a [`SchemaError`], never as a
//! partially-populated post.

use crate::types::{GeneratedPost, Platform, SchemaError};
use serde_json::Value;
use tracing::debug;

/// Field names models actually emit for the post body. The canonical name
/// is `text`; the rest are drift observed from per-platform phrasing in
/// prompts (tweet, caption, ...).
const TEXT_ALIASES: [&str; 5] = ["text", "content", "tweet", "caption", "post_text"];

/// `keywords` is accepted because unprefixed platforms invite it.
const HASHTAG_ALIASES: [&str; 2] = ["hashtags", "keywords"];

/// Parses raw model output into a [`GeneratedPost`] for `platform`.
///
/// The platform is stamped from the request rather than trusted from the
/// model output; the validator still flags a mismatch if the payload
/// declares a different one.
pub fn parse_generated_post(raw: &str, platform: Platform) -> Result<GeneratedPost, SchemaError> {
    let json_str = extract_json_object(raw)?;
    debug!("Extracted candidate JSON: {}", json_str);

    let value: Value = serde_json::from_str(json_str)
        .map_err(|e| SchemaError::MalformedJson(e.to_string()))?;

    let object = value
        .as_object()
        .ok_or_else(|| SchemaError::UnexpectedShape("top-level value is not an object".to_string()))?;

    let text = TEXT_ALIASES
        .iter()
        .find_map(|key| object.get(*key).and_then(Value::as_str))
        .ok_or_else(|| SchemaError::MissingField("text".to_string()))?;

    if text.trim().is_empty() {
        return Err(SchemaError::EmptyField("text".to_string()));
    }

    let hashtags = match HASHTAG_ALIASES.iter().find_map(|key| object.get(*key)) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(entries)) => {
            let mut hashtags = Vec::with_capacity(entries.len());
            for entry in entries {
                let tag = entry.as_str().ok_or_else(|| {
                    SchemaError::UnexpectedShape(format!(
                        "hashtags must be strings, got: {}",
                        entry
                    ))
                })?;
                hashtags.push(tag.to_string());
            }
            hashtags
        }
        Some(other) => {
            return Err(SchemaError::UnexpectedShape(format!(
                "hashtags must be an array, got: {}",
                other
            )))
        }
    };

    // The declared platform, when present and recognised, overrides the
    // stamp so the validator can catch a genuine mismatch.
    let platform = object
        .get("platform")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<Platform>().ok())
        .unwrap_or(platform);

    Ok(GeneratedPost {
        platform,
        text: text.to_string(),
        hashtags,
    })
}

/// Locates the outermost JSON object in `raw`, tolerating markdown code
/// fences and prose before or after the payload.
fn extract_json_object(raw: &str) -> Result<&str, SchemaError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(SchemaError::MalformedJson("output is empty".to_string()));
    }

    let start = trimmed
        .find('{')
        .ok_or_else(|| SchemaError::MalformedJson("no JSON object in output".to_string()))?;
    let end = trimmed
        .rfind('}')
        .filter(|end| *end > start)
        .ok_or_else(|| SchemaError::MalformedJson("unterminated JSON object".to_string()))?;

    Ok(&trimmed[start..=end])
}
