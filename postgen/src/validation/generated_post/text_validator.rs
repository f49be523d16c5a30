//! Post text validation

use crate::types::{GeneratedPost, PlatformConstraints};
use crate::validation::Validator;

/// Validates the body text of a generated post.
///
/// Checks that the text is non-empty and does not exceed the platform's
/// maximum length. Length is measured in characters, not bytes, since
/// platform limits are character limits.
#[derive(Debug, Clone, Default)]
pub struct TextValidator;

impl TextValidator {
    pub fn new() -> Self {
        Self
    }
}

impl Validator<GeneratedPost> for TextValidator {
    fn validate(&self, constraints: &PlatformConstraints, post: &GeneratedPost) -> Vec<String> {
        let mut violations = Vec::new();

        if post.text.trim().is_empty() {
            violations.push(format!(
                "{} text: must not be empty.",
                post.platform.display_name()
            ));
            return violations;
        }

        let length = post.text.chars().count();
        if length > constraints.max_text_length {
            violations.push(format!(
                "{} text: exceeds {} characters ({} chars).",
                post.platform.display_name(),
                constraints.max_text_length,
                length
            ));
        }

        violations
    }
}
