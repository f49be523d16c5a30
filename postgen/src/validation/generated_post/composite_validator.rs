//! Composite validator that combines all generated-post validation logic

use super::{HashtagValidator, TextValidator};
use crate::types::{GeneratedPost, Platform, PlatformConstraints, ValidationResult};
use crate::validation::Validator;

/// Composite validator that performs complete validation of a generated post.
///
/// This validator combines:
/// - Text validation (non-empty, within the platform length limit)
/// - Hashtag validation (count window, prefix convention)
/// - A platform check (the post targets the platform it was requested for)
///
/// This provides a single entry point for post validation. The result
/// enumerates every violated constraint, not just the first.
#[derive(Debug, Clone, Default)]
pub struct PostValidator {
    text_validator: TextValidator,
    hashtag_validator: HashtagValidator,
}

impl PostValidator {
    pub fn new() -> Self {
        Self {
            text_validator: TextValidator::new(),
            hashtag_validator: HashtagValidator::new(),
        }
    }

    /// Validates `post` against the constraints for `expected_platform`.
    ///
    /// Pure and deterministic; invalid content comes back as a
    /// [`ValidationResult`] with `valid == false`, never as an error.
    pub fn validate_post(
        &self,
        expected_platform: Platform,
        constraints: &PlatformConstraints,
        post: &GeneratedPost,
    ) -> ValidationResult {
        let mut violations = Vec::new();

        if post.platform != expected_platform {
            violations.push(format!(
                "Post targets {} but {} was requested.",
                post.platform.display_name(),
                expected_platform.display_name()
            ));
        }

        violations.extend(self.text_validator.validate(constraints, post));
        violations.extend(self.hashtag_validator.validate(constraints, post));

        ValidationResult::failed(violations)
    }
}
