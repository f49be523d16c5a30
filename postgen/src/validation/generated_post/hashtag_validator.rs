//! Hashtag validation

use crate::types::{GeneratedPost, PlatformConstraints};
use crate::validation::Validator;

/// Validates the hashtag list of a generated post.
///
/// Checks the count against the platform's window and the `#` prefix
/// convention: most platforms require it, Pinterest keywords must not
/// carry it. Offending entries are listed by example (capped at three)
/// so the feedback prompt stays short.
#[derive(Debug, Clone, Default)]
pub struct HashtagValidator;

const MAX_LISTED_OFFENDERS: usize = 3;

impl HashtagValidator {
    pub fn new() -> Self {
        Self
    }
}

impl Validator<GeneratedPost> for HashtagValidator {
    fn validate(&self, constraints: &PlatformConstraints, post: &GeneratedPost) -> Vec<String> {
        let mut violations = Vec::new();
        let name = post.platform.display_name();
        let count = post.hashtags.len();

        if count < constraints.min_hashtags || count > constraints.max_hashtags {
            violations.push(format!(
                "{} hashtags: incorrect count ({}). Must be {}-{}.",
                name, count, constraints.min_hashtags, constraints.max_hashtags
            ));
        }

        let blank: Vec<&String> = post
            .hashtags
            .iter()
            .filter(|h| h.trim().is_empty())
            .collect();
        if !blank.is_empty() {
            violations.push(format!(
                "{} hashtags: {} empty entr{} found.",
                name,
                blank.len(),
                if blank.len() == 1 { "y" } else { "ies" }
            ));
        }

        if constraints.hashtag_prefix_required {
            let missing: Vec<&String> = post
                .hashtags
                .iter()
                .filter(|h| !h.trim().is_empty() && !h.starts_with('#'))
                .collect();
            if !missing.is_empty() {
                violations.push(format!(
                    "{} hashtags: missing '#' on: {:?}",
                    name,
                    missing
                        .iter()
                        .take(MAX_LISTED_OFFENDERS)
                        .map(|s| s.as_str())
                        .collect::<Vec<_>>()
                ));
            }
        } else {
            let prefixed: Vec<&String> = post
                .hashtags
                .iter()
                .filter(|h| h.starts_with('#'))
                .collect();
            if !prefixed.is_empty() {
                violations.push(format!(
                    "{} keywords: should not have '#': {:?}",
                    name,
                    prefixed
                        .iter()
                        .take(MAX_LISTED_OFFENDERS)
                        .map(|s| s.as_str())
                        .collect::<Vec<_>>()
                ));
            }
        }

        violations
    }
}
