//! Prompt construction for the generation pipeline
//!
//! Renders the user's request and the platform constraints into the model
//! prompt. Retry prompts carry the full violation list from the previous
//! attempt so the model can fix every issue in one regeneration.

use crate::types::{PlatformConstraints, PostRequest};

/// Renders prompts for initial generation and for validated retries.
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Builds the first-attempt prompt from the request and the platform
    /// constraints.
    pub fn initial(&self, request: &PostRequest, constraints: &PlatformConstraints) -> String {
        let platform = request.platform();
        let mut prompt = format!(
            "You are an expert social media manager. Your task is to create a {} post \
             about the topic below.\n\n\
             Topic: {}\n\
             Tone: {}\n",
            platform.display_name(),
            request.topic(),
            request.tone(),
        );

        if !request.keywords().is_empty() {
            prompt.push_str(&format!(
                "Keywords to work in: {}\n",
                request.keywords().join(", ")
            ));
        }

        prompt.push_str(&format!(
            "\nPlatform rules for {}. You MUST adhere to every rule:\n\
             - The post text must be at most {} characters.\n",
            platform.display_name(),
            constraints.max_text_length,
        ));

        if constraints.hashtag_prefix_required {
            prompt.push_str(&format!(
                "- Include between {} and {} hashtags, each starting with '#'.\n",
                constraints.min_hashtags, constraints.max_hashtags,
            ));
        } else {
            prompt.push_str(&format!(
                "- Include between {} and {} keywords, WITHOUT a '#' prefix.\n",
                constraints.min_hashtags, constraints.max_hashtags,
            ));
        }

        prompt.push_str(&format!(
            "\nOutput format:\n\
             You MUST respond with a single valid JSON object that strictly follows this \
             schema. Do not add any text before or after the JSON.\n\
             {{\"platform\": \"{}\", \"text\": \"<the post text>\", \
             \"hashtags\": [\"<hashtag>\", ...]}}\n",
            platform.as_str(),
        ));

        prompt
    }

    /// Builds a regeneration prompt: the initial prompt plus a feedback
    /// block listing every violation from the previous attempt.
    pub fn retry(
        &self,
        request: &PostRequest,
        constraints: &PlatformConstraints,
        violations: &[String],
    ) -> String {
        let mut prompt = self.initial(request, constraints);

        prompt.push_str("\n<PREVIOUS_ATTEMPT_FEEDBACK>\n");
        prompt.push_str("Your previous attempt failed validation. You MUST fix these issues:\n");
        for violation in violations {
            prompt.push_str(&format!("- {}\n", violation));
        }
        prompt.push_str("</PREVIOUS_ATTEMPT_FEEDBACK>\n");

        prompt
    }
}
