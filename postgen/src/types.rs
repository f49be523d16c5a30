use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use ulid::Ulid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(Ulid);

impl RequestId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    pub fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid)
    }

    pub fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RequestId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Ulid::from_string(s)?))
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

/// Target platform for a generated post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Twitter,
    Linkedin,
    Instagram,
    Facebook,
    Pinterest,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Twitter => "twitter",
            Platform::Linkedin => "linkedin",
            Platform::Instagram => "instagram",
            Platform::Facebook => "facebook",
            Platform::Pinterest => "pinterest",
        }
    }

    /// Human-readable platform name used in prompts and CLI output.
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Twitter => "X (Twitter)",
            Platform::Linkedin => "LinkedIn",
            Platform::Instagram => "Instagram",
            Platform::Facebook => "Facebook",
            Platform::Pinterest => "Pinterest",
        }
    }

    pub fn all() -> [Platform; 5] {
        [
            Platform::Twitter,
            Platform::Linkedin,
            Platform::Instagram,
            Platform::Facebook,
            Platform::Pinterest,
        ]
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "twitter" | "x" => Ok(Platform::Twitter),
            "linkedin" => Ok(Platform::Linkedin),
            "instagram" => Ok(Platform::Instagram),
            "facebook" => Ok(Platform::Facebook),
            "pinterest" => Ok(Platform::Pinterest),
            other => Err(SchemaError::UnknownPlatform(other.to_string())),
        }
    }
}

/// User input to the generation pipeline. Immutable once constructed;
/// construction fails with [`SchemaError`] rather than producing a request
/// the pipeline would have to reject later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostRequest {
    topic: String,
    platform: Platform,
    tone: Option<String>,
    keywords: Vec<String>,
}

impl PostRequest {
    pub fn new(topic: impl Into<String>, platform: Platform) -> Result<Self, SchemaError> {
        let topic = topic.into();
        if topic.trim().is_empty() {
            return Err(SchemaError::EmptyField("topic".to_string()));
        }
        Ok(Self {
            topic,
            platform,
            tone: None,
            keywords: Vec::new(),
        })
    }

    pub fn with_tone(mut self, tone: impl Into<String>) -> Self {
        let tone = tone.into();
        self.tone = if tone.trim().is_empty() { None } else { Some(tone) };
        self
    }

    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords
            .into_iter()
            .filter(|k| !k.trim().is_empty())
            .collect();
        self
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Requested tone, defaulting to "neutral" when the caller left it unset.
    pub fn tone(&self) -> &str {
        self.tone.as_deref().unwrap_or("neutral")
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

/// Structured post produced by the model invocation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedPost {
    pub platform: Platform,
    pub text: String,
    pub hashtags: Vec<String>,
}

/// Outcome of running the post validator. Invalid content is a normal
/// value here, not an error; every violated constraint is listed so a
/// regeneration prompt can address all of them at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub violations: Vec<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            violations: Vec::new(),
        }
    }

    pub fn failed(violations: Vec<String>) -> Self {
        Self {
            valid: violations.is_empty(),
            violations,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

/// Per-platform content constraints.
///
/// Pinterest is the odd one out: its "hashtags" are keywords and must NOT
/// carry a `#` prefix, hence `hashtag_prefix_required`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformConstraints {
    pub max_text_length: usize,
    pub min_hashtags: usize,
    pub max_hashtags: usize,
    pub hashtag_prefix_required: bool,
}

impl PlatformConstraints {
    pub fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::Twitter => Self {
                max_text_length: 280,
                min_hashtags: 2,
                max_hashtags: 3,
                hashtag_prefix_required: true,
            },
            Platform::Linkedin => Self {
                max_text_length: 3000,
                min_hashtags: 3,
                max_hashtags: 5,
                hashtag_prefix_required: true,
            },
            Platform::Instagram => Self {
                max_text_length: 2200,
                min_hashtags: 15,
                max_hashtags: 30,
                hashtag_prefix_required: true,
            },
            Platform::Facebook => Self {
                max_text_length: 63_206,
                min_hashtags: 0,
                max_hashtags: 10,
                hashtag_prefix_required: true,
            },
            Platform::Pinterest => Self {
                max_text_length: 500,
                min_hashtags: 10,
                max_hashtags: 15,
                hashtag_prefix_required: false,
            },
        }
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.max_text_length == 0 {
            return Err(PipelineError::InvalidConfig(
                "Max text length must be greater than 0".to_string(),
            ));
        }

        if self.min_hashtags > self.max_hashtags {
            return Err(PipelineError::InvalidConfig(format!(
                "Min hashtag count ({}) exceeds max hashtag count ({})",
                self.min_hashtags, self.max_hashtags
            )));
        }

        Ok(())
    }
}

/// Constraint lookup with optional per-platform overrides on top of the
/// built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConstraintSet {
    overrides: HashMap<Platform, PlatformConstraints>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_override(mut self, platform: Platform, constraints: PlatformConstraints) -> Self {
        self.overrides.insert(platform, constraints);
        self
    }

    pub fn for_platform(&self, platform: Platform) -> PlatformConstraints {
        self.overrides
            .get(&platform)
            .copied()
            .unwrap_or_else(|| PlatformConstraints::for_platform(platform))
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        for constraints in self.overrides.values() {
            constraints.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub base_url: String,
    pub model_name: String,
    pub api_key: String,
    pub temperature: f32,
    pub request_timeout: Duration,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model_name: "gpt-4o-mini".to_string(),
            api_key: String::new(),
            temperature: 0.7,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ModelConfig {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.base_url.is_empty() {
            return Err(ModelError::InvalidConfig(
                "Base URL cannot be empty".to_string(),
            ));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ModelError::InvalidConfig(format!(
                "Base URL must start with http:// or https://: {}",
                self.base_url
            )));
        }

        if self.model_name.is_empty() {
            return Err(ModelError::InvalidConfig(
                "Model name cannot be empty".to_string(),
            ));
        }

        if self.api_key.is_empty() {
            return Err(ModelError::InvalidConfig(
                "API key cannot be empty".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ModelError::InvalidConfig(format!(
                "Temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            )));
        }

        if self.request_timeout.as_secs() == 0 {
            return Err(ModelError::InvalidConfig(
                "Request timeout must be greater than 0 seconds".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Regeneration attempts after the first invocation, so the model is
    /// invoked at most `max_retries + 1` times per run.
    pub max_retries: u32,
    pub constraints: ConstraintSet,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            constraints: ConstraintSet::default(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.max_retries > 10 {
            return Err(PipelineError::InvalidConfig(
                "Max retries should not exceed 10; each retry is a full model invocation"
                    .to_string(),
            ));
        }

        self.constraints.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub model: ModelConfig,
    pub pipeline: PipelineConfig,
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        self.model.validate()?;
        self.pipeline.validate()?;
        Ok(())
    }
}

// Error types

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Required field is empty: {0}")]
    EmptyField(String),

    #[error("Required field is missing from the model output: {0}")]
    MissingField(String),

    #[error("Unknown platform: '{0}'\n💡 Supported platforms: twitter (x), linkedin, instagram, facebook, pinterest")]
    UnknownPlatform(String),

    #[error("Model output is not valid JSON: {0}")]
    MalformedJson(String),

    #[error("Model output does not match the expected post shape: {0}")]
    UnexpectedShape(String),
}

#[derive(Debug, Clone, Error)]
pub enum ModelError {
    #[error("Model request failed: {0}\n💡 Check network connectivity and the configured base URL")]
    Http(String),

    #[error("Model API returned status {status}: {message}\n💡 Verify the API key is valid and the model name exists")]
    Api { status: u16, message: String },

    #[error("Model request timed out after {timeout:?}\n💡 Increase the request timeout or simplify the prompt")]
    Timeout { timeout: Duration },

    #[error("Model returned an empty response")]
    EmptyResponse,

    #[error("Invalid model configuration: {0}")]
    InvalidConfig(String),
}

/// Terminal failure of a pipeline run. Distinct from retry-budget
/// exhaustion, which is a normal outcome carrying a best-effort post.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Invalid pipeline configuration: {0}")]
    InvalidConfig(String),
}
