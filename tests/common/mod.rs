use async_trait::async_trait;
use postgen::{
    GeneratedPost, ModelClient, ModelError, PipelineConfig, Platform, PlatformConstraints,
    PostPipeline, PostRequest,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

/// Test utilities and common setup functions

pub struct TestHelper;

impl TestHelper {
    /// Create a request matching the worked launch example.
    pub fn launch_request() -> PostRequest {
        PostRequest::new("launch", Platform::Twitter)
            .unwrap()
            .with_tone("excited")
    }

    /// A post that satisfies the default constraints for `platform`.
    pub fn valid_post(platform: Platform) -> GeneratedPost {
        let constraints = PlatformConstraints::for_platform(platform);
        let hashtag_count = constraints.min_hashtags.max(1).min(constraints.max_hashtags);
        let hashtags = (0..hashtag_count)
            .map(|i| {
                if constraints.hashtag_prefix_required {
                    format!("#tag{}", i)
                } else {
                    format!("tag{}", i)
                }
            })
            .collect();
        GeneratedPost {
            platform,
            text: "We just shipped v1.0! Grab it while it's hot. 🚀".to_string(),
            hashtags,
        }
    }

    /// Serialize a post the way a well-behaved model would respond.
    pub fn payload_for(post: &GeneratedPost) -> String {
        serde_json::to_string(post).unwrap()
    }

    /// A twitter payload whose text is exactly `length` characters.
    pub fn twitter_payload_with_length(length: usize) -> String {
        Self::payload_for(&GeneratedPost {
            platform: Platform::Twitter,
            text: "a".repeat(length),
            hashtags: vec!["#launch".to_string(), "#rust".to_string()],
        })
    }

    /// Pipeline with default config over a scripted client, plus the
    /// client's invocation counter.
    pub fn pipeline(client: ScriptedClient) -> (PostPipeline, Arc<AtomicU32>) {
        let invocations = client.invocations();
        let pipeline = PostPipeline::new(Arc::new(client), PipelineConfig::default()).unwrap();
        (pipeline, invocations)
    }
}

/// Model client that replays a scripted sequence of responses and counts
/// invocations. Once the script runs out it panics, so a pipeline that
/// loops past its retry budget shows up as a test failure rather than a
/// hang.
pub struct ScriptedClient {
    responses: Mutex<VecDeque<Result<String, ModelError>>>,
    invocations: Arc<AtomicU32>,
}

impl ScriptedClient {
    pub fn new(responses: Vec<Result<String, ModelError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            invocations: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn invocations(&self) -> Arc<AtomicU32> {
        self.invocations.clone()
    }
}

#[async_trait]
impl ModelClient for ScriptedClient {
    async fn invoke(&self, _prompt: &str) -> Result<String, ModelError> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("model invoked more times than the script allows"))
    }
}

/// Convenience for asserting final invocation counts.
pub fn count(invocations: &Arc<AtomicU32>) -> u32 {
    invocations.load(Ordering::SeqCst)
}
