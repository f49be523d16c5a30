//! The generation pipeline
//!
//! Orchestrates prompt construction, model invocation, output parsing, and
//! validation with a bounded retry loop. Control flow is an explicit
//! finite-state machine with a pure transition function; the pipeline
//! drives it and logs every transition under the run's [`RequestId`].
//!
//! Two distinct terminal failures: infrastructure failures (model or
//! schema errors) surface as `Err(PipelineError)` — the `Failed` state —
//! while a spent retry budget is a normal outcome,
//! [`PipelineOutcome::Exhausted`], carrying the best-effort post together
//! with its remaining violations.

use crate::model::ModelClient;
use crate::parser::parse_generated_post;
use crate::prompt::PromptBuilder;
use crate::types::{
    GeneratedPost, PipelineConfig, PipelineError, PostRequest, RequestId,
};
use crate::validation::PostValidator;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// States of a single pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Building,
    Invoking { attempt: u32 },
    Validating { attempt: u32 },
    Retrying { attempt: u32 },
    Succeeded,
    Exhausted,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PipelineState::Succeeded | PipelineState::Exhausted | PipelineState::Failed
        )
    }
}

/// Events that drive the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineEvent {
    PromptReady,
    ModelResponded,
    /// Model invocation or output parsing failed; infrastructure failure,
    /// never retried.
    InvocationFailed,
    Valid,
    Invalid,
    RetryScheduled,
    RetryBudgetExhausted,
}

/// Pure transition function. Terminal states absorb every event; an event
/// that does not apply to the current state leaves it unchanged.
pub fn next_state(state: PipelineState, event: PipelineEvent) -> PipelineState {
    use PipelineEvent::*;
    use PipelineState::*;

    if state.is_terminal() {
        return state;
    }

    match (state, event) {
        (Building, PromptReady) => Invoking { attempt: 1 },
        (Invoking { attempt }, ModelResponded) => Validating { attempt },
        (Invoking { .. }, InvocationFailed) => Failed,
        (Validating { .. }, InvocationFailed) => Failed,
        (Validating { .. }, Valid) => Succeeded,
        (Validating { attempt }, Invalid) => Retrying { attempt },
        (Retrying { attempt }, RetryScheduled) => Invoking { attempt: attempt + 1 },
        (Retrying { .. }, RetryBudgetExhausted) => Exhausted,
        (state, _) => state,
    }
}

/// Terminal result of a pipeline run that did not fail on infrastructure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// The post passed validation.
    Succeeded { post: GeneratedPost, attempts: u32 },
    /// The retry budget is spent. The best-effort post is returned
    /// explicitly with its violations, never presented as valid.
    Exhausted {
        post: GeneratedPost,
        violations: Vec<String>,
        attempts: u32,
    },
}

impl PipelineOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PipelineOutcome::Succeeded { .. })
    }

    pub fn post(&self) -> &GeneratedPost {
        match self {
            PipelineOutcome::Succeeded { post, .. } => post,
            PipelineOutcome::Exhausted { post, .. } => post,
        }
    }

    pub fn attempts(&self) -> u32 {
        match self {
            PipelineOutcome::Succeeded { attempts, .. } => *attempts,
            PipelineOutcome::Exhausted { attempts, .. } => *attempts,
        }
    }
}

/// Sequential prompt → invoke → parse → validate → retry pipeline.
///
/// Holds no per-run state; each [`generate`](PostPipeline::generate) call
/// runs against its own request and post instances, so concurrent callers
/// never share anything through the pipeline.
pub struct PostPipeline {
    client: Arc<dyn ModelClient>,
    config: PipelineConfig,
    prompt_builder: PromptBuilder,
    validator: PostValidator,
}

impl std::fmt::Debug for PostPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostPipeline")
            .field("config", &self.config)
            .finish()
    }
}

impl PostPipeline {
    pub fn new(client: Arc<dyn ModelClient>, config: PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self {
            client,
            config,
            prompt_builder: PromptBuilder::new(),
            validator: PostValidator::new(),
        })
    }

    /// Runs the pipeline for one request.
    ///
    /// The model is invoked at most `max_retries + 1` times. A returned
    /// `Succeeded` post always satisfies its platform constraints; a
    /// model or schema failure terminates the run immediately.
    pub async fn generate(&self, request: &PostRequest) -> Result<PipelineOutcome, PipelineError> {
        let run_id = RequestId::new();
        let constraints = self.config.constraints.for_platform(request.platform());
        let max_attempts = self.config.max_retries + 1;

        info!(
            %run_id,
            platform = %request.platform(),
            topic = request.topic(),
            max_attempts,
            "Starting generation run"
        );

        let mut state = PipelineState::Building;
        let mut prompt = self.prompt_builder.initial(request, &constraints);
        let mut attempt: u32 = 0;

        state = self.transition(&run_id, state, PipelineEvent::PromptReady);

        loop {
            attempt += 1;
            debug!(%run_id, attempt, "Invoking model");

            let raw = match self.client.invoke(&prompt).await {
                Ok(raw) => raw,
                Err(e) => {
                    state = self.transition(&run_id, state, PipelineEvent::InvocationFailed);
                    error!(%run_id, attempt, ?state, "Model invocation failed: {}", e);
                    return Err(e.into());
                }
            };
            state = self.transition(&run_id, state, PipelineEvent::ModelResponded);

            let post = match parse_generated_post(&raw, request.platform()) {
                Ok(post) => post,
                Err(e) => {
                    state = self.transition(&run_id, state, PipelineEvent::InvocationFailed);
                    error!(%run_id, attempt, ?state, "Output could not be parsed: {}", e);
                    return Err(e.into());
                }
            };

            let result = self
                .validator
                .validate_post(request.platform(), &constraints, &post);

            if result.is_valid() {
                state = self.transition(&run_id, state, PipelineEvent::Valid);
                info!(%run_id, attempt, ?state, "Post validated successfully");
                return Ok(PipelineOutcome::Succeeded {
                    post,
                    attempts: attempt,
                });
            }

            state = self.transition(&run_id, state, PipelineEvent::Invalid);

            if attempt >= max_attempts {
                state = self.transition(&run_id, state, PipelineEvent::RetryBudgetExhausted);
                warn!(
                    %run_id,
                    attempt,
                    ?state,
                    violations = result.violations.len(),
                    "Retry budget exhausted; returning best-effort post"
                );
                return Ok(PipelineOutcome::Exhausted {
                    post,
                    violations: result.violations,
                    attempts: attempt,
                });
            }

            warn!(
                %run_id,
                attempt,
                violations = result.violations.len(),
                "Validation failed; regenerating with feedback"
            );
            prompt = self
                .prompt_builder
                .retry(request, &constraints, &result.violations);
            state = self.transition(&run_id, state, PipelineEvent::RetryScheduled);
        }
    }

    fn transition(
        &self,
        run_id: &RequestId,
        state: PipelineState,
        event: PipelineEvent,
    ) -> PipelineState {
        let next = next_state(state, event);
        debug!(%run_id, ?state, ?event, ?next, "Pipeline transition");
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MockModelClient;
    use crate::types::{ModelError, Platform, SchemaError};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn request() -> PostRequest {
        PostRequest::new("launch", Platform::Twitter)
            .unwrap()
            .with_tone("excited")
    }

    fn valid_payload() -> String {
        r##"{"platform": "twitter", "text": "We just shipped v1.0! 🚀", "hashtags": ["#launch", "#rust"]}"##
            .to_string()
    }

    fn oversized_payload() -> String {
        format!(
            r##"{{"platform": "twitter", "text": "{}", "hashtags": ["#launch", "#rust"]}}"##,
            "a".repeat(300)
        )
    }

    fn pipeline_with(client: MockModelClient) -> PostPipeline {
        PostPipeline::new(Arc::new(client), PipelineConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_succeeds_on_first_valid_output() {
        let mut client = MockModelClient::new();
        client
            .expect_invoke()
            .times(1)
            .returning(|_| Ok(valid_payload()));

        let outcome = pipeline_with(client).generate(&request()).await.unwrap();
        match outcome {
            PipelineOutcome::Succeeded { post, attempts } => {
                assert_eq!(attempts, 1);
                assert_eq!(post.platform, Platform::Twitter);
                assert!(post.text.chars().count() <= 280);
            }
            other => panic!("expected Succeeded, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_regenerates_after_invalid_output() {
        // First draft is 300 chars; the retry is valid and must be accepted.
        let calls = Arc::new(AtomicU32::new(0));
        let calls_in_mock = calls.clone();

        let mut client = MockModelClient::new();
        client.expect_invoke().times(2).returning(move |prompt| {
            let call = calls_in_mock.fetch_add(1, Ordering::SeqCst);
            if call == 0 {
                assert!(!prompt.contains("PREVIOUS_ATTEMPT_FEEDBACK"));
                Ok(oversized_payload())
            } else {
                // The regeneration prompt must carry the violation feedback.
                assert!(prompt.contains("PREVIOUS_ATTEMPT_FEEDBACK"));
                assert!(prompt.contains("exceeds 280"));
                Ok(valid_payload())
            }
        });

        let outcome = pipeline_with(client).generate(&request()).await.unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.attempts(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_exhausts_retry_budget() {
        // max_retries = 2, so exactly 3 invocations, then Exhausted.
        let mut client = MockModelClient::new();
        client
            .expect_invoke()
            .times(3)
            .returning(|_| Ok(oversized_payload()));

        let outcome = pipeline_with(client).generate(&request()).await.unwrap();
        match outcome {
            PipelineOutcome::Exhausted {
                post,
                violations,
                attempts,
            } => {
                assert_eq!(attempts, 3);
                assert!(!violations.is_empty());
                assert!(post.text.chars().count() > 280);
            }
            other => panic!("expected Exhausted, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_model_error_fails_without_retry() {
        let mut client = MockModelClient::new();
        client.expect_invoke().times(1).returning(|_| {
            Err(ModelError::Timeout {
                timeout: Duration::from_secs(30),
            })
        });

        let err = pipeline_with(client).generate(&request()).await.unwrap_err();
        assert!(matches!(err, PipelineError::Model(ModelError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_unparseable_output_fails_without_retry() {
        let mut client = MockModelClient::new();
        client
            .expect_invoke()
            .times(1)
            .returning(|_| Ok("I'm sorry, I can't help with that.".to_string()));

        let err = pipeline_with(client).generate(&request()).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Schema(SchemaError::MalformedJson(_))
        ));
    }

    #[tokio::test]
    async fn test_zero_retries_means_single_attempt() {
        let mut client = MockModelClient::new();
        client
            .expect_invoke()
            .times(1)
            .returning(|_| Ok(oversized_payload()));

        let config = PipelineConfig {
            max_retries: 0,
            ..PipelineConfig::default()
        };
        let pipeline = PostPipeline::new(Arc::new(client), config).unwrap();
        let outcome = pipeline.generate(&request()).await.unwrap();
        assert!(!outcome.is_success());
        assert_eq!(outcome.attempts(), 1);
    }

    #[tokio::test]
    async fn test_rejects_invalid_config() {
        let client = MockModelClient::new();
        let config = PipelineConfig {
            max_retries: 11,
            ..PipelineConfig::default()
        };
        assert!(PostPipeline::new(Arc::new(client), config).is_err());
    }

    #[test]
    fn test_transition_happy_path() {
        use PipelineEvent::*;
        use PipelineState::*;

        let mut state = Building;
        state = next_state(state, PromptReady);
        assert_eq!(state, Invoking { attempt: 1 });
        state = next_state(state, ModelResponded);
        assert_eq!(state, Validating { attempt: 1 });
        state = next_state(state, Valid);
        assert_eq!(state, Succeeded);
        assert!(state.is_terminal());
    }

    #[test]
    fn test_transition_retry_loop() {
        use PipelineEvent::*;
        use PipelineState::*;

        let mut state = Validating { attempt: 1 };
        state = next_state(state, Invalid);
        assert_eq!(state, Retrying { attempt: 1 });
        state = next_state(state, RetryScheduled);
        assert_eq!(state, Invoking { attempt: 2 });
        state = next_state(state, ModelResponded);
        state = next_state(state, Invalid);
        state = next_state(state, RetryBudgetExhausted);
        assert_eq!(state, Exhausted);
    }

    #[test]
    fn test_transition_invocation_failure() {
        use PipelineEvent::*;
        use PipelineState::*;

        assert_eq!(
            next_state(Invoking { attempt: 1 }, InvocationFailed),
            Failed
        );
        assert_eq!(
            next_state(Invoking { attempt: 3 }, InvocationFailed),
            Failed
        );
        // Parse failures surface after the model has responded.
        assert_eq!(
            next_state(Validating { attempt: 1 }, InvocationFailed),
            Failed
        );
        assert_eq!(
            next_state(Validating { attempt: 2 }, InvocationFailed),
            Failed
        );
    }

    #[test]
    fn test_terminal_states_absorb_events() {
        use PipelineEvent::*;
        use PipelineState::*;

        for terminal in [Succeeded, Exhausted, Failed] {
            for event in [
                PromptReady,
                ModelResponded,
                InvocationFailed,
                Valid,
                Invalid,
                RetryScheduled,
                RetryBudgetExhausted,
            ] {
                assert_eq!(next_state(terminal, event), terminal);
            }
        }
    }

    #[test]
    fn test_inapplicable_events_leave_state_unchanged() {
        use PipelineEvent::*;
        use PipelineState::*;

        assert_eq!(next_state(Building, Valid), Building);
        assert_eq!(
            next_state(Invoking { attempt: 1 }, RetryScheduled),
            Invoking { attempt: 1 }
        );
    }
}
