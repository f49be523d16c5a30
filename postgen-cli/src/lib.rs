use anyhow::{Context, Result};
use clap::Parser;
use postgen::{
    GeneratorConfig, HttpModelClient, ModelConfig, PipelineConfig, PipelineOutcome, Platform,
    PostPipeline, PostRequest,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const SEPARATOR_WIDTH: usize = 60;

#[derive(Parser, Clone)]
#[command(name = "postgen-cli")]
#[command(about = "Generate validated social media posts with an LLM pipeline")]
#[command(version)]
#[command(
    long_about = "A command-line front end for the postgen generation pipeline.

Examples:
  # Generate a tweet about a product launch
  postgen-cli --topic \"our v1.0 launch\" --platform twitter --tone excited

  # LinkedIn post with keywords worked in
  postgen-cli --topic \"hiring Rust engineers\" --platform linkedin --keyword rust --keyword hiring

  # Point at a different OpenAI-compatible endpoint
  postgen-cli --topic \"new blog post\" --platform instagram --base-url https://my-proxy.example/v1 --model llama-3.1-70b

  # Tighten the retry budget and timeout
  postgen-cli --topic \"release notes\" --platform twitter --max-retries 1 --timeout 15"
)]
pub struct Args {
    /// Topic or subject for the post
    #[arg(long)]
    pub topic: String,

    /// Target platform: twitter (x), linkedin, instagram, facebook, pinterest
    #[arg(long)]
    pub platform: String,

    /// Desired tone of the post (e.g. 'formal', 'casual', 'excited')
    #[arg(long)]
    pub tone: Option<String>,

    /// Keyword to work into the post; repeat for multiple keywords
    #[arg(long = "keyword")]
    pub keywords: Vec<String>,

    /// Regeneration attempts after the first invocation
    #[arg(long, default_value = "2")]
    pub max_retries: u32,

    /// Base URL of an OpenAI-compatible chat completions API
    #[arg(long, default_value = "https://api.openai.com/v1")]
    pub base_url: String,

    /// Model name to request from the API
    #[arg(long, default_value = "gpt-4o-mini")]
    pub model: String,

    /// Sampling temperature (0.0 to 2.0)
    #[arg(long, default_value = "0.7")]
    pub temperature: f32,

    /// Model request timeout in seconds
    #[arg(long, default_value = "30")]
    pub timeout: u64,

    /// Name of the environment variable holding the API key
    #[arg(long, default_value = "OPENAI_API_KEY")]
    pub api_key_env: String,
}

pub fn validate_args(args: &Args) -> Result<()> {
    if args.topic.trim().is_empty() {
        return Err(anyhow::anyhow!("Topic cannot be empty"));
    }

    args.platform
        .parse::<Platform>()
        .with_context(|| format!("Invalid --platform value: '{}'", args.platform))?;

    if !(0.0..=2.0).contains(&args.temperature) {
        return Err(anyhow::anyhow!(
            "Temperature must be between 0.0 and 2.0, got {}",
            args.temperature
        ));
    }

    if args.timeout == 0 {
        return Err(anyhow::anyhow!("Timeout must be greater than 0 seconds"));
    }

    Ok(())
}

fn build_config(args: &Args, api_key: String) -> GeneratorConfig {
    GeneratorConfig {
        model: ModelConfig {
            base_url: args.base_url.clone(),
            model_name: args.model.clone(),
            api_key,
            temperature: args.temperature,
            request_timeout: Duration::from_secs(args.timeout),
        },
        pipeline: PipelineConfig {
            max_retries: args.max_retries,
            ..PipelineConfig::default()
        },
    }
}

pub async fn run(args: Args) -> Result<()> {
    validate_args(&args)?;

    let platform: Platform = args.platform.parse()?;

    // The credential is read here, at the boundary, and injected into the
    // model client; the core never touches the environment.
    let api_key = std::env::var(&args.api_key_env).with_context(|| {
        format!(
            "API key not found in environment variable '{}'",
            args.api_key_env
        )
    })?;

    let config = build_config(&args, api_key);
    config.validate()?;

    let request = PostRequest::new(args.topic.clone(), platform)?
        .with_tone(args.tone.clone().unwrap_or_default())
        .with_keywords(args.keywords.clone());

    info!("Generating {} post about '{}'", platform, request.topic());

    let client = Arc::new(HttpModelClient::new(config.model)?);
    let pipeline = PostPipeline::new(client, config.pipeline)?;

    let outcome = pipeline
        .generate(&request)
        .await
        .context("Generation unavailable")?;

    print_outcome(&outcome);

    Ok(())
}

fn print_outcome(outcome: &PipelineOutcome) {
    let separator = "=".repeat(SEPARATOR_WIDTH);
    let post = outcome.post();

    println!("{}", separator);
    match outcome {
        PipelineOutcome::Succeeded { attempts, .. } => {
            println!(
                "✅ {} post generated and validated ({} attempt{})",
                post.platform.display_name(),
                attempts,
                if *attempts == 1 { "" } else { "s" }
            );
        }
        PipelineOutcome::Exhausted {
            violations,
            attempts,
            ..
        } => {
            warn!("Retry budget exhausted after {} attempts", attempts);
            println!(
                "⚠️  Best-effort {} post; validation issues remain after {} attempts:",
                post.platform.display_name(),
                attempts
            );
            for violation in violations {
                println!("  - {}", violation);
            }
        }
    }
    println!("{}", separator);
    println!("{}", post.text);
    if !post.hashtags.is_empty() {
        println!();
        println!("{}", post.hashtags.join(" "));
    }
    println!("{}", separator);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args {
            topic: "launch".to_string(),
            platform: "twitter".to_string(),
            tone: None,
            keywords: vec![],
            max_retries: 2,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            timeout: 30,
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }

    #[test]
    fn test_validate_args_accepts_defaults() {
        assert!(validate_args(&base_args()).is_ok());
    }

    #[test]
    fn test_validate_args_rejects_empty_topic() {
        let mut args = base_args();
        args.topic = "  ".to_string();
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_rejects_unknown_platform() {
        let mut args = base_args();
        args.platform = "myspace".to_string();
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_rejects_bad_temperature() {
        let mut args = base_args();
        args.temperature = 2.5;
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_rejects_zero_timeout() {
        let mut args = base_args();
        args.timeout = 0;
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_build_config_carries_args() {
        let mut args = base_args();
        args.max_retries = 1;
        args.timeout = 15;
        let config = build_config(&args, "key".to_string());
        assert_eq!(config.pipeline.max_retries, 1);
        assert_eq!(config.model.request_timeout, Duration::from_secs(15));
        assert_eq!(config.model.api_key, "key");
        assert!(config.validate().is_ok());
    }
}
