pub mod model;
pub mod parser;
pub mod pipeline;
pub mod prompt;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use types::*;

// Re-export the pipeline entry points
pub use pipeline::{next_state, PipelineEvent, PipelineOutcome, PipelineState, PostPipeline};

// Re-export the model boundary
pub use model::{HttpModelClient, ModelClient};

// Re-export parsing functionality
pub use parser::parse_generated_post;

// Re-export prompt rendering
pub use prompt::PromptBuilder;

// Re-export validation functionality
pub use validation::{HashtagValidator, PostValidator, TextValidator, Validator};
