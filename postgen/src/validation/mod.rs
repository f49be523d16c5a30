//! Constraint validation for generated posts
//!
//! This module provides a trait-based validation system with modular,
//! composable rule validators. Validators accumulate every violation they
//! find rather than stopping at the first, so a regeneration prompt can
//! address all issues in one pass. Invalid content is a normal return
//! value here, never an error.

pub mod generated_post;
pub mod traits;

// Re-export main validation types
pub use generated_post::{HashtagValidator, PostValidator, TextValidator};
pub use traits::Validator;
