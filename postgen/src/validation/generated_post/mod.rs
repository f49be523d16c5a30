//! Validation of generated posts against platform constraints

pub mod composite_validator;
pub mod hashtag_validator;
pub mod text_validator;

pub use composite_validator::PostValidator;
pub use hashtag_validator::HashtagValidator;
pub use text_validator::TextValidator;
