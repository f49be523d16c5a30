//! Core validation traits and interfaces

use crate::types::PlatformConstraints;

/// Core validation trait that all rule validators implement.
///
/// Returns every violation found as a human-readable description; an empty
/// list means the target passed this validator. Implementations must be
/// pure: no I/O, no state, same input always yields the same violations.
pub trait Validator<Target> {
    fn validate(&self, constraints: &PlatformConstraints, target: &Target) -> Vec<String>;
}
