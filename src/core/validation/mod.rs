//! Validation and filtering primitives
//!
//! Constraints attached to schema nodes and the filters applied around
//! deserialization.

pub mod filters;
pub mod validators;

pub use filters::{strip_absent, to_naive_utc, trim};
pub use validators::Constraint;
