//! Test utilities
//!
//! Manual mock of the activity-source port plus fixture factories.
//! Manual mocks are explicit about what they return and keep the port
//! trait free of test-only bounds.

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
