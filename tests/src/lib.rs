//! Shared harness for the integration tests.

pub mod fixtures;
pub mod mocks;
pub mod setup;
