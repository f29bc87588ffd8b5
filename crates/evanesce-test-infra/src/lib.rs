//! Containers backing the integration test suites.

pub mod error;
pub mod redis;

pub use error::{Result, TestInfraError};
