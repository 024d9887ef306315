//! Testing utilities and mock implementations
//!
//! This module provides mock implementations for testing the search server
//! without requiring network access to the Brave API.

pub mod mocks;

pub use mocks::*;
