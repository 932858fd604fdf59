//! # Tactics Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Fixture map and registry builders
//! - Fixed-point construction helpers
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;

/// Re-export proptest for convenience.
pub use proptest;
