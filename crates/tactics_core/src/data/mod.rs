//! Data-driven unit definitions.
//!
//! This module contains the pure data structures for unit types plus a
//! registry keyed by type name. Definitions deserialize from RON; the core
//! performs no file IO — callers pass RON text, or use the compile-time
//! embedded default set.

mod unit_data;

pub use unit_data::{UnitData, UnitRegistry};
