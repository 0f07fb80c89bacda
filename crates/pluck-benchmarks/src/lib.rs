//! pluck benchmarking suite
//!
//! Benchmarks for report parsing, configuration parsing and closure resolution
//! over synthetic `npm ls` output.

pub mod common;

pub use common::*;
