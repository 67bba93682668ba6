//! testgen-core
//!
//! Core library for analysing Go sources and synthesising table-driven test
//! skeletons for their exported functions and methods.
//!
//! The pipeline is: load every `.go` file under a root into an owned syntax
//! tree ([`loader`]), estimate how many cases each function warrants
//! ([`estimate`]), optionally resolve calls through interface-typed values
//! ([`semantic`], [`mock`]), build the test declarations ([`synth`]) and write
//! them next to their sources ([`emit`]). [`generator`] ties the stages
//! together so frontends only deal with a config and a report.

pub mod config;
pub mod emit;
pub mod estimate;
pub mod generator;
pub mod loader;
pub mod mock;
pub mod model;
pub mod semantic;
pub mod synth;
pub mod syntax;

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
