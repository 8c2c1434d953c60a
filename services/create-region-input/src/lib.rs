//! Command-line front end for the region input builder.
//!
//! The binary in `main.rs` only wires logging and exit codes; argument
//! parsing and config resolution live here so they can be tested.

pub mod args;

pub use args::{parse_level, Args};
