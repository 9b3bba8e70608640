//! lacuna-interchange: program description JSON types and deserialization.
//!
//! Provides typed structs for the construct kinds of a program description
//! (record `Type`, `Enum`, decision `Function`) and a single
//! `from_interchange()` entry point that deserializes a `serde_json::Value`
//! into a `ProgramBundle`. The evaluator builds its type catalog from that
//! bundle.

pub mod deserialize;
pub mod types;

pub use deserialize::{from_interchange, InterchangeError};
pub use types::*;
