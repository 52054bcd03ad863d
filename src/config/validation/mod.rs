//! Configuration validation
//!
//! - `trait_def`: the `Validate` trait
//! - `config_validators`: per-section validators

mod config_validators;
mod trait_def;

pub use trait_def::Validate;
