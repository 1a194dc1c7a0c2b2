#![deny(missing_docs)]
//! Prompt rendering and strict-JSON response parsing for Chrysalis Forge
//! modules (§4.1).
//!
//! This crate implements the `Predict` / `ChainOfThought` prompt strategies
//! and the strict-JSON output contract; it holds no network or storage
//! concerns of its own.

mod parse;
mod render;

pub use parse::{parse_response, parse_response_into_result};
pub use render::render_prompt;
