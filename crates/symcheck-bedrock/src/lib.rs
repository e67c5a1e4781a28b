//! symcheck-bedrock
//!
//! Structured generation against hosted models: the provider abstraction,
//! its Bedrock implementation, prompt construction, and candidate fallback.

pub mod client;
pub mod converse;
pub mod document;
pub mod error;
pub mod orchestrate;
pub mod prompt;
pub mod provider;
pub mod tokens;
