//! symcheck-core
//!
//! Pure domain types, the patient input validator, and the diagnosis output
//! schema. No AWS SDK dependency — this is the shared vocabulary of the
//! symcheck system.

pub mod error;
pub mod input;
pub mod models;
pub mod schema;
