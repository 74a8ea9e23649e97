//! Shared CLI argument types
//!
//! This module contains reusable argument structs that can be flattened
//! into commands using `#[command(flatten)]`.

mod common;
mod filters;
mod global;

pub use common::{DecisionArg, OutputFormat};
pub use filters::{AuditFilterArgs, PageArgs};
pub use global::GlobalOptions;
