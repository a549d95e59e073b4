//! Core library components.

pub mod executor;
pub mod plan;
pub mod prompt;
pub mod report;
pub mod sink;
pub mod source;
