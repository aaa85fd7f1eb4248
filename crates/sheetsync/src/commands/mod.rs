//! CLI command implementations

pub mod infer;
pub mod sync;
