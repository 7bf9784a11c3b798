//! Reshape transformation.
//!
//! - Unstack: pivot the sub-key level into columns
//! - Pipeline: parse, unstack, transpose and write files

pub mod pipeline;
pub mod unstack;

pub use pipeline::*;
pub use unstack::{sorted_labels, unstack};
