//! Shared helpers for release service tests

pub mod builders;

#[allow(unused_imports)]
pub use builders::*;
