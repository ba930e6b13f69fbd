//! Error handling
//!
//! Defines error types and errno mapping for the wikifs driver.

pub mod handlers;
pub mod types;

pub use types::*;
