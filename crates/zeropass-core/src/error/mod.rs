//! Error types for the ZeroPass client
//!
//! Every fallible operation in this crate returns [`ZeroPassResult`]. All
//! variants implement [`UnifiedError`], which exposes:
//! - error_code: A unique identifier for programmatic error handling
//! - message: Human-readable error message
//! - context: Optional additional context about where/why the error occurred
//! - hint: An actionable suggestion for the user, when one exists

mod constructors;
mod conversions;
mod types;
mod unified_error;

pub use types::{ResultExt, UnifiedError, ZeroPassError, ZeroPassResult};
