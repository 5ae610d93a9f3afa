//! Utility Functions
//!
//! User-friendly error formatting for the `flavormap` binary.

pub mod errors;

pub use errors::format_user_error;
