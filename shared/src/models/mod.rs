//! Data models
//!
//! Wire types for the incident API. Shared between the client library and
//! the console.

pub mod incident;
pub mod user;

// Re-exports
pub use incident::*;
pub use user::*;
