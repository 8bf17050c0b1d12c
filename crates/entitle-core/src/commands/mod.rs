//! High-level commands for entitlements operations.
//!
//! These are the entry points frontends call; they wire parameter
//! validation, the codec, and diagnostics together.

pub mod show;
pub mod update;

pub use show::ShowCommand;
pub use update::{UpdateCommand, UpdateOptions, UpdateReport};
