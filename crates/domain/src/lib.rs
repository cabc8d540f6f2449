//! # Civic Domain
//!
//! Business domain types for the civic issue-reporting client.
//!
//! This crate contains:
//! - Issue, user and envelope data types with their wire formats
//! - Domain error type and Result definition
//! - Client configuration structures
//! - Domain constants (storage keys, header names, retry defaults)
//!
//! ## Architecture
//! - No dependencies on other civic crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
