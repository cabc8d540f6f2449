//! # Civic App
//!
//! Application layer - composition root and headless entry point.
//!
//! This crate contains:
//! - Application context (dependency injection)
//! - Logging setup and structured operation logging
//! - Health reporting across the wired components
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires the ports defined in `core` to the adapters in `infra`
//! - A UI shell holds one [`AppContext`] and renders from its store

pub mod context;
pub mod utils;

pub use context::*;
