//! # Civic Core
//!
//! Client-side business logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - The issue synchronization store and its three views
//! - The authentication session and its lifecycle service
//! - Port interfaces (traits) implemented by `civic-infra`
//!
//! ## Architecture Principles
//! - Only depends on `civic-domain`
//! - No HTTP, keychain or platform code
//! - All external dependencies via traits
//! - Local state changes only after the server confirms

pub mod auth;
pub mod issues;

pub use auth::{AccessTokenProvider, AuthGateway, AuthService, CredentialStore, Session, SessionHandle};
pub use issues::{FetchStatus, IssueGateway, IssueSet, IssueStore, IssueView, MutationResult};
