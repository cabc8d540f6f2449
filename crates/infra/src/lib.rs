//! # Civic Infrastructure
//!
//! Infrastructure implementations of the `civic-core` ports.
//!
//! This crate contains:
//! - The resilient HTTP transport (per-attempt timeout, linear backoff)
//! - The REST API client and the auth/issue gateways built on it
//! - Credential stores (platform keychain, in-memory)
//! - Configuration loading from environment variables and files
//!
//! ## Architecture
//! - Implements traits defined in `civic-core`
//! - Depends on `civic-domain` and `civic-core`
//! - Contains all "impure" code (network, keychain, filesystem)

pub mod api;
pub mod config;
pub mod credentials;
pub mod errors;
pub mod http;

// Re-export commonly used items
pub use api::{
    ApiClient, ApiClientBuilder, ApiClientConfig, ApiError, ApiErrorCategory, HttpAuthGateway,
    HttpIssueGateway,
};
pub use credentials::{KeychainCredentialStore, MemoryCredentialStore};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder, TransportError};
