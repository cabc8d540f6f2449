//! Resilient REST client and the gateways built on it
//!
//! - [`ApiClient`]: bearer injection, per-attempt timeout, linear-backoff
//!   retry on 5xx / timeout / connection failure, no retry on 4xx
//! - [`HttpIssueGateway`] / [`HttpAuthGateway`]: the `/issues` and `/auth`
//!   endpoints decoded into typed envelopes
//!
//! Structured tracing only; no state is kept between calls apart from
//! configuration.

pub mod auth;
pub mod client;
pub mod errors;
pub mod issues;

pub use auth::HttpAuthGateway;
pub use client::{ApiClient, ApiClientBuilder, ApiClientConfig};
pub use errors::{ApiError, ApiErrorCategory};
pub use issues::HttpIssueGateway;
