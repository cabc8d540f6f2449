//! HTTP transport with per-attempt timeout and retry

mod client;

pub use client::{Delivered, HttpClient, HttpClientBuilder, TransportError};
