//! Application constants
//!
//! Centralized location for the wire-level names and defaults shared by the
//! store, the auth service and the API client.

// Credential storage keys
pub const AUTH_TOKEN_KEY: &str = "authToken";
pub const USER_KEY: &str = "user";
pub const DEFAULT_SERVICE_NAME: &str = "civic.client";

// Request headers
pub const AUTHORIZATION_HEADER: &str = "Authorization";
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

// Retry policy
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 1_000;
pub const MAX_RETRY_ATTEMPTS: u32 = 5;

// Health probe
pub const HEALTH_CHECK_TIMEOUT_MS: u64 = 5_000;

// Nearby search
pub const DEFAULT_NEARBY_RADIUS_METERS: u32 = 5_000;
