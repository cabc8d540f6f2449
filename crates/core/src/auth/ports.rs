//! Port interfaces for authentication and session persistence
//!
//! These traits define the boundaries between the session lifecycle logic
//! and the HTTP / secure-storage implementations in the infra crate.

use async_trait::async_trait;
use civic_domain::{
    AuthPayload, Envelope, LoginRequest, ProfileUpdate, RegisterRequest, Result, User,
};

/// Remote authentication endpoints (`/auth/*`)
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Exchange credentials for a token and profile
    async fn login(&self, request: &LoginRequest) -> Result<Envelope<AuthPayload>>;

    /// Create an account and sign in
    async fn register(&self, request: &RegisterRequest) -> Result<Envelope<AuthPayload>>;

    /// Invalidate the current token server-side
    async fn logout(&self) -> Result<Envelope<serde_json::Value>>;

    /// Profile of the token's owner
    async fn me(&self) -> Result<Envelope<User>>;

    /// Update editable profile fields
    async fn update_profile(&self, update: &ProfileUpdate) -> Result<Envelope<User>>;
}

/// Key/value secret storage that survives restarts
///
/// Only the bearer token and the serialized user profile are ever written.
pub trait CredentialStore: Send + Sync {
    /// Read a value, `None` when the key has never been written or was removed
    fn load(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one
    fn save(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}

/// Source of the bearer token attached to authenticated requests
///
/// A missing token is not an error at this layer: the request goes out
/// without an `Authorization` header and the server answers 401.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn access_token(&self) -> Option<String>;
}
