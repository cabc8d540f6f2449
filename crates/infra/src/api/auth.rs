//! HTTP implementation of the auth gateway (`/auth/*`)

use std::sync::Arc;

use async_trait::async_trait;
use civic_core::AuthGateway;
use civic_domain::{
    AuthPayload, CivicError, Envelope, LoginRequest, ProfileUpdate, RegisterRequest, Result, User,
};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use super::client::ApiClient;

/// Auth endpoints over the shared [`ApiClient`]
///
/// Login and registration go out without a bearer token; everything else
/// carries the current session's token.
#[derive(Clone)]
pub struct HttpAuthGateway {
    client: Arc<ApiClient>,
}

impl HttpAuthGateway {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AuthGateway for HttpAuthGateway {
    async fn login(&self, request: &LoginRequest) -> Result<Envelope<AuthPayload>> {
        let body = to_body(request)?;
        Ok(self.client.request_envelope("/auth/login", Method::POST, Some(&body), false).await?)
    }

    async fn register(&self, request: &RegisterRequest) -> Result<Envelope<AuthPayload>> {
        let body = to_body(request)?;
        Ok(self.client.request_envelope("/auth/register", Method::POST, Some(&body), false).await?)
    }

    async fn logout(&self) -> Result<Envelope<Value>> {
        let value = self.client.request("/auth/logout", Method::POST, None, true).await?;
        // Some deployments answer logout with an empty body
        if value.is_null() {
            return Ok(Envelope::ok(Value::Null));
        }
        serde_json::from_value(value).map_err(|e| {
            CivicError::MalformedResponse(format!("logout response envelope mismatch: {e}"))
        })
    }

    async fn me(&self) -> Result<Envelope<User>> {
        Ok(self.client.request_envelope("/auth/me", Method::GET, None, true).await?)
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<Envelope<User>> {
        let body = to_body(update)?;
        Ok(self.client.request_envelope("/auth/profile", Method::PUT, Some(&body), true).await?)
    }
}

pub(crate) fn to_body<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value)
        .map_err(|e| CivicError::Internal(format!("failed to serialize request body: {e}")))
}
