//! Application context - dependency injection container

use std::sync::Arc;

use civic_core::{AuthService, CredentialStore, IssueStore, SessionHandle};
use civic_domain::{ClientConfig, LoginRequest, RegisterRequest, Result, User};
use civic_infra::{
    ApiClient, ApiClientConfig, HttpAuthGateway, HttpIssueGateway, KeychainCredentialStore,
};
use tracing::{info, warn};

use crate::utils::health::{ComponentHealth, HealthStatus};

/// Type alias for credential store port trait object
type DynCredentialStore = dyn CredentialStore + 'static;

/// Application context - holds all services and dependencies
///
/// The session handle is shared by the API client (as its token source) and
/// the auth service (which installs and clears it), so a login is visible to
/// every later request without further wiring.
pub struct AppContext {
    pub config: ClientConfig,
    pub session: SessionHandle,
    pub api: Arc<ApiClient>,
    pub auth: Arc<AuthService>,
    pub issues: Arc<IssueStore>,
}

impl AppContext {
    /// Create a context from the loaded configuration, persisting the
    /// session in the platform keychain
    ///
    /// # Errors
    /// Returns `CivicError::Config` when no valid configuration can be loaded.
    pub fn new() -> Result<Self> {
        Self::new_with_config(civic_infra::config::load()?)
    }

    /// Create a context with a custom configuration
    ///
    /// # Errors
    /// Returns `CivicError::Config` when the configuration is invalid.
    pub fn new_with_config(config: ClientConfig) -> Result<Self> {
        let credentials = Arc::new(KeychainCredentialStore::new(config.service_name.clone()));
        Self::new_with_credentials(config, credentials)
    }

    /// Create a context with an explicit credential store
    ///
    /// Tests use this to keep sessions in memory instead of the keychain.
    ///
    /// # Errors
    /// Returns `CivicError::Config` when the configuration is invalid or the
    /// HTTP client cannot be built.
    pub fn new_with_credentials(
        config: ClientConfig,
        credentials: Arc<DynCredentialStore>,
    ) -> Result<Self> {
        config.validate()?;

        let session = SessionHandle::new();
        let api = Arc::new(ApiClient::new(ApiClientConfig::from(&config), Arc::new(session.clone()))?);

        let auth = Arc::new(AuthService::new(
            Arc::new(HttpAuthGateway::new(api.clone())),
            credentials,
            session.clone(),
        ));
        let issues = Arc::new(IssueStore::new(Arc::new(HttpIssueGateway::new(api.clone()))));

        info!(
            environment = %config.environment,
            base_url = %config.base_url,
            retry_attempts = config.retry_attempts,
            "application context initialized"
        );

        Ok(Self { config, session, api, auth, issues })
    }

    /// Restore a persisted session, if any
    ///
    /// # Errors
    /// Returns `CivicError::Storage` when the credential store is unreadable.
    pub async fn restore_session(&self) -> Result<Option<User>> {
        let user = self.auth.restore().await?;
        match &user {
            Some(user) => info!(user_id = %user.id, "session restored"),
            None => info!("no session to restore"),
        }
        Ok(user)
    }

    /// Sign in and drop any views cached for a previous user
    ///
    /// # Errors
    /// Propagates the login failure unchanged.
    pub async fn sign_in(&self, request: &LoginRequest) -> Result<User> {
        let user = self.auth.login(request).await?;
        self.issues.reset();
        Ok(user)
    }

    /// Register a new account and sign in as it
    ///
    /// # Errors
    /// Propagates the registration failure unchanged.
    pub async fn sign_up(&self, request: &RegisterRequest) -> Result<User> {
        let user = self.auth.register(request).await?;
        self.issues.reset();
        Ok(user)
    }

    /// Sign out and clear every issue view
    ///
    /// In-flight fetches issued before this call are discarded when they
    /// resolve.
    ///
    /// # Errors
    /// Returns `CivicError::Storage` when the persisted session cannot be
    /// removed; the in-memory session and store are cleared regardless.
    pub async fn sign_out(&self) -> Result<()> {
        let result = self.auth.logout().await;
        self.issues.reset();
        result
    }

    /// Check the health of the API and the local components
    pub async fn health_check(&self) -> HealthStatus {
        let mut status = HealthStatus::new()
            .add_component(ComponentHealth::healthy_with(
                "config",
                self.config.environment.to_string(),
            ))
            .add_component(self.check_api_health().await)
            .add_component(self.session_health())
            .add_component(self.store_health());

        status.calculate_score();
        status
    }

    async fn check_api_health(&self) -> ComponentHealth {
        match self.api.health_check().await {
            Ok(true) => ComponentHealth::healthy("api"),
            Ok(false) => ComponentHealth::unhealthy("api", "health endpoint returned an error status"),
            Err(e) => {
                warn!(error = %e, "api health check failed");
                ComponentHealth::unhealthy("api", e.user_message())
            }
        }
    }

    fn session_health(&self) -> ComponentHealth {
        match self.session.user() {
            Some(user) => ComponentHealth::healthy_with("session", format!("signed in as {}", user.email)),
            None => ComponentHealth::healthy_with("session", "signed out"),
        }
    }

    fn store_health(&self) -> ComponentHealth {
        match self.issues.last_error() {
            Some(error) => ComponentHealth::unhealthy("issue_store", error.user_message()),
            None => ComponentHealth::healthy("issue_store"),
        }
    }

    /// Drop cached state ahead of exit
    ///
    /// The persisted session is kept so the next launch can restore it.
    pub fn shutdown(&self) {
        info!("shutdown called on AppContext");
        self.issues.reset();
    }
}
