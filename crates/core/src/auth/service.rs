//! Session lifecycle service
//!
//! Owns the transitions of the [`SessionHandle`]: created on login or
//! registration, validated on restore, destroyed on logout or when the
//! server rejects the token. Persists the token and profile under the fixed
//! `authToken` / `user` keys.

use std::sync::Arc;

use civic_domain::constants::{AUTH_TOKEN_KEY, USER_KEY};
use civic_domain::{
    AuthPayload, CivicError, Envelope, LoginRequest, ProfileUpdate, RegisterRequest, Result, User,
};
use tracing::{debug, info, instrument, warn};

use super::ports::{AuthGateway, CredentialStore};
use super::session::{Session, SessionHandle};

/// Authentication service
pub struct AuthService {
    gateway: Arc<dyn AuthGateway>,
    credentials: Arc<dyn CredentialStore>,
    session: SessionHandle,
}

impl AuthService {
    /// Create a new auth service around an existing session handle
    ///
    /// The same handle should be given to the API client so requests pick up
    /// whatever token this service installs.
    pub fn new(
        gateway: Arc<dyn AuthGateway>,
        credentials: Arc<dyn CredentialStore>,
        session: SessionHandle,
    ) -> Self {
        Self { gateway, credentials, session }
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn current_session_user(&self) -> Option<User> {
        self.session.user()
    }

    /// Sign in with email and password
    ///
    /// # Errors
    /// Propagates gateway failures; an unsuccessful envelope becomes
    /// `CivicError::Rejected` carrying the server message.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest) -> Result<User> {
        let envelope = self.gateway.login(request).await?;
        let user = self.establish(envelope)?;
        info!(user_id = %user.id, "login successful");
        Ok(user)
    }

    /// Create an account; the new account is signed in immediately
    ///
    /// # Errors
    /// Same as [`AuthService::login`].
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<User> {
        let envelope = self.gateway.register(request).await?;
        let user = self.establish(envelope)?;
        info!(user_id = %user.id, "registration successful");
        Ok(user)
    }

    /// Sign out
    ///
    /// The server call is best effort. Local state is cleared regardless of
    /// its outcome.
    ///
    /// # Errors
    /// Returns `CivicError::Storage` only if persisted credentials could not
    /// be removed.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        if self.session.is_authenticated() {
            match self.gateway.logout().await {
                Ok(envelope) if envelope.success => debug!("server session closed"),
                Ok(envelope) => {
                    warn!(message = ?envelope.message, "server refused logout; clearing locally")
                }
                Err(err) => warn!(error = %err, "logout request failed; clearing locally"),
            }
        }
        self.invalidate()
    }

    /// Re-establish the persisted session on startup
    ///
    /// Returns the restored user, or `None` when there is nothing to restore
    /// or the server no longer accepts the token. Connectivity failures keep
    /// the cached session so the app can start offline.
    ///
    /// # Errors
    /// Returns storage errors from the credential store.
    #[instrument(skip(self))]
    pub async fn restore(&self) -> Result<Option<User>> {
        let Some(token) = self.credentials.load(AUTH_TOKEN_KEY)? else {
            debug!("no persisted session");
            return Ok(None);
        };

        let cached = match self.credentials.load(USER_KEY)? {
            Some(raw) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => user,
                Err(err) => {
                    warn!(error = %err, "persisted user profile is unreadable; discarding session");
                    self.invalidate()?;
                    return Ok(None);
                }
            },
            None => {
                warn!("persisted token has no matching user profile; discarding session");
                self.invalidate()?;
                return Ok(None);
            }
        };

        self.session.install(Session { token, user: cached.clone() });

        match self.current_user().await {
            Ok(user) => {
                info!(user_id = %user.id, "session restored");
                Ok(Some(user))
            }
            Err(err) if err.is_unauthorized() || !self.session.is_authenticated() => Ok(None),
            Err(err) => {
                warn!(error = %err, "could not validate persisted session; using cached profile");
                Ok(Some(cached))
            }
        }
    }

    /// Fetch the signed-in user's profile and refresh the cached copy
    ///
    /// # Errors
    /// Propagates gateway failures. A 401 additionally destroys the session.
    #[instrument(skip(self))]
    pub async fn current_user(&self) -> Result<User> {
        match self.gateway.me().await.and_then(Envelope::into_data) {
            Ok(user) => {
                self.remember_user(&user);
                Ok(user)
            }
            Err(err) => {
                if err.is_unauthorized() {
                    warn!("token rejected by server; invalidating session");
                    self.invalidate()?;
                }
                Err(err)
            }
        }
    }

    /// Update profile fields of the signed-in user
    ///
    /// # Errors
    /// Propagates gateway failures. A 401 additionally destroys the session.
    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User> {
        match self.gateway.update_profile(update).await.and_then(Envelope::into_data) {
            Ok(user) => {
                self.remember_user(&user);
                info!(user_id = %user.id, "profile updated");
                Ok(user)
            }
            Err(err) => {
                if err.is_unauthorized() {
                    self.invalidate()?;
                }
                Err(err)
            }
        }
    }

    /// Destroy the session and its persisted copy
    ///
    /// # Errors
    /// Returns storage errors from the credential store; the in-memory
    /// session is cleared before they are reported.
    pub fn invalidate(&self) -> Result<()> {
        self.session.clear();
        self.credentials.remove(AUTH_TOKEN_KEY)?;
        self.credentials.remove(USER_KEY)?;
        Ok(())
    }

    fn establish(&self, envelope: Envelope<AuthPayload>) -> Result<User> {
        let AuthPayload { token, user } = envelope.into_data()?;
        if token.is_empty() {
            return Err(CivicError::MalformedResponse("auth response has an empty token".into()));
        }

        if let Err(err) = self.persist(&token, &user) {
            warn!(error = %err, "failed to persist session; it will not survive a restart");
        }
        self.session.install(Session { token, user: user.clone() });
        Ok(user)
    }

    fn persist(&self, token: &str, user: &User) -> Result<()> {
        let raw = serde_json::to_string(user)
            .map_err(|e| CivicError::Internal(format!("failed to serialize user: {e}")))?;
        self.credentials.save(AUTH_TOKEN_KEY, token)?;
        self.credentials.save(USER_KEY, &raw)
    }

    fn remember_user(&self, user: &User) {
        if !self.session.update_user(user.clone()) {
            return;
        }
        match serde_json::to_string(user) {
            Ok(raw) => {
                if let Err(err) = self.credentials.save(USER_KEY, &raw) {
                    warn!(error = %err, "failed to persist refreshed user profile");
                }
            }
            Err(err) => warn!(error = %err, "failed to serialize refreshed user profile"),
        }
    }
}
