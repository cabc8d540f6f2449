//! Explicit session object shared by the auth service and the API client

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use civic_domain::User;
use parking_lot::RwLock;

use super::ports::AccessTokenProvider;

/// Bearer token plus the profile it belongs to
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: User,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("user", &self.user.id)
            .finish()
    }
}

/// Cloneable handle to the (at most one) active session
///
/// Installed on login, cleared on logout or when the server rejects the
/// token. Handed to the API client as its [`AccessTokenProvider`].
#[derive(Clone, Default)]
pub struct SessionHandle {
    inner: Arc<RwLock<Option<Session>>>,
}

impl SessionHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install(&self, session: Session) {
        *self.inner.write() = Some(session);
    }

    /// Drop the active session, returning it if there was one.
    pub fn clear(&self) -> Option<Session> {
        self.inner.write().take()
    }

    pub fn current(&self) -> Option<Session> {
        self.inner.read().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.inner.read().as_ref().map(|session| session.token.clone())
    }

    pub fn user(&self) -> Option<User> {
        self.inner.read().as_ref().map(|session| session.user.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.read().is_some()
    }

    /// Replace the cached profile; no-op without an active session.
    pub fn update_user(&self, user: User) -> bool {
        match self.inner.write().as_mut() {
            Some(session) => {
                session.user = user;
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle").field("session", &*self.inner.read()).finish()
    }
}

#[async_trait]
impl AccessTokenProvider for SessionHandle {
    async fn access_token(&self) -> Option<String> {
        self.token()
    }
}

#[cfg(test)]
mod tests {
    use civic_domain::UserRole;

    use super::*;

    fn user(name: &str) -> User {
        User {
            id: "u1".into(),
            name: name.into(),
            email: "u1@example.org".into(),
            role: UserRole::Citizen,
            phone: None,
            avatar: None,
            created_at: None,
        }
    }

    #[tokio::test]
    async fn token_follows_session_lifecycle() {
        let handle = SessionHandle::new();
        assert_eq!(handle.access_token().await, None);

        handle.install(Session { token: "t-1".into(), user: user("Ada") });
        assert_eq!(handle.access_token().await.as_deref(), Some("t-1"));

        let cleared = handle.clear();
        assert!(cleared.is_some());
        assert!(!handle.is_authenticated());
        assert_eq!(handle.access_token().await, None);
    }

    #[test]
    fn clones_share_the_same_session() {
        let handle = SessionHandle::new();
        let api_side = handle.clone();

        handle.install(Session { token: "t-2".into(), user: user("Ada") });
        assert!(api_side.update_user(user("Ada Lovelace")));
        assert_eq!(handle.user().unwrap().name, "Ada Lovelace");
    }

    #[test]
    fn debug_output_redacts_token() {
        let session = Session { token: "secret-token".into(), user: user("Ada") };
        let rendered = format!("{session:?}");
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("redacted"));
    }
}
