//! Auth gateway and credential store fakes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use civic_core::{AuthGateway, CredentialStore};
use civic_domain::{
    AuthPayload, CivicError, Envelope, LoginRequest, ProfileUpdate, RegisterRequest, Result, User,
};
use parking_lot::Mutex;

use super::issues::{Queue, Scripted};

/// Answers each auth endpoint from its own queue.
#[derive(Default)]
pub struct FakeAuthGateway {
    login: Queue<AuthPayload>,
    register: Queue<AuthPayload>,
    logout: Queue<serde_json::Value>,
    me: Queue<User>,
    profile: Queue<User>,
    logout_calls: AtomicUsize,
}

impl FakeAuthGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_login(&self, scripted: Scripted<AuthPayload>) {
        self.login.push(scripted);
    }

    pub fn push_register(&self, scripted: Scripted<AuthPayload>) {
        self.register.push(scripted);
    }

    pub fn push_logout(&self, scripted: Scripted<serde_json::Value>) {
        self.logout.push(scripted);
    }

    pub fn push_me(&self, scripted: Scripted<User>) {
        self.me.push(scripted);
    }

    pub fn push_profile(&self, scripted: Scripted<User>) {
        self.profile.push(scripted);
    }

    pub fn logout_calls(&self) -> usize {
        self.logout_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthGateway for FakeAuthGateway {
    async fn login(&self, _request: &LoginRequest) -> Result<Envelope<AuthPayload>> {
        self.login.next("login").await
    }

    async fn register(&self, _request: &RegisterRequest) -> Result<Envelope<AuthPayload>> {
        self.register.next("register").await
    }

    async fn logout(&self) -> Result<Envelope<serde_json::Value>> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        self.logout.next("logout").await
    }

    async fn me(&self) -> Result<Envelope<User>> {
        self.me.next("me").await
    }

    async fn update_profile(&self, _update: &ProfileUpdate) -> Result<Envelope<User>> {
        self.profile.next("update_profile").await
    }
}

/// In-memory credential store that can be told to fail writes.
#[derive(Default)]
pub struct MemoryCredentials {
    values: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl MemoryCredentials {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn seeded(entries: &[(&str, &str)]) -> Arc<Self> {
        let store = Self::default();
        {
            let mut values = store.values.lock();
            for (key, value) in entries {
                values.insert((*key).to_string(), (*value).to_string());
            }
        }
        Arc::new(store)
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }
}

impl CredentialStore for MemoryCredentials {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CivicError::Storage("keychain locked".into()));
        }
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values.lock().remove(key);
        Ok(())
    }
}
