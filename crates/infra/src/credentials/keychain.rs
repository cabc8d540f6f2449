//! Platform keychain credential store
//!
//! Thin wrapper over `keyring`: macOS Keychain Access, Windows Credential
//! Manager or the Linux Secret Service, depending on the enabled backend.

use civic_core::CredentialStore;
use civic_domain::{CivicError, Result};
use keyring::Entry;
use tracing::debug;

use crate::errors::InfraError;

/// Stores each key as one keychain entry under a fixed service name
#[derive(Debug, Clone)]
pub struct KeychainCredentialStore {
    service_name: String,
}

impl KeychainCredentialStore {
    /// # Examples
    /// ```
    /// use civic_infra::credentials::KeychainCredentialStore;
    ///
    /// let store = KeychainCredentialStore::new("civic.client");
    /// assert_eq!(store.service_name(), "civic.client");
    /// ```
    pub fn new(service_name: impl Into<String>) -> Self {
        Self { service_name: service_name.into() }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    fn entry(&self, key: &str) -> Result<Entry> {
        Entry::new(&self.service_name, key).map_err(|e| CivicError::from(InfraError::from(e)))
    }
}

impl CredentialStore for KeychainCredentialStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(InfraError::from(e).into()),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        debug!(service = %self.service_name, key = %key, "storing credential in keychain");
        self.entry(key)?.set_password(value).map_err(|e| InfraError::from(e).into())
    }

    fn remove(&self, key: &str) -> Result<()> {
        debug!(service = %self.service_name, key = %key, "removing credential from keychain");
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(InfraError::from(e).into()),
        }
    }
}
