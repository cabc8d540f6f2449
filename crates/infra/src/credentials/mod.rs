//! Credential stores for the persisted session (`authToken`, `user`)

mod keychain;
mod memory;

pub use keychain::KeychainCredentialStore;
pub use memory::MemoryCredentialStore;
