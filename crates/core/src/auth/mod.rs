//! Authentication: session handle, lifecycle service and its ports

pub mod ports;
pub mod service;
pub mod session;

pub use ports::{AccessTokenProvider, AuthGateway, CredentialStore};
pub use service::AuthService;
pub use session::{Session, SessionHandle};
