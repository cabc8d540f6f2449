//! Conversions from external infrastructure errors into domain errors.

use civic_domain::CivicError;
use keyring::Error as KeyringError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub CivicError);

impl From<InfraError> for CivicError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<CivicError> for InfraError {
    fn from(value: CivicError) -> Self {
        Self(value)
    }
}

trait IntoCivicError {
    fn into_civic(self) -> CivicError;
}

/* -------------------------------------------------------------------------- */
/* keyring::Error → CivicError */
/* -------------------------------------------------------------------------- */

impl IntoCivicError for KeyringError {
    fn into_civic(self) -> CivicError {
        let description = self.to_string();

        match self {
            KeyringError::NoEntry => CivicError::Storage("keychain entry not found".into()),
            KeyringError::BadEncoding(_) => {
                CivicError::Storage("credential in keychain is not valid UTF-8".into())
            }
            KeyringError::TooLong(name, limit) => CivicError::Storage(format!(
                "keychain attribute '{name}' exceeds platform limit ({limit})"
            )),
            KeyringError::Invalid(attr, reason) => {
                CivicError::Storage(format!("keychain attribute '{attr}' is invalid: {reason}"))
            }
            KeyringError::PlatformFailure(err) => {
                CivicError::Storage(format!("keychain platform error: {err}"))
            }
            KeyringError::NoStorageAccess(err) => {
                CivicError::Storage(format!("unable to access secure storage: {err}"))
            }
            _ => CivicError::Storage(description),
        }
    }
}

impl From<KeyringError> for InfraError {
    fn from(value: KeyringError) -> Self {
        Self(value.into_civic())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → CivicError */
/* -------------------------------------------------------------------------- */

impl IntoCivicError for HttpError {
    fn into_civic(self) -> CivicError {
        if self.is_timeout() {
            return CivicError::Timeout("HTTP request timed out".into());
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            return CivicError::NetworkUnavailable("HTTP connection failure".into());
        }

        if self.is_decode() {
            return CivicError::MalformedResponse(format!("undecodable response body: {self}"));
        }

        if let Some(status) = self.status() {
            let status = status.as_u16();
            let message = format!("Request failed with status {status}");
            return if status >= 500 {
                CivicError::Server { status, message }
            } else {
                CivicError::Client { status, message }
            };
        }

        if self.is_builder() {
            return CivicError::Config(format!("invalid HTTP request: {self}"));
        }

        CivicError::NetworkUnavailable(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        Self(value.into_civic())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use reqwest::{Client, StatusCode};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn keyring_no_entry_maps_to_storage_error() {
        let mapped: CivicError = InfraError::from(KeyringError::NoEntry).into();
        match mapped {
            CivicError::Storage(msg) => assert!(msg.contains("keychain")),
            other => panic!("expected storage error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn http_status_422_maps_to_client_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(StatusCode::UNPROCESSABLE_ENTITY))
            .mount(&server)
            .await;

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(server.uri()).send().await.unwrap().error_for_status().unwrap_err();

        let mapped: CivicError = InfraError::from(error).into();
        assert_eq!(mapped.status(), Some(422));
        assert!(matches!(mapped, CivicError::Client { .. }));
    }

    #[tokio::test]
    async fn refused_connection_maps_to_network_unavailable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(format!("http://{addr}")).send().await.unwrap_err();

        let mapped: CivicError = InfraError::from(error).into();
        assert!(mapped.is_connectivity());
    }
}
