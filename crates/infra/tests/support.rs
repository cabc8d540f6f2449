//! Shared helpers for `civic-infra` integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Once};
use std::time::Duration;

use civic_core::SessionHandle;
use civic_infra::{ApiClient, ApiClientConfig};
use serde_json::{json, Value};
use wiremock::MockServer;

static TRACING: Once = Once::new();

/// Route `tracing` output through the test harness writer once per binary.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Client config pointed at the mock server with a short backoff unit.
pub fn config_for(server: &MockServer, attempts: u32, backoff: Duration) -> ApiClientConfig {
    ApiClientConfig {
        base_url: server.uri(),
        timeout: Duration::from_secs(2),
        retry_attempts: attempts,
        retry_backoff: backoff,
        user_agent: "civic-infra-tests".to_string(),
    }
}

/// API client sharing `session` as its token source.
pub fn client_for(config: ApiClientConfig, session: &SessionHandle) -> Arc<ApiClient> {
    init_tracing();
    Arc::new(ApiClient::new(config, Arc::new(session.clone())).unwrap())
}

/// Wire representation of a persisted issue.
pub fn issue_json(id: &str, title: &str) -> Value {
    json!({
        "_id": id,
        "title": title,
        "description": format!("{title} description"),
        "category": "road",
        "priority": "medium",
        "status": "reported",
        "location": { "type": "Point", "coordinates": [-74.0, 40.0] },
        "upvotes": 0,
        "downvotes": 0
    })
}

/// Wire representation of a citizen profile.
pub fn user_json(id: &str) -> Value {
    json!({ "_id": id, "name": format!("User {id}"), "email": format!("{id}@example.org") })
}

/// `{ success: true, data }` envelope.
pub fn ok_envelope(data: Value) -> Value {
    json!({ "success": true, "data": data })
}
