use std::sync::Once;
use std::time::Duration;

use fiken_rs::{Client, Config, Credential, KeyPair};
use serde_json::{Value, json};
use tracing::info;
use wiremock::MockServer;
use wiremock::ResponseTemplate;

/// Company every test client targets.
pub const COMPANY: &str = "fiken-demo";

/// Token the personal test credential sends.
#[allow(dead_code)]
pub const TOKEN: &str = "test-token";

static LOGGING_CONFIGURED: Once = Once::new();

/// Setup before test runs
pub fn do_setup() {
    LOGGING_CONFIGURED.call_once(|| tracing_subscriber::fmt().with_test_writer().init());
    info!("Setting up test environment");
}

/// Config pointing both the API and the token endpoint at `server`.
pub fn mock_config(server: &MockServer) -> Config {
    Config::default()
        .with_base_url(&format!("{}/api/v2", server.uri()))
        .unwrap()
        .with_token_url(&format!("{}/oauth/token", server.uri()))
        .unwrap()
        .with_rate_limit(None)
}

/// Client with no credential and no company.
#[allow(dead_code)]
pub fn bare_client(server: &MockServer) -> Client {
    Client::new(mock_config(server)).unwrap()
}

/// Client with a personal token, targeting [`COMPANY`].
#[allow(dead_code)]
pub fn test_client(server: &MockServer) -> Client {
    bare_client(server)
        .with_credential(Credential::personal(TOKEN))
        .with_company(COMPANY)
}

/// An OAuth credential with a refresh token, valid for an hour.
#[allow(dead_code)]
pub fn oauth_credential(access_token: &str) -> Credential {
    Credential::oauth(
        KeyPair::new("client-id".to_string(), Some("client-secret".to_string())),
        access_token,
        Some("refresh-1".to_string()),
        Some(Duration::from_secs(3600)),
    )
}

/// Path of `rest` under the mocked API root.
#[allow(dead_code)]
pub fn api(rest: &str) -> String {
    format!("/api/v2{rest}")
}

/// Path of `rest` under the test company.
#[allow(dead_code)]
pub fn company(rest: &str) -> String {
    api(&format!("/companies/{COMPANY}{rest}"))
}

/// A write response pointing at `path` on `server`.
#[allow(dead_code)]
pub fn created_at(server: &MockServer, path: &str) -> ResponseTemplate {
    located(server, 201, path)
}

#[allow(dead_code)]
pub fn located(server: &MockServer, status: u16, path: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).insert_header("Location", format!("{}{path}", server.uri()))
}

/// What the token endpoint answers with when a refresh succeeds.
#[allow(dead_code)]
pub fn token_response(access_token: &str) -> Value {
    json!({
        "access_token": access_token,
        "token_type": "bearer",
        "expires_in": 3600,
        "refresh_token": "refresh-2"
    })
}
