//! Test server harness for E2E testing
//!
//! Provides `TestIssuerServer` for spawning a real issuer server over
//! in-memory user and session stores.

use crate::fixtures::test_config;
use crate::memory_users::InMemoryUserRepository;
use issuer_service::config::{Config, RotationPolicy};
use issuer_service::models::{IntrospectionResponse, RegisterUserResponse, TokenResponse};
use issuer_service::routes::{self, AppState};
use issuer_service::session::{InMemorySessionStore, SessionCache};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Test harness for spawning the token issuer in E2E tests
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_token_flow_e2e() -> Result<()> {
///     let server = TestIssuerServer::spawn().await?;
///     let user = server.register_user("alice", "p", None).await?;
///
///     let response = server
///         .client()
///         .post(format!("{}/token", server.url()))
///         .json(&json!({"user_id": user.user_id, "password": "p"}))
///         .send()
///         .await?;
///
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestIssuerServer {
    addr: SocketAddr,
    config: Config,
    users: Arc<InMemoryUserRepository>,
    sessions: Arc<InMemorySessionStore>,
    client: reqwest::Client,
    _handle: JoinHandle<()>,
}

impl TestIssuerServer {
    /// Spawn a server with the default (strict) rotation policy
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        Self::spawn_with_policy(RotationPolicy::Strict).await
    }

    /// Spawn a server bound to 127.0.0.1:0
    pub async fn spawn_with_policy(policy: RotationPolicy) -> Result<Self, anyhow::Error> {
        let config = test_config(policy);
        let users = Arc::new(InMemoryUserRepository::new());
        let sessions = Arc::new(InMemorySessionStore::new());

        let state = Arc::new(
            AppState::new(&config, users.clone(), sessions.clone())
                .map_err(|e| anyhow::anyhow!("Failed to build app state: {}", e))?,
        );

        // The global recorder may already be installed by another test in this
        // process; fall back to a standalone one.
        let metrics_handle = match routes::init_metrics_recorder() {
            Ok(handle) => handle,
            Err(_) => {
                use metrics_exporter_prometheus::PrometheusBuilder;
                let recorder = PrometheusBuilder::new().build_recorder();
                recorder.handle()
            }
        };

        let app = routes::build_routes(state, metrics_handle);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            config,
            users,
            sessions,
            client: reqwest::Client::new(),
            _handle: handle,
        })
    }

    /// Get the base URL of the test server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// The user store behind the server
    pub fn users(&self) -> &InMemoryUserRepository {
        &self.users
    }

    /// The session store behind the server
    pub fn sessions(&self) -> &InMemorySessionStore {
        &self.sessions
    }

    /// Register through `POST /user`
    pub async fn register_user(
        &self,
        name: &str,
        password: &str,
        scopes: Option<&str>,
    ) -> Result<RegisterUserResponse, anyhow::Error> {
        let mut body = json!({"name": name, "password": password});
        if let Some(scopes) = scopes {
            body["scopes"] = json!(scopes);
        }

        let response = self
            .client
            .post(format!("{}/user", self.url()))
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }

    /// Obtain a token through `POST /token`
    pub async fn issue_token(&self, user_id: i64, password: &str) -> Result<String, anyhow::Error> {
        let response = self
            .client
            .post(format!("{}/token", self.url()))
            .json(&json!({"user_id": user_id, "password": password}))
            .send()
            .await?
            .error_for_status()?;

        let body: TokenResponse = response.json().await?;
        Ok(body.access_token)
    }

    /// Call `GET /check` with `Authorization: Bearer <token>`
    pub async fn check(&self, token: &str) -> Result<(u16, IntrospectionResponse), anyhow::Error> {
        let header = format!("Bearer {}", token);
        self.check_with_header(Some(header.as_str())).await
    }

    /// Call `GET /check` with a raw `Authorization` header (or none)
    pub async fn check_with_header(
        &self,
        header: Option<&str>,
    ) -> Result<(u16, IntrospectionResponse), anyhow::Error> {
        let mut request = self.client.get(format!("{}/check", self.url()));
        if let Some(value) = header {
            request = request.header("Authorization", value);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        Ok((status, response.json().await?))
    }

    /// Shorten the remaining lifetime of a token's session entry
    pub async fn expire_token_in(&self, token: &str, ttl: Duration) -> bool {
        self.sessions
            .expire(&SessionCache::token_key(token), ttl)
            .await
    }

    /// Drop a token's resolution entry, as if it lapsed
    pub async fn forget_token(&self, token: &str) -> bool {
        self.sessions.remove(&SessionCache::token_key(token)).await
    }
}
