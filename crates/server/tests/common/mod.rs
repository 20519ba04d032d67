//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that creates an in-process router
//! with mock generator and library backends injected, enabling end-to-end
//! API tests without a model server or music library.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use tuneforge_core::{
    testing::{MockLibraryBackend, MockSuggestionGenerator},
    BackendKind, Config, DatabaseConfig, GenerationService, GeneratorConfig, HistoryStore,
    LibraryBackend, NavidromeConfig, OrchestratorConfig, PlexConfig, SqliteHistoryStore,
    SuggestionGenerator,
};
use tuneforge_server::{api::create_router, state::AppState};

/// Re-export fixtures for test convenience
#[allow(unused_imports)]
pub use tuneforge_core::testing::fixtures;

/// Test fixture for API testing with mock dependencies.
///
/// Provides an in-process router with fully controllable mocks for:
/// - Suggestion generation (MockSuggestionGenerator)
/// - Navidrome and Plex libraries (MockLibraryBackend)
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_generate() {
///     let fixture = TestFixture::new().await;
///     fixture.generator.push_batch(vec![fixtures::suggestion("Africa", "Toto")]).await;
///     fixture.navidrome.add_track("Africa", "Toto").await;
///
///     let response = fixture.post("/api/v1/playlists/generate", json!({
///         "prompt": "80s hits",
///         "num_songs": 1
///     })).await;
///
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock generator - queue suggestion batches
    pub generator: Arc<MockSuggestionGenerator>,
    /// Mock Navidrome library
    pub navidrome: Arc<MockLibraryBackend>,
    /// Mock Plex library
    pub plex: Arc<MockLibraryBackend>,
    /// History store shared with the service
    pub history: Arc<SqliteHistoryStore>,
    /// Temporary directory for the test database
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        // Create mocks
        let generator = Arc::new(MockSuggestionGenerator::new());
        let navidrome = Arc::new(MockLibraryBackend::new(BackendKind::Navidrome));
        let plex = Arc::new(MockLibraryBackend::new(BackendKind::Plex));

        // Create config
        let config = Config {
            database: DatabaseConfig {
                path: db_path.clone(),
            },
            generator: (!test_config.without_generator)
                .then(|| GeneratorConfig::new("http://127.0.0.1:11434", "test-model")),
            navidrome: NavidromeConfig {
                enabled: true,
                url: Some("http://127.0.0.1:4533".to_string()),
                username: Some("admin".to_string()),
                password: Some("super-secret".to_string()),
            },
            plex: test_config.plex,
            ..Default::default()
        };

        let history = Arc::new(
            SqliteHistoryStore::new(&db_path).expect("Failed to create history store"),
        );

        let generator_for_service: Option<Arc<dyn SuggestionGenerator>> =
            if test_config.without_generator {
                None
            } else {
                Some(Arc::clone(&generator) as Arc<dyn SuggestionGenerator>)
            };

        let generation = GenerationService::new(
            OrchestratorConfig::immediate(3),
            generator_for_service,
            vec![
                Arc::clone(&navidrome) as Arc<dyn LibraryBackend>,
                Arc::clone(&plex) as Arc<dyn LibraryBackend>,
            ],
            Arc::clone(&history) as Arc<dyn HistoryStore>,
        );

        // Create app state with mocks
        let state = Arc::new(AppState::new(
            config,
            generation,
            Arc::clone(&history) as Arc<dyn HistoryStore>,
        ));

        // Create router
        let router = create_router(state);

        Self {
            router,
            generator,
            navidrome,
            plex,
            history,
            temp_dir,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    #[allow(dead_code)]
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        self.send(request_builder.body(body).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Configuration for test fixture.
#[derive(Debug, Clone, Default)]
pub struct TestConfig {
    /// Leave the generator unconfigured
    pub without_generator: bool,
    /// Plex settings used by the library and machine id endpoints
    pub plex: PlexConfig,
}

impl TestConfig {
    /// Create config without a generator.
    #[allow(dead_code)]
    pub fn without_generator() -> Self {
        Self {
            without_generator: true,
            ..Default::default()
        }
    }

    /// Create config pointing the Plex helpers at `server_url`.
    #[allow(dead_code)]
    pub fn with_plex_server(server_url: &str, token: &str) -> Self {
        Self {
            plex: PlexConfig {
                server_url: Some(server_url.to_string()),
                token: Some(token.to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
