use axum::extract::State;
use axum::http::{HeaderValue, StatusCode};
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};

use leakscout_core::ScanConfig;
use leakscout_github::client::DEFAULT_BASE_URL;
use leakscout_github::{GithubClient, GithubError, RepoScanner, ScanOutcome};

#[derive(Clone)]
pub struct AppState {
    /// GitHub API base URL; tests point this at a mock server.
    pub github_base_url: String,
    pub config: ScanConfig,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            github_base_url: DEFAULT_BASE_URL.to_string(),
            config: ScanConfig::from_env(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    pub owner: String,
    pub repo: String,
    /// Optional personal access token to raise the rate limit.
    #[serde(default)]
    pub token: Option<String>,
}

type ApiError = (StatusCode, Json<serde_json::Value>);

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:5173"),
            HeaderValue::from_static("http://localhost:3000"),
        ])
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api", get(root))
        .route("/api/scan", post(scan_repository))
        .layer(cors)
        .with_state(state)
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Hello from the leakscout API!" }))
}

async fn scan_repository(
    State(state): State<AppState>,
    Json(request): Json<ScanRequest>,
) -> Result<Json<ScanOutcome>, ApiError> {
    let client = GithubClient::with_base_url(request.token.as_deref(), &state.github_base_url)
        .map_err(internal_error)?;
    let scanner = RepoScanner::new(client, state.config.clone());

    match scanner.scan(&request.owner, &request.repo).await {
        Ok(outcome) => Ok(Json(outcome)),
        Err(err) => Err(map_scan_error(err)),
    }
}

fn map_scan_error(err: GithubError) -> ApiError {
    let (status, detail) = match &err {
        GithubError::NotFound(_) => (StatusCode::NOT_FOUND, "Repository not found"),
        GithubError::RateLimitExceeded => (
            StatusCode::TOO_MANY_REQUESTS,
            "GitHub API rate limit exceeded. Try again later.",
        ),
        _ => (
            StatusCode::BAD_GATEWAY,
            "Error contacting GitHub. Please try again.",
        ),
    };
    tracing::error!("scan failed: {err}");
    (status, Json(serde_json::json!({ "detail": detail })))
}

fn internal_error(err: GithubError) -> ApiError {
    tracing::error!("could not build GitHub client: {err}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "detail": "An internal server error occurred." })),
    )
}
