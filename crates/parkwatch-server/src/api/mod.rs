mod favorites;
mod parking;

use std::sync::Arc;

use axum::{
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use parkwatch_core::AppConfig;
use parkwatch_feed::{FavoriteStore, FileStore, Pipeline, StorageError};
use serde::Serialize;
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{request_id, RequestId, REQUEST_ID_HEADER};

#[derive(Clone)]
pub struct AppState {
    /// One acquisition at a time: every pipeline access goes through this lock.
    pub pipeline: Arc<Mutex<Pipeline<FileStore>>>,
    pub favorites: FavoriteStore<FileStore>,
    pub config: Arc<AppConfig>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(data: T, request_id: String) -> Self {
        Self {
            data,
            meta: ResponseMeta::new(request_id),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_storage_error(request_id: String, error: &StorageError) -> ApiError {
    tracing::error!(error = %error, "storage operation failed");
    ApiError::new(request_id, "internal_error", "storage operation failed")
}

/// Run a favorites operation on the blocking pool, since the store reads
/// and writes files.
pub(super) async fn run_favorites<T, F>(
    state: &AppState,
    request_id: &str,
    op: F,
) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&FavoriteStore<FileStore>) -> Result<T, StorageError> + Send + 'static,
{
    let favorites = state.favorites.clone();
    match tokio::task::spawn_blocking(move || op(&favorites)).await {
        Ok(result) => result.map_err(|e| map_storage_error(request_id.to_string(), &e)),
        Err(e) => {
            tracing::error!(error = %e, "favorites task failed");
            Err(ApiError::new(
                request_id,
                "internal_error",
                "storage operation failed",
            ))
        }
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/parking", get(parking::list_parking))
        .route("/api/v1/parking/refresh", post(parking::refresh_parking))
        .route("/api/v1/favorites", get(favorites::list_favorites))
        .route(
            "/api/v1/favorites/{name}",
            put(favorites::add_favorite).delete(favorites::remove_favorite),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(Extension(req_id): Extension<RequestId>) -> impl IntoResponse {
    Json(ApiResponse::new(HealthData { status: "ok" }, req_id.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use parkwatch_core::{Environment, PayloadFormat, SourceSpec};
    use serde_json::json;
    use tower::ServiceExt;
    use wiremock::matchers::path;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(data_dir: std::path::PathBuf) -> AppConfig {
        AppConfig {
            env: Environment::Test,
            bind_addr: "127.0.0.1:0".parse().expect("addr"),
            log_level: "warn".to_string(),
            data_dir,
            sources_path: None,
            default_lat: 25.03,
            default_lon: 121.5,
            refresh_interval_secs: 10,
            cache_ttl_secs: 300,
            request_timeout_secs: 5,
            user_agent: "parkwatch-test/0.1".to_string(),
        }
    }

    fn test_state(upstream: &MockServer) -> AppState {
        let dir = std::env::temp_dir().join(format!("parkwatch-api-{}", uuid::Uuid::new_v4()));
        let config = test_config(dir.clone());
        let store = Arc::new(FileStore::new(dir));
        let sources = [SourceSpec::Direct {
            name: "direct".to_string(),
            url: format!("{}/MapAPI/GetAllPOIData", upstream.uri()),
            format: PayloadFormat::LegacyPoi,
        }];
        let pipeline = Pipeline::from_config(&config, &sources, Arc::clone(&store)).expect("pipeline");
        let favorites = FavoriteStore::new(store);
        favorites.ensure_initialized().expect("init favorites");
        AppState {
            pipeline: Arc::new(Mutex::new(pipeline)),
            favorites,
            config: Arc::new(config),
        }
    }

    async fn upstream_with_lots() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(path("/MapAPI/GetAllPOIData"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"name": "Full Lot", "lat": "25.03", "lon": "121.5", "remark": "目前有車停放", "address": "Civic Blvd"},
                {"name": "Open Lot", "lat": "25.03", "lon": "121.5", "remark": "目前空格", "address": "Ren'ai Rd"},
                {"name": "Open Lot", "lat": "25.03", "lon": "121.5", "remark": "目前有車停放", "address": "Ren'ai Rd"}
            ])))
            .mount(&server)
            .await;
        server
    }

    async fn send(app: Router, method: &str, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json = serde_json::from_slice(&body).expect("json parse");
        (status, json)
    }

    #[test]
    fn api_error_validation_error_maps_to_bad_request() {
        let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn health_returns_ok_with_request_id() {
        let upstream = MockServer::start().await;
        let app = build_app(test_state(&upstream));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .header(REQUEST_ID_HEADER, "req-abc")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(REQUEST_ID_HEADER).map(|v| v.as_bytes()),
            Some(&b"req-abc"[..])
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(json["data"]["status"], "ok");
        assert_eq!(json["meta"]["request_id"], "req-abc");
    }

    #[tokio::test]
    async fn parking_returns_ranked_summaries() {
        let upstream = upstream_with_lots().await;
        let app = build_app(test_state(&upstream));
        let (status, json) = send(app, "GET", "/api/v1/parking?lat=25.03&lon=121.5").await;

        assert_eq!(status, StatusCode::OK);
        let data = json["data"].as_array().expect("data array");
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["name"], "Open Lot");
        assert_eq!(data[0]["regular_total"], 2);
        assert_eq!(data[0]["regular_available"], 1);
        assert_eq!(data[0]["favorite"], false);
        assert_eq!(data[1]["name"], "Full Lot");
    }

    #[tokio::test]
    async fn parking_applies_search_and_availability_filters() {
        let upstream = upstream_with_lots().await;
        let state = test_state(&upstream);

        let (_, json) = send(build_app(state.clone()), "GET", "/api/v1/parking?q=civic").await;
        let names: Vec<&str> = json["data"]
            .as_array()
            .expect("data array")
            .iter()
            .filter_map(|item| item["name"].as_str())
            .collect();
        assert_eq!(names, ["Full Lot"]);

        let (_, json) = send(build_app(state), "GET", "/api/v1/parking?available_only=true").await;
        let data = json["data"].as_array().expect("data array");
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["name"], "Open Lot");
    }

    #[tokio::test]
    async fn parking_rejects_half_a_coordinate() {
        let upstream = MockServer::start().await;
        let app = build_app(test_state(&upstream));
        let (status, json) = send(app, "GET", "/api/v1/parking?lat=25.03").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_error");
    }

    #[tokio::test]
    async fn parking_rejects_out_of_range_coordinate() {
        let upstream = MockServer::start().await;
        let app = build_app(test_state(&upstream));
        let (status, _) = send(app, "GET", "/api/v1/parking?lat=95&lon=121.5").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn parking_degrades_to_empty_list_when_upstream_fails() {
        let upstream = MockServer::start().await;
        Mock::given(path("/MapAPI/GetAllPOIData"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&upstream)
            .await;
        let app = build_app(test_state(&upstream));
        let (status, json) = send(app, "POST", "/api/v1/parking/refresh").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"], json!([]));
    }

    #[tokio::test]
    async fn favorites_add_list_remove_and_rank_first() {
        let upstream = upstream_with_lots().await;
        let state = test_state(&upstream);

        let (status, json) = send(build_app(state.clone()), "PUT", "/api/v1/favorites/Full%20Lot").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"], json!({"name": "Full Lot", "changed": true}));

        let (_, json) = send(build_app(state.clone()), "PUT", "/api/v1/favorites/Full%20Lot").await;
        assert_eq!(json["data"]["changed"], false);

        let (_, json) = send(build_app(state.clone()), "GET", "/api/v1/favorites").await;
        assert_eq!(json["data"], json!(["Full Lot"]));

        let (_, json) = send(build_app(state.clone()), "GET", "/api/v1/parking?lat=25.03&lon=121.5").await;
        assert_eq!(json["data"][0]["name"], "Full Lot");
        assert_eq!(json["data"][0]["favorite"], true);

        let (_, json) = send(build_app(state.clone()), "DELETE", "/api/v1/favorites/Full%20Lot").await;
        assert_eq!(json["data"], json!({"name": "Full Lot", "changed": true}));

        let (_, json) = send(build_app(state), "GET", "/api/v1/favorites").await;
        assert_eq!(json["data"], json!([]));
    }

    #[tokio::test]
    async fn favorites_write_failure_maps_to_internal_error() {
        let upstream = MockServer::start().await;
        let mut state = test_state(&upstream);
        // A regular file where the store expects a directory makes every write fail.
        let blocked = std::env::temp_dir().join(format!("parkwatch-blocked-{}", uuid::Uuid::new_v4()));
        std::fs::write(&blocked, "not a directory").expect("write blocker");
        state.favorites = FavoriteStore::new(Arc::new(FileStore::new(blocked.clone())));

        let (status, json) = send(build_app(state), "PUT", "/api/v1/favorites/Lot").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"]["code"], "internal_error");

        let _ = std::fs::remove_file(&blocked);
    }
}
