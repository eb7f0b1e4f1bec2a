//! Async HTTP serving boundary
//!
//! A thin axum layer over [`InferenceService`]. The service state is
//! read-only after startup, so handlers share it through an `Arc` with no
//! locking; each request is an independent, bounded prediction.
//!
//! # Endpoints
//!
//! - `GET  /` - static welcome payload
//! - `GET  /health` - liveness check
//! - `GET  /stats` - loaded artifact summary
//! - `POST /predict` - score one record
//!
//! # Example
//!
//! ```rust,ignore
//! use stresscast::server::{ServerConfig, run_server};
//! use stresscast::service::InferenceService;
//!
//! #[tokio::main]
//! async fn main() {
//!     let service = InferenceService::from_path("model.json").unwrap();
//!     run_server(service, ServerConfig::new(8000)).await.unwrap();
//! }
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use crate::error::{ErrorResponse, StressError};
use crate::features::RawRecord;
use crate::service::InferenceService;

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for the async HTTP server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
    /// Host to bind to (default: 0.0.0.0)
    pub host: String,
    /// Enable CORS for all origins
    pub cors_permissive: bool,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
}

impl ServerConfig {
    /// Create a new server configuration with the specified port
    pub fn new(port: u16) -> Self {
        Self {
            port,
            host: "0.0.0.0".to_string(),
            cors_permissive: true,
            max_body_size: 64 * 1024, // one record per request
        }
    }

    /// Set the host to bind to
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set CORS permissiveness
    pub fn with_cors(mut self, permissive: bool) -> Self {
        self.cors_permissive = permissive;
        self
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> Result<SocketAddr, StressError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| StressError::config(format!("Invalid bind address {}:{}", self.host, self.port)))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(8000)
    }
}

// ============================================================================
// Application State
// ============================================================================

/// Shared application state: the loaded inference service plus config.
/// Read-only after startup, shared without locks.
pub struct AppState {
    pub service: InferenceService,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(service: InferenceService, config: ServerConfig) -> Self {
        Self { service, config }
    }
}

/// Type alias for shared state
pub type SharedState = Arc<AppState>;

// ============================================================================
// Request/Response Types
// ============================================================================

/// JSON body of `POST /predict`
#[derive(Debug, Clone, Deserialize)]
pub struct PredictRequest {
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "Age")]
    pub age: f64,
    #[serde(rename = "Sleep_Duration")]
    pub sleep_duration: f64,
    #[serde(rename = "Quality_of_Sleep")]
    pub quality_of_sleep: f64,
    #[serde(rename = "BMI_Category")]
    pub bmi_category: String,
    #[serde(rename = "Heart_Rate")]
    pub heart_rate: f64,
    #[serde(rename = "Daily_Steps")]
    pub daily_steps: f64,
    #[serde(rename = "Sleep_Disorder")]
    pub sleep_disorder: Option<String>,
}

impl From<PredictRequest> for RawRecord {
    fn from(req: PredictRequest) -> Self {
        RawRecord {
            gender: req.gender,
            age: Some(req.age),
            sleep_duration: Some(req.sleep_duration),
            quality_of_sleep: Some(req.quality_of_sleep),
            bmi_category: req.bmi_category,
            heart_rate: Some(req.heart_rate),
            daily_steps: Some(req.daily_steps),
            sleep_disorder: req.sleep_disorder,
        }
    }
}

/// JSON body of a successful prediction
#[derive(Debug, Clone, Serialize)]
pub struct PredictResponse {
    pub predicted_stress_level: String,
    /// Out-of-universe diagnostics, omitted when empty
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl IntoResponse for StressError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Static welcome payload at /
async fn index() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Welcome to the stress level prediction API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": ["/health", "/stats", "/predict"],
    }))
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Loaded artifact summary
async fn stats(State(state): State<SharedState>) -> impl IntoResponse {
    let summary = state.service.artifact().summary();
    Json(serde_json::json!({
        "status": "ok",
        "artifact": summary,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Score one record
async fn predict(
    State(state): State<SharedState>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, StressError> {
    let record = RawRecord::from(request);
    let result = state.service.predict(&record)?;

    let warnings = result
        .out_of_universe
        .iter()
        .map(|v| format!("{} is outside its fuzzy universe; its degrees are 0", v))
        .collect();

    Ok(Json(PredictResponse {
        predicted_stress_level: result.label,
        warnings,
    }))
}

// ============================================================================
// Server Setup
// ============================================================================

/// Create the router with all routes
pub fn create_router(state: SharedState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config.max_body_size);
    let cors_permissive = state.config.cors_permissive;

    let router = Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/stats", get(stats))
        .route("/predict", post(predict))
        .layer(body_limit)
        .with_state(state);

    if cors_permissive {
        let cors = CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_origin(Any)
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);
        router.layer(cors)
    } else {
        router
    }
}

/// Run the async HTTP server.
///
/// Blocks until shut down via Ctrl+C. The service must already hold a
/// validated artifact; there is no serving without one.
pub async fn run_server(
    service: InferenceService,
    config: ServerConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config.socket_addr()?;
    let state = Arc::new(AppState::new(service, config));
    let app = create_router(state);

    eprintln!("Stress prediction server listening on http://{}", addr);
    eprintln!("  GET  /         - welcome");
    eprintln!("  GET  /health   - health check");
    eprintln!("  GET  /stats    - artifact summary");
    eprintln!("  POST /predict  - score a record");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    eprintln!("Server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C)
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::util::ServiceExt;

    use crate::artifact::{ModelArtifact, ARTIFACT_VERSION};
    use crate::encoder::{EncoderRegistry, LabelEncoder, TARGET_COLUMN};
    use crate::features::{Medians, NUMERIC_COLUMNS};
    use crate::fuzzy::DEGREE_NAMES;
    use crate::model::{DecisionTree, TreeEnsemble, TreeNode};

    fn test_artifact() -> ModelArtifact {
        let mut encoders = EncoderRegistry::new();
        encoders.insert("Gender", LabelEncoder::fit(["Female", "Male"]));
        encoders.insert(
            "BMI Category",
            LabelEncoder::fit(["Normal", "Obese", "Overweight"]),
        );
        encoders.insert(
            "Sleep Disorder",
            LabelEncoder::fit(["Insomnia", "Nothing", "Sleep Apnea"]),
        );
        encoders.insert(TARGET_COLUMN, LabelEncoder::fit(["High", "Low", "Medium"]));

        let mut columns: Vec<String> = vec![
            "Gender".into(),
            "BMI Category".into(),
            "Sleep Disorder".into(),
        ];
        columns.extend(NUMERIC_COLUMNS.iter().map(|c| c.to_string()));
        columns.extend(DEGREE_NAMES.iter().map(|c| c.to_string()));

        let ensemble = TreeEnsemble {
            n_features: columns.len(),
            n_classes: 3,
            trees: vec![DecisionTree {
                nodes: vec![
                    TreeNode::Split {
                        feature: 3, // Age
                        threshold: 40.0,
                        left: 1,
                        right: 2,
                    },
                    TreeNode::Leaf { class: 1 }, // "Low"
                    TreeNode::Leaf { class: 0 }, // "High"
                ],
            }],
        };

        ModelArtifact {
            version: ARTIFACT_VERSION,
            columns,
            encoders,
            medians: Medians {
                age: 42.0,
                sleep_duration: 7.2,
                quality_of_sleep: 7.0,
                heart_rate: 70.0,
                daily_steps: 7000.0,
            },
            ensemble,
        }
    }

    fn test_app() -> Router {
        let service = InferenceService::new(test_artifact());
        let state = Arc::new(AppState::new(service, ServerConfig::default()));
        create_router(state)
    }

    fn predict_body(bmi: &str, heart_rate: f64) -> String {
        serde_json::json!({
            "Gender": "Male",
            "Age": 33,
            "Sleep_Duration": 7.5,
            "Quality_of_Sleep": 8,
            "BMI_Category": bmi,
            "Heart_Rate": heart_rate,
            "Daily_Steps": 8000,
            "Sleep_Disorder": "Nothing"
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = test_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_welcome_payload() {
        let response = test_app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["message"].as_str().unwrap().contains("stress"));
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let response = test_app()
            .oneshot(Request::builder().uri("/stats").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["artifact"]["tree_count"], 1);
        assert_eq!(json["artifact"]["column_count"], 22);
    }

    #[tokio::test]
    async fn test_predict_happy_path() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/predict")
                    .header("Content-Type", "application/json")
                    .body(Body::from(predict_body("Normal", 75.0)))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["predicted_stress_level"], "Low");
        assert!(json.get("warnings").is_none());
    }

    #[tokio::test]
    async fn test_predict_bmi_alias_normalized() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/predict")
                    .header("Content-Type", "application/json")
                    .body(Body::from(predict_body("Normal Weight", 75.0)))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_predict_unknown_category_is_400() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/predict")
                    .header("Content-Type", "application/json")
                    .body(Body::from(predict_body("Underweight", 75.0)))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], true);
        assert_eq!(json["code"], "UnknownCategory");
    }

    #[tokio::test]
    async fn test_predict_out_of_universe_warns() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/predict")
                    .header("Content-Type", "application/json")
                    .body(Body::from(predict_body("Normal", 150.0)))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["warnings"][0].as_str().unwrap().contains("Heart Rate"));
    }

    #[tokio::test]
    async fn test_predict_malformed_body_is_client_error() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/predict")
                    .header("Content-Type", "application/json")
                    .body(Body::from("{ this is not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response.status().is_client_error());
    }
}
