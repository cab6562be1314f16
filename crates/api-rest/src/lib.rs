//! # API REST
//!
//! REST API implementation for medassist.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, session ids)
//!
//! Uses `api-shared` for wire types and `medassist-core` for everything else.

#![warn(rust_2018_idioms)]

use axum::{
    extract::{Path as AxumPath, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use api_shared::{
    DiagnoseReq, DiagnoseRes, DiagnosisResultDto, HealthRes, HealthService, HistoryEntryDto,
    HistoryRes, Outcome,
};
use medassist_core::{
    resolve_data_dir, CoreConfig, DiagnosisContext, DiagnosisResponse, DiagnosisResult,
    DiagnosisService, DiagnosisSource,
};

/// Application state shared across REST API handlers.
#[derive(Clone)]
pub struct AppState {
    service: DiagnosisService,
}

impl AppState {
    pub fn new(service: DiagnosisService) -> Self {
        Self { service }
    }

    /// Resolves the data directory, loads every reference table and builds the service.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be found or any table fails to load. The
    /// server must not start in that case.
    pub fn load(data_dir_override: Option<PathBuf>) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir(data_dir_override)?;
        tracing::info!("-- Loading reference data from {}", data_dir.display());
        let cfg = CoreConfig::new(data_dir)?;
        let ctx = DiagnosisContext::load(&cfg)?;
        Ok(Self::new(DiagnosisService::new(Arc::new(ctx))))
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(health, diagnose, history),
    components(schemas(
        HealthRes,
        DiagnoseReq,
        DiagnoseRes,
        DiagnosisResultDto,
        HistoryEntryDto,
        HistoryRes,
        Outcome,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router with Swagger UI and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/diagnose", post(diagnose))
        .route("/history/:session_id", get(history))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds `addr` and serves the router until the process exits.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails while running.
pub async fn serve(addr: &str, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("++ medassist REST listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

fn source_name(source: DiagnosisSource) -> &'static str {
    match source {
        DiagnosisSource::Classifier => "classifier",
        DiagnosisSource::ExactRule => "exact_rule",
        DiagnosisSource::PartialRule => "partial_rule",
    }
}

fn result_dto(result: &DiagnosisResult) -> DiagnosisResultDto {
    DiagnosisResultDto {
        diagnosis: result.diagnosis.to_string(),
        confidence: result.confidence,
        severity: result.severity.clone(),
        recommendation: result.recommendation.clone(),
        source: source_name(result.source).into(),
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API.
///
/// Used for monitoring and load balancer health checks.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/diagnose",
    request_body = DiagnoseReq,
    responses(
        (status = 200, description = "Diagnosis outcome", body = DiagnoseRes),
        (status = 400, description = "Malformed session id")
    )
)]
/// Diagnose a free-text symptom description.
///
/// Every well-formed request returns 200: "no symptoms" and "no reliable diagnosis" are
/// ordinary outcomes, distinguished by `outcome`. Only diagnosed requests carry a `result` and a
/// `report`, and only they are recorded in the session history. A request without a
/// `session_id` is given a fresh one, which only becomes a stored session if a diagnosis is
/// recorded under it.
///
/// # Errors
/// Returns `400 Bad Request` if `session_id` is present but not a UUID.
#[axum::debug_handler]
async fn diagnose(
    State(state): State<AppState>,
    Json(req): Json<DiagnoseReq>,
) -> Result<Json<DiagnoseRes>, (StatusCode, &'static str)> {
    let session = match req.session_id.as_deref() {
        Some(raw) => Uuid::parse_str(raw)
            .map_err(|_| (StatusCode::BAD_REQUEST, "session_id must be a UUID"))?,
        // Stored only once a diagnosis is recorded under it.
        None => Uuid::new_v4(),
    };

    let response = state.service.diagnose_text(&req.message, Some(session));
    let message = response.message();

    let res = match response {
        DiagnosisResponse::NoSymptoms => DiagnoseRes {
            response: message,
            outcome: Outcome::NoSymptoms,
            symptoms: vec![],
            result: None,
            report: None,
            session_id: session.to_string(),
        },
        DiagnosisResponse::NoReliableDiagnosis { symptoms } => DiagnoseRes {
            response: message,
            outcome: Outcome::NoReliableDiagnosis,
            symptoms: symptoms.iter().map(ToString::to_string).collect(),
            result: None,
            report: None,
            session_id: session.to_string(),
        },
        DiagnosisResponse::Diagnosed {
            symptoms,
            result,
            report,
        } => DiagnoseRes {
            response: message,
            outcome: Outcome::Diagnosed,
            symptoms: symptoms.iter().map(ToString::to_string).collect(),
            result: Some(result_dto(&result)),
            report: Some(report),
            session_id: session.to_string(),
        },
    };

    Ok(Json(res))
}

#[utoipa::path(
    get,
    path = "/history/{session_id}",
    params(("session_id" = String, Path, description = "Session UUID")),
    responses(
        (status = 200, description = "Diagnoses recorded in the session", body = HistoryRes),
        (status = 404, description = "Unknown session")
    )
)]
/// List the diagnoses recorded for a session, oldest first.
///
/// # Errors
/// Returns `404 Not Found` if the id is malformed or no such session exists.
#[axum::debug_handler]
async fn history(
    State(state): State<AppState>,
    AxumPath(session_id): AxumPath<String>,
) -> Result<Json<HistoryRes>, (StatusCode, &'static str)> {
    let session = Uuid::parse_str(&session_id)
        .map_err(|_| (StatusCode::NOT_FOUND, "Unknown session"))?;
    let entries = state
        .service
        .history()
        .entries(session)
        .ok_or((StatusCode::NOT_FOUND, "Unknown session"))?;

    Ok(Json(HistoryRes {
        session_id: session.to_string(),
        entries: entries
            .into_iter()
            .map(|e| HistoryEntryDto {
                timestamp: e.timestamp.to_rfc3339(),
                input: e.input,
                diagnosis: e.diagnosis.to_string(),
                confidence: e.confidence,
                recommendation: e.recommendation,
            })
            .collect(),
    }))
}
