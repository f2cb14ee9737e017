//! REST API handlers for visit intake, conversion feedback, and operational endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};
use utoipa::ToSchema;
use variant_core::{Arm, FeedbackAction, VariantError};
use variant_rl_engine::{AgentState, EpsilonGreedyAgent};

/// Shared application state for REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<EpsilonGreedyAgent>,
    pub node_id: String,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(agent: Arc<EpsilonGreedyAgent>, node_id: impl Into<String>) -> Self {
        Self {
            agent,
            node_id: node_id.into(),
            start_time: Instant::now(),
        }
    }
}

/// Outcome reported by the landing page for the variant it displayed.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct FeedbackRequest {
    /// Variant that was shown, e.g. `"day"`.
    pub version: Option<String>,
    /// Visitor action; `"Book"` counts as a conversion.
    pub action: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct VisitResponse {
    pub version: Arm,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackResponse {
    pub next_version: Arm,
    pub agent_state: AgentState,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StateResponse {
    #[serde(flatten)]
    pub state: AgentState,
    pub epsilon: f64,
    pub cold_start_remaining: usize,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub node_id: String,
    pub uptime_secs: u64,
    pub cold_start_remaining: usize,
}

/// POST /api/visit — A new visitor arrived; pick the variant to render.
#[utoipa::path(
    post,
    path = "/api/visit",
    tag = "Bandit",
    responses(
        (status = 200, description = "Variant selected for this visitor", body = VisitResponse),
    )
)]
pub async fn handle_visit(State(state): State<AppState>) -> Json<VisitResponse> {
    let version = state.agent.choose();
    metrics::counter!("bandit.visits", "arm" => version.to_string()).increment(1);
    Json(VisitResponse { version })
}

/// POST /api/feedback — Record the visitor's action and return the next variant.
///
/// An unparseable body is treated like one with no fields, so it is rejected
/// for lacking a valid `version`.
#[utoipa::path(
    post,
    path = "/api/feedback",
    tag = "Bandit",
    request_body = FeedbackRequest,
    responses(
        (status = 200, description = "Feedback recorded", body = FeedbackResponse),
        (status = 400, description = "Unknown or missing version", body = ErrorResponse),
    )
)]
pub async fn handle_feedback(
    State(state): State<AppState>,
    payload: Option<Json<FeedbackRequest>>,
) -> Result<Json<FeedbackResponse>, (StatusCode, Json<ErrorResponse>)> {
    let request = payload.map(|Json(r)| r).unwrap_or_default();
    let label = request.version.unwrap_or_default();

    let arm = state.agent.parse_arm(&label).map_err(|e| invalid_version(&label, e))?;

    let action = FeedbackAction::parse(request.action.as_deref().unwrap_or_default());
    state
        .agent
        .update(&arm, action.reward())
        .map_err(|e| invalid_version(&label, e))?;

    metrics::counter!(
        "bandit.feedback",
        "arm" => arm.to_string(),
        "converted" => action.is_conversion().to_string()
    )
    .increment(1);

    let next_version = state.agent.choose();
    debug!(version = %arm, ?action, next = %next_version, "Feedback applied");

    Ok(Json(FeedbackResponse {
        next_version,
        agent_state: state.agent.state(),
    }))
}

fn invalid_version(label: &str, e: VariantError) -> (StatusCode, Json<ErrorResponse>) {
    warn!(version = %label, error = %e, "Feedback rejected");
    metrics::counter!("api.validation_errors").increment(1);
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: "invalid version".to_string(),
            message: e.to_string(),
        }),
    )
}

/// GET /api/state — Current agent statistics.
#[utoipa::path(
    get,
    path = "/api/state",
    tag = "Bandit",
    responses(
        (status = 200, description = "Per-arm value estimates and counts", body = StateResponse),
    )
)]
pub async fn handle_state(State(state): State<AppState>) -> Json<StateResponse> {
    Json(StateResponse {
        state: state.agent.state(),
        epsilon: state.agent.epsilon(),
        cold_start_remaining: state.agent.cold_start_remaining(),
    })
}

/// GET /health — Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Operations",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        node_id: state.node_id.clone(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        cold_start_remaining: state.agent.cold_start_remaining(),
    })
}

/// GET /ready — Readiness probe.
/// The agent is constructed before the listener binds.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "Operations",
    responses((status = 200, description = "Ready to accept traffic"))
)]
pub async fn readiness() -> StatusCode {
    StatusCode::OK
}

/// GET /live — Liveness probe.
#[utoipa::path(
    get,
    path = "/live",
    tag = "Operations",
    responses((status = 200, description = "Process is alive"))
)]
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}
