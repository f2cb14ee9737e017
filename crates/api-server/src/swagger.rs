//! OpenAPI specification and Swagger UI configuration.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Variant Express API",
        version = "0.1.0",
        description = "A/B landing page decision service backed by an epsilon-greedy multi-armed bandit.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Bandit", description = "Variant selection and conversion feedback"),
        (name = "Operations", description = "Health, readiness, and liveness probes"),
    ),
    paths(
        // Bandit
        crate::rest::handle_visit,
        crate::rest::handle_feedback,
        crate::rest::handle_state,
        // Operations
        crate::rest::health_check,
        crate::rest::readiness,
        crate::rest::liveness,
    ),
    components(schemas(
        variant_core::Arm,
        variant_rl_engine::AgentState,
        crate::rest::FeedbackRequest,
        crate::rest::VisitResponse,
        crate::rest::FeedbackResponse,
        crate::rest::StateResponse,
        crate::rest::ErrorResponse,
        crate::rest::HealthResponse,
    ))
)]
pub struct ApiDoc;
