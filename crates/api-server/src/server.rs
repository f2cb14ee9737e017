//! API server — HTTP routing, static landing pages, and the metrics exporter.

use crate::rest::{self, AppState};
use crate::swagger::ApiDoc;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use variant_core::config::AppConfig;
use variant_rl_engine::EpsilonGreedyAgent;

/// Build the full router. Paths not matched by an API route are served from
/// `static_dir` when it is given, with `index.html` answering `/`.
pub fn build_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let mut app = Router::new()
        // Bandit endpoints
        .route("/api/visit", post(rest::handle_visit))
        .route("/api/feedback", post(rest::handle_feedback))
        .route("/api/state", get(rest::handle_state))
        // Operational endpoints
        .route("/health", get(rest::health_check))
        .route("/ready", get(rest::readiness))
        .route("/live", get(rest::liveness))
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
        // Middleware
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Main API server wrapping the shared bandit agent.
pub struct ApiServer {
    config: AppConfig,
    agent: Arc<EpsilonGreedyAgent>,
}

impl ApiServer {
    pub fn new(config: AppConfig, agent: Arc<EpsilonGreedyAgent>) -> Self {
        Self { config, agent }
    }

    /// Router bound to this server's agent and front-end directory.
    pub fn router(&self) -> Router {
        let state = AppState::new(self.agent.clone(), self.config.node_id.clone());

        let static_dir = match self.config.frontend.static_dir.as_deref() {
            Some(dir) if dir.is_dir() => Some(dir),
            Some(dir) => {
                warn!(dir = %dir.display(), "Front-end directory not found, static serving disabled");
                None
            }
            None => None,
        };

        build_router(state, static_dir)
    }

    /// Start the HTTP server.
    pub async fn start_http(&self) -> anyhow::Result<()> {
        let app = self.router();

        let addr = SocketAddr::new(self.config.api.host.parse()?, self.config.api.http_port);

        info!(addr = %addr, "Starting HTTP server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    /// Start the Prometheus exporter on a separate port.
    pub async fn start_metrics(&self) -> anyhow::Result<()> {
        if !self.config.metrics.enabled {
            info!("Metrics exporter disabled");
            return Ok(());
        }

        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(SocketAddr::new(
                self.config.api.host.parse()?,
                self.config.metrics.port,
            ))
            .install()?;

        info!(port = self.config.metrics.port, "Metrics exporter started");
        Ok(())
    }
}
