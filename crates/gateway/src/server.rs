//! HTTP surface: one operation endpoint plus liveness.

use std::{net::SocketAddr, sync::Arc};

use {
    axum::{
        Json, Router,
        extract::{State, rejection::JsonRejection},
        http::HeaderMap,
        response::{IntoResponse, Response},
        routing::{get, post},
    },
    tower_http::cors::{Any, CorsLayer},
    tracing::info,
};

use {
    haru_config::GatewayConfig,
    haru_protocol::{HealthPayload, OperationRequest, OperationResponse},
};

use crate::{
    context::RequestContext, dispatch::Dispatcher, error::GatewayError, guard,
    ops::OperationRegistry,
};

// ── Shared app state ─────────────────────────────────────────────────────────

/// Per-process state. Everything here is immutable after startup, so
/// concurrent handlers share it without locking.
pub struct GatewayState {
    pub registry: OperationRegistry,
    pub dispatcher: Dispatcher,
}

// ── Server startup ───────────────────────────────────────────────────────────

/// Build the gateway router (shared between production startup and tests).
pub fn build_gateway_app(state: Arc<GatewayState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/healthz", get(health_handler))
        .route("/api/ops", post(ops_handler))
        .layer(cors)
        .with_state(state)
}

/// Start the gateway HTTP server.
pub async fn start_gateway(bind: &str, config: GatewayConfig) -> anyhow::Result<()> {
    let dispatcher = Dispatcher::new(reqwest::Client::new(), Arc::new(config.endpoints));
    let state = Arc::new(GatewayState {
        registry: OperationRegistry::new(),
        dispatcher,
    });

    let addr: SocketAddr = format!("{bind}:{}", config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("haru gateway v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "{} operations registered, listening on {addr}",
        state.registry.len()
    );

    axum::serve(listener, build_gateway_app(state)).await?;
    Ok(())
}

// ── Handlers ─────────────────────────────────────────────────────────────────

async fn health_handler() -> Json<HealthPayload> {
    Json(HealthPayload {
        status: "ok".to_string(),
        service: "gateway".to_string(),
        time: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
    })
}

async fn ops_handler(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
    payload: Result<Json<OperationRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => {
            return GatewayError::bad_input(format!("invalid request body: {rejection}"))
                .into_response();
        },
    };

    let ctx = RequestContext::from_headers(&headers);
    match run_operation(&state, &request, &ctx).await {
        Ok(data) => {
            info!(op = %request.op, "operation completed");
            Json(OperationResponse::ok(data)).into_response()
        },
        Err(err) => {
            info!(op = %request.op, code = err.code(), "operation failed: {err}");
            err.into_response()
        },
    }
}

/// The full per-operation chain: lookup, guard, argument mapping, dispatch,
/// shape check. Guard and mapping failures return before any network I/O.
async fn run_operation(
    state: &GatewayState,
    request: &OperationRequest,
    ctx: &RequestContext,
) -> Result<serde_json::Value, GatewayError> {
    let spec = state
        .registry
        .get(&request.op)
        .ok_or_else(|| GatewayError::bad_input(format!("unknown operation: {}", request.op)))?;

    guard::check(ctx, spec.auth)?;

    let empty = serde_json::Value::Object(serde_json::Map::new());
    let args = request.params.as_ref().unwrap_or(&empty);
    let call = (spec.map)(args, ctx)?;

    let body = state.dispatcher.dispatch(&call).await?;
    spec.shape.finalize(body)
}
