//! HTTP surface: routes and middleware.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::handlers::{self, AppState};

/// Estimation requests are a handful of numbers.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Builds the application router.
///
/// Rate limiting keys on the client IP, so the router must be served with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn router(state: Arc<AppState>) -> anyhow::Result<Router> {
    // One token every `1000 / rate` whole milliseconds, so rates that do not
    // divide 1000 come out slightly faster (3/s replenishes every 333 ms).
    // Config caps the rate at 1000/s.
    let replenish_ms = (1000 / state.config.rate_limit_per_second).max(1);
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(replenish_ms)
            .burst_size(state.config.rate_limit_burst)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("invalid rate limit configuration"))?,
    );

    let protected_routes = Router::new()
        .route("/api/v1/objectives", get(handlers::list_objectives))
        .route("/api/v1/objectives/:name", get(handlers::get_objective))
        .route("/api/v1/estimate", post(handlers::estimate))
        .route("/api/v1/predict", get(handlers::predict))
        // Legacy paths used by the browser form
        .route("/objectives", get(handlers::objective_names))
        .route("/calculate", post(handlers::estimate))
        .layer(
            ServiceBuilder::new()
                .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
                .layer(GovernorLayer {
                    config: governor_conf,
                }),
        );

    Ok(Router::new()
        .route("/health", get(handlers::health))
        .merge(protected_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()))
}
