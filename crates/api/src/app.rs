use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{devices, geofence_events, health, pings, reports, zones};
use crate::services::{AlertChannel, ConsoleChannel, ContactAlertDispatcher, PingProcessor, WebhookChannel};
use persistence::repositories::ContactRepository;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub processor: Arc<PingProcessor>,
}

pub fn create_app(config: Config, pool: PgPool) -> Router {
    let config = Arc::new(config);

    // Wire the alert dispatch chain: channel -> dispatcher -> processor
    let channel: Arc<dyn AlertChannel> = match config.alerts.channel.as_str() {
        "webhook" => Arc::new(WebhookChannel::new(
            config.alerts.webhook_url.clone(),
            config.alerts.timeout_ms,
        )),
        _ => Arc::new(ConsoleChannel),
    };
    let dispatcher = Arc::new(ContactAlertDispatcher::new(
        ContactRepository::new(pool.clone()),
        channel,
        config.alerts.enabled,
    ));
    let processor = Arc::new(PingProcessor::new(pool.clone(), dispatcher));

    let state = AppState {
        pool,
        config: config.clone(),
        processor,
    };

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // Production: only allow specified origins
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Detection and reporting API, /api/v1 prefix
    let api_routes = Router::new()
        .route("/api/v1/pings", post(pings::ingest_ping))
        .route("/api/v1/animals/:animal_id/pings", get(pings::get_ping_history))
        .route(
            "/api/v1/geofence-events",
            get(geofence_events::list_geofence_events),
        )
        .route(
            "/api/v1/geofence-events/:event_id",
            get(geofence_events::get_geofence_event),
        )
        .route("/api/v1/zones/:zone_id/occupancy", get(zones::get_zone_occupancy))
        .route(
            "/api/v1/animals/:animal_id/location-summary",
            get(reports::get_location_summary),
        )
        .route(
            "/api/v1/devices/:device_id/health",
            get(devices::get_device_health),
        );

    // Public routes (health probes and metrics export)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(trace_id))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}
