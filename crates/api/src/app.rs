use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use domain::{BookingServices, BookingStore, Clock};
use shared::identity::IdentityVerifier;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, require_admin, require_identity, trace_id,
};
use crate::routes::{admin, courts, health, profiles, reservations};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn BookingStore>,
    pub services: BookingServices,
    pub verifier: Arc<IdentityVerifier>,
}

impl AppState {
    /// Wires the booking services over `store` using the configured policy
    /// and identity verifier.
    pub fn new(
        config: Config,
        store: Arc<dyn BookingStore>,
        clock: Arc<dyn Clock>,
    ) -> anyhow::Result<Self> {
        let policy = config.booking_policy()?;
        let verifier = config.identity_verifier()?;
        let services = BookingServices::new(store.clone(), clock, policy);

        Ok(Self {
            config: Arc::new(config),
            store,
            services,
            verifier: Arc::new(verifier),
        })
    }
}

pub fn create_app(state: AppState) -> Router {
    let config = state.config.clone();

    let cors = if config.security.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
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

    // Authenticated user routes
    let user_routes = Router::new()
        .route(
            "/api/v1/me/profile",
            get(profiles::get_my_profile).put(profiles::upsert_my_profile),
        )
        .route(
            "/api/v1/me/reservations",
            get(reservations::list_my_reservations),
        )
        .route("/api/v1/reservations", post(reservations::create_reservation))
        .route(
            "/api/v1/reservations/:reservation_id",
            get(reservations::get_reservation),
        )
        .route(
            "/api/v1/reservations/:reservation_id/cancel",
            post(reservations::cancel_reservation),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_identity,
        ));

    // Admin routes (identity token with the admin role)
    let admin_routes = Router::new()
        .route("/api/v1/admin/reservations", get(admin::list_reservations))
        .route(
            "/api/v1/admin/reservations/pending",
            get(admin::list_pending_reservations),
        )
        .route("/api/v1/admin/reservations/sweep", post(admin::run_sweeps))
        .route(
            "/api/v1/admin/reservations/:reservation_id/approve",
            post(admin::approve_reservation),
        )
        .route(
            "/api/v1/admin/reservations/:reservation_id/reject",
            post(admin::reject_reservation),
        )
        .route(
            "/api/v1/admin/reservations/:reservation_id/postpone",
            post(admin::postpone_reservation),
        )
        .route(
            "/api/v1/admin/reservations/:reservation_id/cancel",
            post(admin::cancel_reservation),
        )
        .route(
            "/api/v1/admin/reservations/:reservation_id/no-show-check",
            post(admin::check_no_show),
        )
        .route("/api/v1/admin/courts", post(admin::create_court))
        .route(
            "/api/v1/admin/courts/:court_id/disable",
            post(admin::disable_court),
        )
        .route(
            "/api/v1/admin/courts/:court_id/enable",
            post(admin::enable_court),
        )
        .route("/api/v1/admin/users", get(admin::list_users))
        .route(
            "/api/v1/admin/users/:user_id/reservations",
            get(admin::list_user_reservations),
        )
        .route(
            "/api/v1/admin/users/:user_id/rating",
            put(admin::set_user_rating),
        )
        .route("/api/v1/admin/stats", get(admin::get_stats))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler))
        .route("/api/v1/courts", get(courts::list_courts))
        .route("/api/v1/courts/:court_id", get(courts::get_court))
        .route(
            "/api/v1/courts/:court_id/availability",
            get(courts::check_availability),
        );

    Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(admin_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
