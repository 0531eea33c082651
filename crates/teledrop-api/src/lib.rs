//! teledrop-api - HTTP API server for teledrop: the Drop Lifecycle
//! Coordinator and the Range & Stream Gateway over a self-hosted file share.
//!
//! Split into a library and a thin binary (`main.rs`) so integration tests
//! can build the router directly against an in-memory repository, the same
//! way the teacher's crates separate reusable logic from the process entry
//! point.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod openapi;
pub mod rate_limit;
pub mod request_id;
pub mod services;
pub mod state;

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use config::Config;
use request_id::MakeRequestUuidV7;
use state::AppState;

fn parse_allowed_origins(cfg: &Config) -> Vec<HeaderValue> {
    if cfg.cors_allowed_origins.is_empty() {
        return vec![HeaderValue::from_static("http://localhost:3000")];
    }
    cfg.cors_allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect()
}

fn content_router() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::drops::create).get(handlers::drops::list))
        .route("/keycheck/:slug", get(handlers::drops::keycheck))
        .route("/:slug/preview", get(handlers::drops::preview))
        .route(
            "/:slug",
            get(handlers::drops::download).delete(handlers::drops::delete),
        )
        .route("/:slug/detail", patch(handlers::drops::update_detail))
        .route("/:slug/permission", patch(handlers::drops::update_permission))
        .route("/:slug/favorite", patch(handlers::drops::update_favorite))
        .route("/:slug/password", patch(handlers::drops::set_password))
        .route("/:slug/reset", patch(handlers::drops::remove_password))
}

/// Assemble the full router, with the teacher's exact middleware layering
/// order (rate limit, then auth, then tracing/request-id, then CORS, then
/// the body size cap) and the final `with_state` application.
pub fn app(state: AppState, config: &Config) -> Router {
    let max_body_size = if config.max_upload_bytes > 0 {
        config.max_upload_bytes as usize
    } else {
        usize::MAX
    };

    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/auth/login", post(auth::login))
        .nest("/api/content", content_router())
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", openapi::ApiDoc::openapi()))
        .layer(axum::middleware::from_fn_with_state(state.clone(), rate_limit::rate_limit_middleware))
        .layer(axum::middleware::from_fn_with_state(state.clone(), auth::auth_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(parse_allowed_origins(config)))
                .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
                .allow_credentials(true)
                .max_age(std::time::Duration::from_secs(3600)),
        )
        .layer(RequestBodyLimitLayer::new(max_body_size))
        .with_state(state)
}

pub fn init_tracing(cfg: &Config) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "teledrop_api=info,tower_http=info".into());
    let registry = tracing_subscriber::registry().with(env_filter);

    if let Some(dir) = &cfg.log_dir {
        let file_appender = tracing_appender::rolling::daily(dir, "teledrop-api.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if cfg.log_format == "json" {
            registry.with(tracing_subscriber::fmt::layer().json().with_writer(non_blocking)).init();
        } else {
            registry
                .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(non_blocking))
                .init();
        }
        Some(guard)
    } else if cfg.log_format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
        None
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
        None
    }
}
