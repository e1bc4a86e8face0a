use std::any::Any;

use axum::{
    http::{HeaderValue, Method},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowHeaders, AllowOrigin, CorsLayer},
    trace::{DefaultOnFailure, TraceLayer},
};
use tracing::{warn, Level};

use super::middleware::{observability_middleware, security_headers_middleware};
use super::state::AppState;
use super::types::ApiError;
use super::{auth, categories, health, tasks, users};
use crate::config::{AppConfig, CorsConfig};

/// Create the full router with application state
pub fn create_router(state: AppState, config: &AppConfig) -> Router {
    let mut router = Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        .nest("/auth", auth::create_auth_router())
        .nest("/users", users::create_users_router())
        .nest("/categories", categories::create_categories_router())
        .route("/categories/", categories::collection())
        .nest("/tasks", tasks::create_tasks_router())
        .route("/tasks/", tasks::collection());

    if config.metrics.enabled {
        router = router.route("/metrics", get(health::metrics_handler));
    }

    with_pipeline(router, state, &config.cors)
}

/// Wrap routes in the request pipeline.
///
/// Innermost first: panic catcher, observability, security headers, trace
/// span, CORS.
pub fn with_pipeline(router: Router<AppState>, state: AppState, cors: &CorsConfig) -> Router {
    router
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(middleware::from_fn_with_state(
            state.metrics.clone(),
            observability_middleware,
        ))
        .layer(middleware::from_fn(security_headers_middleware))
        // Unhandled errors are logged at ERROR by the observability layer only
        .layer(
            TraceLayer::new_for_http().on_failure(DefaultOnFailure::new().level(Level::DEBUG)),
        )
        .layer(cors_layer(cors))
        .with_state(state)
}

fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    ApiError::internal("panic", anyhow::anyhow!("handler panicked: {}", message)).into_response()
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers(AllowHeaders::mirror_request())
}
