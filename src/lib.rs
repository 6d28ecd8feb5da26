use axum::Router;
use config::Config;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
}

/// 组装完整的应用路由，main 和集成测试共用
pub fn app(state: AppState) -> Router {
    let router = Router::new()
        .merge(routes::public_routes())
        .merge(routes::protected_routes(state.clone()))
        .fallback(routes::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum::middleware::from_fn(middleware::log_errors)),
        )
        .layer(cors_layer(&state.config));

    router.with_state(state)
}

#[cfg(debug_assertions)]
fn cors_layer(_config: &Config) -> CorsLayer {
    tracing::debug!("Adding permissive CORS layer for development mode");
    CorsLayer::permissive()
}

#[cfg(not(debug_assertions))]
fn cors_layer(config: &Config) -> CorsLayer {
    use axum::http::{HeaderValue, Method, header};

    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    match HeaderValue::from_str(&config.cors_origin) {
        Ok(origin) => layer.allow_origin(origin),
        Err(_) => {
            tracing::warn!(
                "Invalid CORS_ORIGIN {:?}, cross-origin requests disabled",
                config.cors_origin
            );
            layer
        }
    }
}
