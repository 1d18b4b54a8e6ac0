pub mod call;
mod extractor;
pub mod user;
mod websocket;

use crate::{conn::Hub, store::Store, util::token::JwtToken, Config};
use axum::{
    http::{header::AUTHORIZATION, HeaderValue, Method},
    Router,
};
use std::{iter::once, sync::Arc};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    sensitive_headers::SetSensitiveRequestHeadersLayer,
    trace::TraceLayer,
};

// ========================// AppState //======================== //

/// The shared state of the application
pub struct AppState {
    pub config: Config,
    pub db: Store,
    pub jwt: JwtToken,
    pub hub: Hub,
}

impl AppState {
    pub async fn new(config: Config) -> Arc<AppState> {
        let db = Store::new(&config).await;
        let jwt = JwtToken::new(&config.jwt_secret);
        let hub = Hub::new();

        Arc::new(Self {
            config,
            db,
            jwt,
            hub,
        })
    }
}

// ========================// Router //======================== //

/// Create router of the application
pub fn make_app(state: Arc<AppState>) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, axum::http::header::CONTENT_TYPE]);

    Router::new()
        .nest(
            "/api",
            user::router().merge(call::router()).merge(websocket::router()),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(SetSensitiveRequestHeadersLayer::new(once(AUTHORIZATION)))
        .layer(cors)
}
