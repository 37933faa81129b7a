use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

pub mod dto;
pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

pub const DEFAULT_ADDR: &str = "0.0.0.0:8081";

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/v1/news", get(handlers::list_news))
        .route("/api/v1/news/summary", get(handlers::news_summary))
        .route("/api/v1/news/ticker/:ticker", get(handlers::news_by_ticker))
        .route("/api/v1/news/refresh", post(handlers::refresh))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub mod prelude {
    pub use crate::{create_app, AppState};
    pub use nw_core::{Article, Error, Result};
}
