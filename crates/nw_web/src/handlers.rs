use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use nw_core::{Article, NewsSummary};

use crate::dto::*;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /api/v1/news
pub async fn list_news(
    State(state): State<AppState>,
    Query(query): Query<NewsQuery>,
) -> Result<Json<Vec<Article>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_NEWS_LIMIT);
    let articles = state.aggregator.list_articles(limit, query.ticker()).await?;
    Ok(Json(articles))
}

/// GET /api/v1/news/summary
pub async fn news_summary(State(state): State<AppState>) -> Result<Json<NewsSummary>, ApiError> {
    Ok(Json(state.aggregator.summary().await?))
}

/// GET /api/v1/news/ticker/:ticker
pub async fn news_by_ticker(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<Article>>, ApiError> {
    let ticker = ticker.trim();
    if ticker.is_empty() {
        return Err(ApiError::BadRequest("Ticker cannot be empty".into()));
    }
    let limit = query.limit.unwrap_or(DEFAULT_TICKER_LIMIT);
    let articles = state.aggregator.articles_for_entity(ticker, limit).await?;
    Ok(Json(articles))
}

/// POST /api/v1/news/refresh
pub async fn refresh(State(state): State<AppState>) -> Result<Json<RefreshResponse>, ApiError> {
    let report = state.aggregator.refresh_with_report().await?;
    tracing::info!("🔄 Manual refresh: {} articles accepted", report.accepted());

    Ok(Json(RefreshResponse {
        status: "refreshed",
        timestamp: Utc::now(),
        accepted: report.accepted(),
        rejected: report.rejected(),
        failed_feeds: report.failed_feeds(),
        inserted: report.merge.inserted,
        replaced: report.merge.replaced,
    }))
}
