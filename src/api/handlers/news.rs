use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    error::AppResult,
    models::NewsAnalysis,
    services::news::{NewsFeedPage, NewsService},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct NewsFeedQuery {
    pub cursor: Option<i64>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub min_score: Option<i32>,
    pub max_score: Option<i32>,
}

fn default_limit() -> i64 {
    20
}

/// GET /news — cursor-paginated feed, newest first.
pub async fn get_news_feed(
    State(state): State<AppState>,
    Query(query): Query<NewsFeedQuery>,
) -> AppResult<Json<NewsFeedPage>> {
    let service = NewsService::new(state.db.clone());
    let page = service
        .get_feed(query.cursor, query.limit, query.min_score, query.max_score)
        .await?;
    Ok(Json(page))
}

/// GET /news/:id
pub async fn get_news_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<NewsAnalysis>> {
    let service = NewsService::new(state.db.clone());
    let item = service.get_by_id(id).await?;
    Ok(Json(item))
}
