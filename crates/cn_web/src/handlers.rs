use axum::{
    extract::{Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use cn_core::{Article, Category, Episode, Error, Identity};
use cn_publish::{ArticleForm, SubmissionOutcome};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

use crate::error::ApiError;
use crate::AppState;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_NAME_HEADER: &str = "x-user-name";

#[derive(Debug, Deserialize)]
pub struct ArticleQuery {
    pub category: Option<Category>,
}

#[derive(Debug, Serialize)]
pub struct PremiumView {
    pub is_premium: bool,
}

/// The caller, as forwarded by the identity provider in front of us.
pub fn identity_from_headers(headers: &HeaderMap) -> Option<Identity> {
    let token = headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?
        .trim();
    let user_id = headers.get(USER_ID_HEADER)?.to_str().ok()?.trim();
    if token.is_empty() || user_id.is_empty() {
        return None;
    }
    let identity = Identity::new(user_id, token);
    Some(match headers.get(USER_NAME_HEADER).and_then(|v| v.to_str().ok()) {
        Some(name) => identity.with_display_name(name.trim()),
        None => identity,
    })
}

pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ArticleQuery>,
) -> Json<Vec<Article>> {
    Json(match query.category {
        Some(category) => state.store.by_category(category).await,
        None => state.store.all().await,
    })
}

pub async fn get_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Article>, ApiError> {
    state
        .store
        .get(&id)
        .await
        .map(Json)
        .ok_or_else(|| Error::NotFound(format!("article {}", id)).into())
}

pub async fn refresh_articles(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let count = state.store.refresh(state.backend.as_ref()).await?;
    Ok(Json(json!({ "count": count })))
}

pub async fn list_episodes(State(state): State<Arc<AppState>>) -> Json<Vec<Episode>> {
    Json(state.store.episodes(&state.audio_base_url).await)
}

pub async fn create_article(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(form): Json<ArticleForm>,
) -> Result<(StatusCode, Json<SubmissionOutcome>), ApiError> {
    let identity = identity_from_headers(&headers);
    let outcome = state.workflow.submit(&form, identity.as_ref()).await?;

    if let Err(e) = state.store.refresh(state.backend.as_ref()).await {
        warn!("Published article {} but the cache refresh failed: {}", outcome.article.id, e);
    }
    Ok((StatusCode::CREATED, Json(outcome)))
}

pub async fn premium_status(State(state): State<Arc<AppState>>) -> Json<PremiumView> {
    Json(PremiumView {
        is_premium: state.premium.is_premium(),
    })
}

pub async fn upgrade_premium(State(state): State<Arc<AppState>>) -> Result<Json<PremiumView>, ApiError> {
    let is_premium = state.premium.upgrade(state.local.as_ref()).await?;
    Ok(Json(PremiumView { is_premium }))
}
