//! Live feed handler - most recent event log rows

use axum::{extract::{State, Query}, Json};
use fraud_rag_core::logic::event_log::LiveFeedEntry;
use serde::Deserialize;

use crate::{AppState, AppError, AppResult};
use crate::middleware::auth::UserContext;

const DEFAULT_LIMIT: usize = 20;
const MAX_LIMIT: usize = 200;

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub limit: Option<usize>,
}

impl FeedQuery {
    fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

pub async fn list(
    State(state): State<AppState>,
    _user: UserContext,
    Query(query): Query<FeedQuery>,
) -> AppResult<Json<Vec<LiveFeedEntry>>> {
    let entries = state.pipeline
        .recent(query.limit())
        .await
        .map_err(|e| AppError::InternalError(format!("live feed unavailable: {}", e)))?;

    Ok(Json(entries))
}
