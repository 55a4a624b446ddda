//! Externally produced decisions (streaming dataflow results)

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::{AppState, AppError, AppResult};
use crate::middleware::auth::UserContext;

/// Decision pushed by an external producer.
///
/// `user_id` is accepted for compatibility but ignored; the
/// authenticated user owns the record.
#[derive(Debug, Deserialize)]
pub struct PathwayResult {
    #[serde(default)]
    pub user_id: Option<String>,
    pub amount: f64,
    #[serde(rename = "isFraud")]
    pub is_fraud: bool,
    #[serde(default)]
    pub explanation: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ReceivedResponse {
    pub status: &'static str,
}

pub async fn receive(
    State(state): State<AppState>,
    user: UserContext,
    Json(req): Json<PathwayResult>,
) -> AppResult<Json<ReceivedResponse>> {
    if let Some(claimed) = req.user_id.as_deref() {
        if claimed != user.user_id.to_string() {
            tracing::debug!("Ignoring payload user_id {} for {}", claimed, user.user_id);
        }
    }

    state.pipeline
        .record_external(&user.user_id.to_string(), req.amount, req.is_fraud, &req.explanation)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    Ok(Json(ReceivedResponse { status: "received" }))
}
