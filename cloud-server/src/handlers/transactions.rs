//! Transaction decision handler

use axum::{extract::State, Json};
use fraud_rag_core::logic::transaction::TransactionRequest;
use fraud_rag_core::DecisionResponse;

use crate::{AppState, AppResult};
use crate::middleware::auth::UserContext;

/// Score, log, ground and explain one transaction
pub async fn submit(
    State(state): State<AppState>,
    user: UserContext,
    Json(req): Json<TransactionRequest>,
) -> AppResult<Json<DecisionResponse>> {
    let decision = state.pipeline
        .handle_request(&user.user_id.to_string(), req)
        .await?;

    Ok(Json(decision))
}
