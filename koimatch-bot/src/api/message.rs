//! Inbound chat message endpoint
//!
//! Receives the already-parsed text of one chat message and feeds it to
//! the registration state machine. Webhook signature verification and
//! event parsing happen upstream of this service.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::ApiError;
use crate::registration;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub user_id: String,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Reply text to send back over the chat channel
    pub reply: String,
}

/// POST /api/message
pub async fn post_message(
    State(state): State<AppState>,
    Json(request): Json<MessageRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let reply = registration::handle_message(
        &state.db,
        state.notifier.as_ref(),
        &request.user_id,
        &request.text,
    )
    .await?;

    Ok(Json(MessageResponse { reply }))
}
