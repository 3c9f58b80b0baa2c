//! Structured self-registration endpoint
//!
//! Unlike the chat flow, this path enforces the full name rule
//! (2-20 full-width katakana characters) and can edit an existing
//! profile. Editing the identity of a matched user dissolves the match
//! on both sides.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub user_id: String,
    pub name: String,
    pub birthday: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub status: String,
}

/// POST /api/register
pub async fn post_register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    state
        .matcher
        .register_self(&request.user_id, &request.name, &request.birthday)
        .await?;

    Ok(Json(RegisterResponse {
        status: "ok".to_string(),
    }))
}
