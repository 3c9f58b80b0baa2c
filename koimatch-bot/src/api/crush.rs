//! Crush declaration endpoint

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::ApiError;
use crate::matching::MatchOutcome;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CrushRequest {
    pub user_id: String,
    /// Declared target identity - compared by exact string equality,
    /// never normalized
    pub name: String,
    pub birthday: String,
}

#[derive(Debug, Serialize)]
pub struct CrushResponse {
    /// "matched", "not_reciprocated" or "target_not_registered"
    pub result: String,
    pub first_declaration: bool,
    /// Present only when result is "matched"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner_name: Option<String>,
}

/// POST /api/crush
pub async fn post_crush(
    State(state): State<AppState>,
    Json(request): Json<CrushRequest>,
) -> Result<Json<CrushResponse>, ApiError> {
    let declared = state
        .matcher
        .declare_crush(&request.user_id, &request.name, &request.birthday)
        .await?;

    let (result, partner_name) = match declared.outcome {
        MatchOutcome::TargetNotRegistered => ("target_not_registered", None),
        MatchOutcome::NotReciprocated => ("not_reciprocated", None),
        MatchOutcome::Matched { partner_name, .. } => ("matched", Some(partner_name)),
    };

    Ok(Json(CrushResponse {
        result: result.to_string(),
        first_declaration: declared.first_declaration,
        partner_name,
    }))
}
