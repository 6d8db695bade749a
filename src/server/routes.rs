use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{error::ApiError, AppState};
use crate::core::ingest::parse_roster;
use crate::core::ranking::search;
use crate::core::repository::parse_overrides;
use crate::domain::model::{FixedRankings, Participant, RankedEntry};

pub const ACCESS_CODE_HEADER: &str = "x-access-code";

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadPreview {
    pub count: usize,
    pub qualified: usize,
    pub rows: Vec<Participant>,
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(expected) = state.access_code.as_deref() else {
        return Ok(());
    };
    let supplied = headers
        .get(ACCESS_CODE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim);

    if supplied == Some(expected.trim()) {
        Ok(())
    } else {
        Err(ApiError::Unauthorized)
    }
}

fn ok() -> Json<Value> {
    Json(json!({ "ok": true }))
}

pub async fn health_handler() -> &'static str {
    "ok"
}

pub async fn get_leaderboard_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Participant>>, ApiError> {
    let participants = state
        .repository
        .participants()
        .await
        .map_err(ApiError::internal("Failed to load leaderboard"))?;
    Ok(Json(participants))
}

pub async fn post_leaderboard_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    authorize(&state, &headers)?;

    let payload: Value =
        serde_json::from_slice(&body).map_err(|_| ApiError::BadRequest("Invalid payload"))?;
    if !payload.is_array() {
        return Err(ApiError::BadRequest("Invalid payload"));
    }
    let participants: Vec<Participant> =
        serde_json::from_value(payload).map_err(|_| ApiError::BadRequest("Invalid payload"))?;

    state
        .repository
        .replace_participants(&participants)
        .await
        .map_err(ApiError::internal("Failed to save"))?;
    Ok(ok())
}

pub async fn ranked_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<RankedEntry>>, ApiError> {
    let entries = state
        .repository
        .leaderboard()
        .await
        .map_err(ApiError::internal("Failed to load leaderboard"))?;

    Ok(Json(match query.q.as_deref() {
        Some(q) => search(&entries, q),
        None => entries,
    }))
}

/// Parses an uploaded roster and returns the rows for review. Nothing is
/// stored; the client commits with `POST /api/leaderboard`.
pub async fn upload_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<UploadPreview>, ApiError> {
    authorize(&state, &headers)?;

    let rows = parse_roster(&body).map_err(ApiError::UnprocessableRoster)?;
    tracing::info!("Parsed upload with {} rows", rows.len());

    Ok(Json(UploadPreview {
        count: rows.len(),
        qualified: rows.iter().filter(|p| p.is_qualifying()).count(),
        rows,
    }))
}

pub async fn get_fixed_rankings_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<FixedRankings>, ApiError> {
    let overrides = state
        .repository
        .overrides()
        .await
        .map_err(ApiError::internal("Failed to load fixed rankings"))?;
    Ok(Json(overrides))
}

pub async fn post_fixed_rankings_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    authorize(&state, &headers)?;

    let payload: Value =
        serde_json::from_slice(&body).map_err(|_| ApiError::BadRequest("Invalid payload"))?;
    if !payload.is_object() {
        return Err(ApiError::BadRequest("Invalid payload"));
    }
    let overrides =
        parse_overrides(&payload).map_err(|_| ApiError::BadRequest("Invalid ranking value"))?;

    state
        .repository
        .replace_overrides(overrides)
        .await
        .map_err(ApiError::internal("Failed to save fixed rankings"))?;
    Ok(ok())
}

pub async fn delete_fixed_ranking_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<EmailQuery>,
) -> Result<Json<Value>, ApiError> {
    authorize(&state, &headers)?;

    let email = query
        .email
        .filter(|e| !e.trim().is_empty())
        .ok_or(ApiError::BadRequest("Email parameter required"))?;

    state
        .repository
        .remove_override(&email)
        .await
        .map_err(ApiError::internal("Failed to remove fixed ranking"))?;
    Ok(ok())
}
