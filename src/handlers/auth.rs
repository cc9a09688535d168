use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::{AppendHeaders, IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::AppError;
use crate::models::IdentificationNumber;
use crate::state::AppState;

use super::ApiResponse;

pub const SESSION_COOKIE: &str = "clinicdesk_session";

const INVALID_ID: &str = "Please enter a valid 7-8 digit ID number";

/// Session token from the request's `Cookie` header.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub id_number: Value,
}

// POST /login
pub async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, AppError> {
    // Digits only; JSON numbers are accepted as their decimal text.
    let raw = match &payload.id_number {
        Value::String(s) => s.clone(),
        Value::Number(n) if n.is_u64() => n.to_string(),
        _ => return Err(AppError::Validation(INVALID_ID.to_string())),
    };
    let id_number = IdentificationNumber::parse(&raw)
        .map_err(|_| AppError::Validation(INVALID_ID.to_string()))?;

    state.sessions.expire();
    let existing = session_token(&headers);
    let token = state.sessions.login(existing.as_deref(), id_number);
    tracing::info!(id_number = %id_number, "patient logged in");

    let cookie = format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax");
    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(ApiResponse::success("Login successful")),
    )
        .into_response())
}

// POST /logout
pub async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers) {
        state.sessions.remove(&token);
    }

    let cookie = format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    (
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(ApiResponse::success("Logged out successfully")),
    )
        .into_response()
}
