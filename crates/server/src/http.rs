//! REST surface
//!
//! The companion CRUD routes for call bootstrap. Lifecycle routes call into
//! the same `CallStateMachine` the socket relay uses, so an answer over
//! HTTP obeys exactly the rules an answer over the socket does.

use axum::async_trait;
use axum::extract::{FromRequestParts, Path, State};
use axum::http::header;
use axum::http::request::Parts;
use axum::Json;
use chrono::{DateTime, Utc};
use ringline_session_core::SessionId;
use ringline_users_core::{CreateUserRequest, CurrentUser, UserStore, UserSummary};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

/// Bearer-token authenticated requester.
pub struct AuthUser(pub CurrentUser);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;
        let current = state.auth.verify_token(token)?;
        Ok(AuthUser(current))
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct CallStatusResponse {
    pub session_id: SessionId,
    pub caller_id: i64,
    pub callee_id: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub caller_name: String,
    pub callee_name: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<Json<Value>, ApiError> {
    state.auth.register(request).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Registration successful"
    })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let result = state.auth.login(&request.username, &request.password).await?;
    Ok(Json(json!({
        "success": true,
        "token": result.access_token,
        "user": UserSummary::from(&result.user),
    })))
}

/// Everyone except the requester: the list a client dials from.
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    let users = state.users.list_users_except(current.user_id).await?;
    Ok(Json(users))
}

pub async fn initiate_call(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    Path(callee_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let session = state.machine.create(current.user_id, callee_id).await?;
    Ok(Json(json!({ "session_id": session.session_id })))
}

pub async fn call_status(
    State(state): State<AppState>,
    AuthUser(_current): AuthUser,
    Path(session_id): Path<String>,
) -> Result<Json<CallStatusResponse>, ApiError> {
    let session = state.machine.lookup(&SessionId(session_id)).await?;

    let caller = state.users.get_user(session.caller_id).await?;
    let callee = state.users.get_user(session.callee_id).await?;

    Ok(Json(CallStatusResponse {
        status: session.state.to_string(),
        session_id: session.session_id,
        caller_id: session.caller_id,
        callee_id: session.callee_id,
        created_at: session.created_at,
        ended_at: session.ended_at,
        caller_name: caller.map(|u| u.username).unwrap_or_default(),
        callee_name: callee.map(|u| u.username).unwrap_or_default(),
    }))
}

pub async fn answer_call(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    Path(session_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state
        .machine
        .answer(&SessionId(session_id), current.user_id)
        .await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn reject_call(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    Path(session_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state
        .machine
        .reject(&SessionId(session_id), current.user_id)
        .await?;
    Ok(Json(json!({ "success": true })))
}
