use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::message_dto::SendMessagePayload, error::Result, middleware::auth::Claims, AppState,
};

#[axum::debug_handler]
pub async fn send_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SendMessagePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let actor = state.auth_service.current_user(&claims).await?;
    let message = state.message_service.send(&actor, payload).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// Conversation with another user. Fetching marks the actor's incoming
/// messages read.
#[axum::debug_handler]
pub async fn get_thread(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let actor = state.auth_service.current_user(&claims).await?;
    let messages = state.message_service.thread_with(&actor, user_id).await?;
    Ok(Json(messages))
}

#[axum::debug_handler]
pub async fn unread_count(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let actor = state.auth_service.current_user(&claims).await?;
    let count = state.message_service.unread_count(&actor).await?;
    Ok(Json(json!({ "unread_count": count })))
}
