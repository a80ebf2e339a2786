use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::interview_dto::{
        InterviewFeedbackPayload, ReschedulePayload, ScheduleInterviewPayload,
        UpdateInterviewStatusPayload,
    },
    dto::stats_dto::WidgetQuery,
    error::Result,
    middleware::auth::Claims,
    AppState,
};

#[axum::debug_handler]
pub async fn schedule_interview(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ScheduleInterviewPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let actor = state.auth_service.current_user(&claims).await?;
    let interview = state.interview_service.schedule(&actor, payload).await?;
    Ok((StatusCode::CREATED, Json(interview)))
}

#[axum::debug_handler]
pub async fn update_interview_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateInterviewStatusPayload>,
) -> Result<impl IntoResponse> {
    let actor = state.auth_service.current_user(&claims).await?;
    let interview = state
        .interview_service
        .update_status(id, &actor, payload.status)
        .await?;
    Ok(Json(interview))
}

#[axum::debug_handler]
pub async fn record_feedback(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<InterviewFeedbackPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let actor = state.auth_service.current_user(&claims).await?;
    let interview = state
        .interview_service
        .record_feedback(id, &actor, payload)
        .await?;
    Ok(Json(interview))
}

#[axum::debug_handler]
pub async fn reschedule_interview(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReschedulePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let actor = state.auth_service.current_user(&claims).await?;
    let interview = state
        .interview_service
        .reschedule(id, &actor, payload)
        .await?;
    Ok(Json(interview))
}

#[axum::debug_handler]
pub async fn list_application_interviews(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(application_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let actor = state.auth_service.current_user(&claims).await?;
    let interviews = state
        .interview_service
        .list_for_application(application_id, &actor)
        .await?;
    Ok(Json(interviews))
}

#[axum::debug_handler]
pub async fn upcoming_interviews(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<WidgetQuery>,
) -> Result<impl IntoResponse> {
    let actor = state.auth_service.current_user(&claims).await?;
    let limit = query.limit.unwrap_or(5).clamp(1, 50);
    let interviews = state.stats_service.upcoming_interviews(&actor, limit).await?;
    Ok(Json(interviews))
}
