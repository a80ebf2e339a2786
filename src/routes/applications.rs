use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::application_dto::{CreateApplicationPayload, RatingPayload, TransitionPayload},
    error::Result,
    middleware::auth::Claims,
    AppState,
};

#[axum::debug_handler]
pub async fn create_application(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateApplicationPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let actor = state.auth_service.current_user(&claims).await?;
    let application = state.application_service.create(&actor, payload).await?;
    Ok((StatusCode::CREATED, Json(application)))
}

#[axum::debug_handler]
pub async fn get_application(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let actor = state.auth_service.current_user(&claims).await?;
    let application = state.application_service.get(id, &actor).await?;
    Ok(Json(application))
}

#[axum::debug_handler]
pub async fn list_job_applications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let actor = state.auth_service.current_user(&claims).await?;
    let applications = state
        .application_service
        .list_for_job(job_id, &actor)
        .await?;
    Ok(Json(applications))
}

#[axum::debug_handler]
pub async fn list_user_applications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let actor = state.auth_service.current_user(&claims).await?;
    let applications = state
        .application_service
        .list_for_candidate(user_id, &actor)
        .await?;
    Ok(Json(applications))
}

/// Status change through the lifecycle graph. Anything outside the graph
/// comes back 400; a lost write race comes back 409.
#[axum::debug_handler]
pub async fn update_application_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransitionPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let actor = state.auth_service.current_user(&claims).await?;
    let application = state
        .application_service
        .transition(id, payload.status, &actor, payload.reason)
        .await?;
    Ok(Json(application))
}

#[axum::debug_handler]
pub async fn rate_application(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RatingPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let actor = state.auth_service.current_user(&claims).await?;
    let application = state.application_service.rate(id, &actor, payload).await?;
    Ok(Json(application))
}
