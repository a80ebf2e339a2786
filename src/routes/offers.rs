use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::offer_dto::{
        CreateOfferPayload, ExtendValidityPayload, OfferResponsePayload, SendOfferPayload,
    },
    error::Result,
    middleware::auth::Claims,
    AppState,
};

#[axum::debug_handler]
pub async fn create_offer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateOfferPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let actor = state.auth_service.current_user(&claims).await?;
    let offer = state.offer_service.create(&actor, payload).await?;
    Ok((StatusCode::CREATED, Json(offer)))
}

#[axum::debug_handler]
pub async fn get_offer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let actor = state.auth_service.current_user(&claims).await?;
    let offer = state.offer_service.get(id, &actor).await?;
    Ok(Json(offer))
}

/// Sends the offer to the candidate. The response carries the one-time
/// capability token for the public respond endpoint.
#[axum::debug_handler]
pub async fn send_offer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SendOfferPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let actor = state.auth_service.current_user(&claims).await?;
    let sent = state.offer_service.send(id, &actor, payload).await?;
    Ok(Json(sent))
}

/// Candidate action, token-authorized: accept, reject or negotiate.
#[axum::debug_handler]
pub async fn respond_to_offer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<OfferResponsePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let offer = state.offer_service.respond(id, payload).await?;
    Ok(Json(offer))
}

#[axum::debug_handler]
pub async fn withdraw_offer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let actor = state.auth_service.current_user(&claims).await?;
    let offer = state.offer_service.withdraw(id, &actor).await?;
    Ok(Json(offer))
}

#[axum::debug_handler]
pub async fn extend_offer_validity(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ExtendValidityPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let actor = state.auth_service.current_user(&claims).await?;
    let offer = state
        .offer_service
        .extend_validity(id, &actor, payload)
        .await?;
    Ok(Json(offer))
}
