use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json},
    Extension,
};

use crate::{
    dto::stats_dto::{DashboardQuery, FunnelQuery, WidgetQuery},
    error::Result,
    middleware::auth::Claims,
    store::DateRange,
    AppState,
};

#[axum::debug_handler]
pub async fn get_dashboard_stats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<DashboardQuery>,
) -> Result<impl IntoResponse> {
    let actor = state.auth_service.current_user(&claims).await?;
    let stats = state.stats_service.dashboard(&actor, query.owner).await?;
    Ok(Json(stats))
}

#[axum::debug_handler]
pub async fn get_funnel(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<FunnelQuery>,
) -> Result<impl IntoResponse> {
    let actor = state.auth_service.current_user(&claims).await?;
    let funnel = state
        .stats_service
        .funnel(
            &actor,
            query.job_id,
            DateRange {
                from: query.from,
                to: query.to,
            },
        )
        .await?;
    Ok(Json(funnel))
}

#[axum::debug_handler]
pub async fn recent_applications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<WidgetQuery>,
) -> Result<impl IntoResponse> {
    let actor = state.auth_service.current_user(&claims).await?;
    let limit = query.limit.unwrap_or(5).clamp(1, 50);
    let applications = state
        .stats_service
        .recent_applications(&actor, limit)
        .await?;
    Ok(Json(applications))
}
