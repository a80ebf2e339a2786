pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod utils;

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::services::{
    application_service::ApplicationService, auth_service::AuthService,
    interview_service::InterviewService, job_service::JobService,
    message_service::MessageService, offer_service::OfferService, stats_service::StatsService,
};
use crate::store::EntityStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntityStore>,
    pub auth_service: AuthService,
    pub job_service: JobService,
    pub application_service: ApplicationService,
    pub interview_service: InterviewService,
    pub offer_service: OfferService,
    pub message_service: MessageService,
    pub stats_service: StatsService,
}

impl AppState {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        let config = crate::config::get_config();

        let auth_service = AuthService::new(store.clone(), config.jwt_secret.clone());
        let job_service = JobService::new(store.clone());
        let application_service = ApplicationService::new(store.clone());
        let interview_service = InterviewService::new(store.clone());
        let offer_service = OfferService::new(
            store.clone(),
            application_service.clone(),
            config.offer_token_secret.clone(),
        );
        let message_service = MessageService::new(store.clone());
        let stats_service = StatsService::new(store.clone(), config.stats_utc_offset_minutes);

        Self {
            store,
            auth_service,
            job_service,
            application_service,
            interview_service,
            offer_service,
            message_service,
            stats_service,
        }
    }
}

/// Routes reachable without a session: registration, login, the published
/// job board and the token-gated offer response.
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(routes::health::health))
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/public/jobs", get(routes::jobs::list_jobs))
        .route("/api/public/jobs/:id", get(routes::jobs::get_public_job))
        .route(
            "/api/public/offers/:id/respond",
            post(routes::offers::respond_to_offer),
        )
}

/// Routes behind bearer auth.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/me", get(routes::auth::me))
        .route("/api/jobs", post(routes::jobs::create_job))
        .route(
            "/api/jobs/:id",
            get(routes::jobs::get_job)
                .patch(routes::jobs::update_job)
                .delete(routes::jobs::delete_job),
        )
        .route("/api/jobs/user/:user_id", get(routes::jobs::list_user_jobs))
        .route(
            "/api/applications",
            post(routes::applications::create_application),
        )
        .route(
            "/api/applications/:id",
            get(routes::applications::get_application),
        )
        .route(
            "/api/applications/job/:job_id",
            get(routes::applications::list_job_applications),
        )
        .route(
            "/api/applications/user/:user_id",
            get(routes::applications::list_user_applications),
        )
        .route(
            "/api/applications/:id/status",
            put(routes::applications::update_application_status),
        )
        .route(
            "/api/applications/:id/rating",
            post(routes::applications::rate_application),
        )
        .route(
            "/api/applications/:id/interviews",
            get(routes::interviews::list_application_interviews),
        )
        .route(
            "/api/interviews",
            post(routes::interviews::schedule_interview),
        )
        .route(
            "/api/interviews/upcoming",
            get(routes::interviews::upcoming_interviews),
        )
        .route(
            "/api/interviews/:id/status",
            axum::routing::patch(routes::interviews::update_interview_status),
        )
        .route(
            "/api/interviews/:id/feedback",
            post(routes::interviews::record_feedback),
        )
        .route(
            "/api/interviews/:id/reschedule",
            post(routes::interviews::reschedule_interview),
        )
        .route("/api/offers", post(routes::offers::create_offer))
        .route("/api/offers/:id", get(routes::offers::get_offer))
        .route("/api/offers/:id/send", post(routes::offers::send_offer))
        .route(
            "/api/offers/:id/withdraw",
            post(routes::offers::withdraw_offer),
        )
        .route(
            "/api/offers/:id/extend-validity",
            post(routes::offers::extend_offer_validity),
        )
        .route("/api/messages", post(routes::messages::send_message))
        .route(
            "/api/messages/unread/count",
            get(routes::messages::unread_count),
        )
        .route("/api/messages/:user_id", get(routes::messages::get_thread))
        .route(
            "/api/dashboard/stats",
            get(routes::dashboard::get_dashboard_stats),
        )
        .route("/api/dashboard/funnel", get(routes::dashboard::get_funnel))
        .route(
            "/api/dashboard/recent-applications",
            get(routes::dashboard::recent_applications),
        )
        .layer(axum::middleware::from_fn(
            middleware::auth::require_bearer_auth,
        ))
}

/// Full application router without the outermost observability layers;
/// `main` adds tracing, CORS and body limits on top.
pub fn build_router(state: AppState) -> Router {
    public_router().merge(api_router()).with_state(state)
}
