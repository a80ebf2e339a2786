use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use talentflow_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    store::PgStore,
    AppState,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let store = Arc::new(PgStore::new(pool));
    let app_state = AppState::new(store);

    // Offer expiry sweeper: sent offers past their validity date move to
    // 'expired' without waiting for a candidate to bounce off them.
    {
        let offers = app_state.offer_service.clone();
        let sweep_interval = Duration::from_secs(config.offer_expiry_sweep_secs);
        tokio::spawn(async move {
            loop {
                if let Err(e) = offers.expire_overdue().await {
                    tracing::error!(error = ?e, "offer expiry sweep failed");
                }
                tokio::time::sleep(sweep_interval).await;
            }
        });
    }

    let public_api = talentflow_backend::public_router().layer(
        axum::middleware::from_fn_with_state(
            talentflow_backend::middleware::rate_limit::new_rps_state(config.public_rps),
            talentflow_backend::middleware::rate_limit::rps_middleware,
        ),
    );

    let private_api = talentflow_backend::api_router().layer(
        axum::middleware::from_fn_with_state(
            talentflow_backend::middleware::rate_limit::new_rps_state(config.api_rps),
            talentflow_backend::middleware::rate_limit::rps_middleware,
        ),
    );

    let app = public_api
        .merge(private_api)
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024));

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
