//! cafe-orders: order intake, status changes, live updates and web push.
//!
//! See [`Config`] for the environment variables.

use actor_framework::tracing::setup_tracing;
use cafe_orders::config::Config;
use cafe_orders::lifecycle::OrderSystem;
use cafe_orders::server::{self, AppState};
use tracing::info;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    setup_tracing();

    let config = Config::from_env();
    let system = OrderSystem::from_config(&config)?;

    let app = server::router(AppState::new(&system, config.vapid_public_key()));

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("cafe-orders listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    system.shutdown().await?;
    info!("Shutdown complete");
    Ok(())
}
