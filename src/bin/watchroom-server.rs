use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use watchroom::config::Config;
use watchroom::dispatcher::RoomHub;
use watchroom::joint::axum::AxumWSJoint;

#[tokio::main]
async fn main() -> Result<()> {
    // config path: first argument, then WATCHROOM_CONFIG
    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("WATCHROOM_CONFIG").ok());
    let config = Config::load(path.as_deref())?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.server.log_filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = config.server.bind_addr()?;
    let joint = AxumWSJoint::new(RoomHub::new(config.sync.clone()));
    let router = joint.attach_router(&config.server.ws_path, Router::new());
    let app = joint.attach_room_api("/api/rooms", router);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, ws_path = %config.server.ws_path, "watchroom listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await?;

    Ok(())
}
