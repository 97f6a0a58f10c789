use goal_dashboard::{load_profile, router, AppState, Settings};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let settings = Settings::from_env();
    let profile = load_profile(&settings.data_path).await;
    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));

    info!(
        timezone = settings.timezone.name(),
        upstream = %settings.upstream_base_url,
        user = profile.username.as_deref().or(settings.default_username.as_deref()).unwrap_or("-"),
        "starting dashboard"
    );

    let app = router(AppState::new(settings, profile));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
