use anyhow::Context;
use dotenvy::dotenv;
use fanpanel_device::{router, DeviceConfig, DeviceState};
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();

    let config = DeviceConfig::from_env();
    info!(
        front_power = config.front_power,
        back_power = config.back_power,
        runtime_secs = config.runtime_secs,
        interval_secs = config.interval_secs,
        "Configuring simulated fans"
    );

    let state = DeviceState::new(&config);
    let app = router(state.clone(), config.assets_dir.as_deref());

    let listener = tokio::net::TcpListener::bind(config.http_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.http_addr))?;
    info!(addr = %config.http_addr, "Starting HTTP server");

    // Background run/pause cycle for the fans
    let duty_cycle = state.spawn_duty_cycle();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    duty_cycle.abort();
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,axum=info,hyper=info,tower_http=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(?err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(err) => {
                tracing::error!(?err, "failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutting down");
}
