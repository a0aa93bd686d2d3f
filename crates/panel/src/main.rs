use anyhow::anyhow;
use axum::serve;
use futures::TryFutureExt;
use log::{error, info};
use panel::{
    app, build_app_state, get_config_info, get_log_level, setup_logger, AppError, PanelSettings,
};
use std::{net::SocketAddr, str::FromStr};
use tokio::{net::TcpListener, signal};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = get_config_info().map_err(AppError::from)?;
    let log_level = get_log_level(&cli);

    setup_logger()
        .level(log_level)
        .level_for("duckdb", log_level)
        .level_for("panel", log_level)
        .level_for("http_response", log_level)
        .level_for("http_request", log_level)
        .apply()?;

    let settings = PanelSettings::from_cli(&cli).map_err(|e| {
        let e = AppError::from(e);
        error!("{}", e);
        e
    })?;

    let socket_addr = SocketAddr::from_str(&format!("{}:{}", settings.host, settings.port))
        .map_err(|e| anyhow!("invalid address: {}", e))?;

    let listener = TcpListener::bind(socket_addr)
        .map_err(|e| anyhow!("error binding to socket: {}", e))
        .await?;

    info!("Taiwan Weather Panel starting...");
    info!("  Listen:    http://{}", socket_addr);
    info!("  Public:    {}", settings.remote_url);
    info!("  Docs:      http://{}/docs", socket_addr);
    info!("  Warehouse: {:?}", settings.warehouse);
    info!("  Tables:    {}", settings.table_set_names().join(", "));
    info!("  Geometry:  {}", settings.geometry);
    info!("  Static:    {}", settings.static_dir);

    let app = app(build_app_state(settings));

    serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("failed to install signal handler: {}", e);
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
}
