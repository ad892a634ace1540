use std::{io::Error, sync::Arc};

use courier::{
    app::DeliveryApp, config::Config, infrastructure::channels::build_channels,
    infrastructure::repositories::FileAuditLog, presentation::http::endpoints::root::api_service,
};
use poem::{Route, Server, listener::TcpListener};
use tokio::main;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::try_parse().map_err(Error::other)?;

    let channels = build_channels(&config.channels).map_err(Error::other)?;
    let audit_log = Arc::new(FileAuditLog::new(config.audit_log_dir.clone()));
    let app = Arc::new(DeliveryApp::build(&config.delivery, channels, audit_log));

    for channel in app.get_status.execute().await.channels {
        info!(channel = %channel.name, available = channel.available, "channel registered");
    }

    let worker = app.start();

    let server_url = format!("{}://{}:{}", config.scheme, config.host, config.port);
    info!(%server_url, "starting server");

    let api_service = api_service(app, &server_url);
    let ui = api_service.swagger_ui();
    let routes = Route::new().nest("/api", api_service).nest("/", ui);

    let result = Server::new(TcpListener::bind(format!("{}:{}", config.host, config.port)))
        .run(routes)
        .await;

    worker.abort();
    result
}
