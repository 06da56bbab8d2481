use insightsync::{
    api, config::Config, GoogleSheetsClient, InstagramDataSource, MediaSource, ReportClock,
    ReportRunner, SnapshotStore,
};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let config = Config::from_env()?;

    // Missing credentials leave that side unavailable; the server still starts.
    let source: Option<Arc<dyn MediaSource>> = match config.instagram() {
        Ok(ig) => match InstagramDataSource::new(ig, config.report_offset) {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                tracing::error!(error = %e, "Failed to build upstream client");
                None
            }
        },
        Err(e) => {
            tracing::error!(error = %e, "Upstream source unavailable");
            None
        }
    };

    let store = match config.sheets() {
        Ok(sheets) => match GoogleSheetsClient::new(sheets) {
            Ok(client) => SnapshotStore::new(Arc::new(client)),
            Err(e) => {
                tracing::error!(error = %e, "Failed to build sheet client");
                SnapshotStore::unavailable(e.to_string())
            }
        },
        Err(e) => {
            tracing::error!(error = %e, "Sheet store unavailable");
            SnapshotStore::unavailable(e.to_string())
        }
    };

    let clock = ReportClock::system(config.report_offset);
    let runner = ReportRunner::new(source, store, clock);
    let app = api::create_router(api::AppState::new(runner));

    let addr = SocketAddr::new(config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
