use endpoint2file_client::{
    config::Config, http_client::ReqwestReportClient, sink::ReportSink,
};
use endpoint2file_service::{logging, scheduler};
use tokio::sync::watch;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _guard = logging::init()?;

    let config = Config::from_env()?;
    tracing::info!(
        node = %config.node,
        endpoint = %config.endpoint,
        lines = config.lines.len(),
        target_path = %config.target_path,
        schedule_secs = config.schedule.as_secs(),
        "endpoint2file starting"
    );

    let client = ReqwestReportClient::from_config(&config);
    let sink = ReportSink::new(&config.target_path);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(true);
        }
    });

    scheduler::run(&config, &client, &sink, shutdown_rx).await?;
    tracing::info!("endpoint2file stopped");
    Ok(())
}
