//! The polling loop: one pass fetches every configured line in order and
//! writes each response to the sink; the loop then sleeps for the
//! configured interval. Errors are never caught here; the first failure
//! aborts the run mid-pass and propagates to the caller.

use endpoint2file_client::{
    Endpoint2FileError, ReportClient, config::Config, sink::ReportSink,
};
use tokio::sync::watch;

/// One full pass over the configured line list, strictly in order, one
/// line at a time: fetch, then write. Lines after a failing one are not
/// processed.
pub async fn run_pass(
    config: &Config,
    client: &dyn ReportClient,
    sink: &ReportSink,
) -> Result<(), Endpoint2FileError> {
    for line in &config.lines {
        let report = client.fetch_report(line).await?;
        let file_name = config.output_file_name(line);
        let path = sink.write(&file_name, &report.body).await?;
        tracing::info!(
            line,
            url = %report.url,
            path = %path.display(),
            bytes = report.body.len(),
            "report written"
        );
    }
    Ok(())
}

/// Drive passes forever, sleeping `config.schedule` between them. The stop
/// signal is checked at the top of each iteration and raced against the
/// sleep, so shutdown takes effect without waiting out the interval. A
/// closed channel counts as shutdown.
pub async fn run(
    config: &Config,
    client: &dyn ReportClient,
    sink: &ReportSink,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), Endpoint2FileError> {
    loop {
        if *shutdown.borrow() {
            tracing::info!("shutdown requested, stopping");
            return Ok(());
        }

        run_pass(config, client, sink).await?;
        tracing::debug!(secs = config.schedule.as_secs(), "pass complete, sleeping");

        let sleep = tokio::time::sleep(config.schedule);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                _ = &mut sleep => break,
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("shutdown requested during sleep, stopping");
                        return Ok(());
                    }
                }
            }
        }
    }
}
