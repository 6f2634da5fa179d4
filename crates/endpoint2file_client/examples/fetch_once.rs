use endpoint2file_client::{ReportClient, config::Config, http_client::ReqwestReportClient};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Example: expects the full endpoint2file environment (JWT, NODE, ...).
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("config error: {}", e);
            return Ok(());
        }
    };
    let client = ReqwestReportClient::from_config(&cfg);
    let line = &cfg.lines[0];
    let report = client.fetch_report(line).await?;
    println!(
        "{} -> {} ({} bytes, status {})",
        line,
        cfg.output_file_name(line),
        report.body.len(),
        report.status
    );
    Ok(())
}
