use std::time::Duration;

use endpoint2file_client::{
    Endpoint2FileError, config::Config, http_client::ReqwestReportClient, sink::ReportSink,
};
use endpoint2file_service::scheduler;
use secrecy::SecretString;
use tokio::sync::watch;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ENDPOINT: &str = "/api/publishers/report-1-endpoint/csv";

fn config_for(server: &MockServer, lines: &[&str], target: &std::path::Path) -> Config {
    Config {
        token: SecretString::new("tok".into()),
        node: server.uri(),
        lines: lines.iter().map(|s| s.to_string()).collect(),
        endpoint: ENDPOINT.into(),
        target_path: target.to_string_lossy().into_owned(),
        target_filename: "report-1".into(),
        target_file_ext: "csv".into(),
        schedule: Duration::from_secs(3600),
    }
}

async fn mount_line(server: &MockServer, line: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .and(query_param("bane", line))
        .and(query_param("segmented", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn one_pass_writes_one_file_per_line() {
    let server = MockServer::start().await;
    mount_line(&server, "B01", b"payload one").await;
    mount_line(&server, "B02", b"payload two").await;

    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&server, &["B01", "B02"], dir.path());
    let client = ReqwestReportClient::from_config(&config);
    let sink = ReportSink::new(dir.path());

    scheduler::run_pass(&config, &client, &sink).await.expect("pass");

    assert_eq!(
        std::fs::read(dir.path().join("B01-report-1.csv")).unwrap(),
        b"payload one"
    );
    assert_eq!(
        std::fs::read(dir.path().join("B02-report-1.csv")).unwrap(),
        b"payload two"
    );
}

#[tokio::test]
async fn pass_processes_lines_in_configured_order() {
    let server = MockServer::start().await;
    for line in ["B10", "B02", "B01"] {
        mount_line(&server, line, line.as_bytes()).await;
    }

    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&server, &["B10", "B02", "B01"], dir.path());
    let client = ReqwestReportClient::from_config(&config);
    let sink = ReportSink::new(dir.path());

    scheduler::run_pass(&config, &client, &sink).await.expect("pass");

    // Requests must arrive strictly in configured order, never reordered.
    let received = server.received_requests().await.unwrap();
    let banes: Vec<String> = received
        .iter()
        .map(|r| {
            r.url
                .query_pairs()
                .find(|(k, _)| k == "bane")
                .map(|(_, v)| v.into_owned())
                .expect("bane param")
        })
        .collect();
    assert_eq!(banes, vec!["B10", "B02", "B01"]);
}

#[tokio::test]
async fn failing_middle_line_aborts_rest_of_pass() {
    let server = MockServer::start().await;
    for line in ["B01", "B02", "B03"] {
        mount_line(&server, line, line.as_bytes()).await;
    }

    let dir = tempfile::tempdir().unwrap();
    // A directory squatting on B02's output filename makes its write fail.
    std::fs::create_dir(dir.path().join("B02-report-1.csv")).unwrap();

    let config = config_for(&server, &["B01", "B02", "B03"], dir.path());
    let client = ReqwestReportClient::from_config(&config);
    let sink = ReportSink::new(dir.path());

    let err = scheduler::run_pass(&config, &client, &sink).await.unwrap_err();
    assert!(matches!(err, Endpoint2FileError::Filesystem { .. }));

    // The first line's file from this pass remains; the third was never
    // fetched or written.
    assert_eq!(std::fs::read(dir.path().join("B01-report-1.csv")).unwrap(), b"B01");
    assert!(!dir.path().join("B03-report-1.csv").exists());
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn presignalled_shutdown_prevents_any_pass() {
    let server = MockServer::start().await;
    mount_line(&server, "B01", b"x").await;

    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&server, &["B01"], dir.path());
    let client = ReqwestReportClient::from_config(&config);
    let sink = ReportSink::new(dir.path());

    let (tx, rx) = watch::channel(true);
    scheduler::run(&config, &client, &sink, rx).await.expect("run");
    drop(tx);

    assert!(server.received_requests().await.unwrap().is_empty());
    assert!(!dir.path().join("B01-report-1.csv").exists());
}

#[tokio::test]
async fn shutdown_during_sleep_ends_loop_promptly() {
    let server = MockServer::start().await;
    mount_line(&server, "B01", b"x").await;

    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&server, &["B01"], dir.path());
    let client = ReqwestReportClient::from_config(&config);
    let sink = ReportSink::new(dir.path());

    let (tx, rx) = watch::channel(false);
    let out_file = dir.path().join("B01-report-1.csv");
    let handle = tokio::spawn(async move {
        scheduler::run(&config, &client, &sink, rx).await
    });

    // Wait for the first pass to land, then signal while the loop sleeps
    // (the configured interval is an hour).
    for _ in 0..100 {
        if out_file.exists() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(out_file.exists(), "first pass should have written its file");
    tx.send(true).unwrap();

    let res = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("loop should stop well before the interval elapses")
        .expect("join");
    assert!(res.is_ok());
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn dropped_shutdown_sender_stops_loop() {
    let server = MockServer::start().await;
    mount_line(&server, "B01", b"x").await;

    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&server, &["B01"], dir.path());
    let client = ReqwestReportClient::from_config(&config);
    let sink = ReportSink::new(dir.path());

    let (tx, rx) = watch::channel(false);
    let handle = tokio::spawn(async move {
        scheduler::run(&config, &client, &sink, rx).await
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    drop(tx);

    let res = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("loop should stop when the sender goes away")
        .expect("join");
    assert!(res.is_ok());
}

#[tokio::test]
async fn non_success_response_body_is_still_written() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .and(query_param("bane", "B01"))
        .respond_with(ResponseTemplate::new(500).set_body_bytes(b"error page".to_vec()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&server, &["B01"], dir.path());
    let client = ReqwestReportClient::from_config(&config);
    let sink = ReportSink::new(dir.path());

    scheduler::run_pass(&config, &client, &sink).await.expect("pass");
    assert_eq!(
        std::fs::read(dir.path().join("B01-report-1.csv")).unwrap(),
        b"error page"
    );
}
