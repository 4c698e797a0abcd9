//! 통합 테스트 -- 파이프라인 전체 흐름 검증
//!
//! 로그 파일 읽기부터 집계, 리포트, collector 전송까지의 흐름을 검증합니다.

use std::io::Write;

use mockito::{Matcher, Server};
use tempfile::NamedTempFile;
use tokio_util::sync::CancellationToken;

use lumu_dns_log::{
    CollectorClient, DeliveryResult, DnsLogPipelineBuilder, EnvFile, PipelineConfig,
    PipelineConfigBuilder, RunOutcome,
};

fn query_line(ip: &str, host: &str) -> String {
    format!(
        "15-Jan-2024 10:30:45.123 queries: info: client @0x7f8a1c0a2b30 {ip}#53211 ({host}): query: {host} IN A +E(0)K (10.0.0.53)\n"
    )
}

fn write_log(lines: &[String]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        file.write_all(line.as_bytes()).unwrap();
    }
    file.flush().unwrap();
    file
}

/// 파일 -> 추출 -> 집계 -> 리포트 흐름 테스트
#[tokio::test]
async fn test_file_to_report_flow() {
    let file = write_log(&[
        query_line("10.0.0.1", "a.com"),
        query_line("10.0.0.1", "b.com"),
        "15-Jan-2024 10:30:46.000 general: info: zone example.com/IN: loaded serial 1\n"
            .to_owned(),
        query_line("10.0.0.2", "a.com"),
    ]);

    let (mut pipeline, _rx) = DnsLogPipelineBuilder::new().build().unwrap();
    let summary = pipeline
        .process_file(file.path(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.outcome, RunOutcome::Completed);
    assert_eq!(summary.lines_read, 4);
    assert_eq!(summary.records_extracted, 3);
    assert_eq!(summary.extraction_misses, 1);

    let report = pipeline.report();
    assert_eq!(report.total_records, 3);
    assert_eq!(report.client_ips.rows[0].key, "10.0.0.1");
    assert!((report.client_ips.rows[0].percentage - 66.666).abs() < 0.01);
    assert_eq!(report.hostnames.rows[0].key, "a.com");

    let mut rendered = Vec::new();
    report.write_text(&mut rendered).unwrap();
    let text = String::from_utf8(rendered).unwrap();
    assert!(text.contains("Total records 3"));
    assert!(text.contains("66.67%"));
    assert!(text.contains("33.33%"));
}

/// 첫 배치 실패 후에도 다음 배치 전송을 시도하는지 검증
#[tokio::test]
async fn test_failed_batch_then_next_batch_delivered() {
    let mut server = Server::new_async().await;
    let rejected = server
        .mock("POST", "/collectors/col-1/dns/queries")
        .match_query(Matcher::UrlEncoded("key".into(), "secret".into()))
        .match_body(Matcher::Regex(r#""name":"a\.com""#.into()))
        .with_status(500)
        .expect(1)
        .create_async()
        .await;
    let accepted = server
        .mock("POST", "/collectors/col-1/dns/queries")
        .match_query(Matcher::UrlEncoded("key".into(), "secret".into()))
        .match_body(Matcher::Regex(r#""name":"c\.com""#.into()))
        .with_status(201)
        .expect(1)
        .create_async()
        .await;

    let config = PipelineConfigBuilder::new()
        .send_to_api(true)
        .batch_size(2)
        .api_base_url(server.url())
        .client_key("secret")
        .collector_id("col-1")
        .request_timeout_secs(5)
        .build()
        .unwrap();
    let sink = CollectorClient::new(&config.delivery).unwrap();

    let file = write_log(&[
        query_line("10.0.0.1", "a.com"),
        query_line("10.0.0.2", "b.com"),
        query_line("10.0.0.3", "c.com"),
    ]);

    let (mut pipeline, rx) = DnsLogPipelineBuilder::new()
        .config(config)
        .sink(sink)
        .build()
        .unwrap();
    let mut rx = rx.unwrap();

    let summary = pipeline
        .process_file(file.path(), &CancellationToken::new())
        .await
        .unwrap();

    rejected.assert_async().await;
    accepted.assert_async().await;

    assert_eq!(summary.outcome, RunOutcome::Completed);
    assert_eq!(summary.delivery.batches_attempted, 2);
    assert_eq!(summary.delivery.batches_failed, 1);
    assert_eq!(summary.delivery.records_dropped, 2);
    assert_eq!(summary.delivery.records_delivered, 1);

    // 실패한 배치의 레코드도 집계에는 포함됨
    assert_eq!(pipeline.aggregator().total_records(), 3);

    let first = rx.try_recv().unwrap();
    assert_eq!(
        first,
        DeliveryResult::Rejected {
            status: 500,
            reason: "Internal Server Error".to_owned(),
        }
    );
    let second = rx.try_recv().unwrap();
    assert_eq!(second.to_string(), "Successfully sent 1 records -> 201 - Created");
}

/// 환경 파일 값으로 전송 설정이 채워지는지 검증
#[tokio::test]
async fn test_env_file_configures_delivery() {
    let mut env_file = NamedTempFile::new().unwrap();
    writeln!(env_file, "# collector credentials").unwrap();
    writeln!(env_file, "LUMU_CLIENT_KEY='abc=123'").unwrap();
    writeln!(env_file, "COLLECTOR_ID=\"col-9\"").unwrap();
    writeln!(env_file, "LUMU_BATCH_SIZE=250").unwrap();
    env_file.flush().unwrap();

    let env = EnvFile::load(env_file.path()).await.unwrap();
    let mut config = PipelineConfig::default();
    config.apply_env_overrides(&env);

    assert_eq!(config.delivery.client_key.as_deref(), Some("abc=123"));
    assert_eq!(config.delivery.collector_id.as_deref(), Some("col-9"));
    assert_eq!(config.batch_size, 250);

    let client = CollectorClient::new(&config.delivery).unwrap();
    assert_eq!(
        client.endpoint(),
        "https://api.lumu.io/collectors/col-9/dns/queries"
    );
}

/// 존재하지 않는 입력 파일은 치명적 에러
#[tokio::test]
async fn test_missing_input_file() {
    let (mut pipeline, _rx) = DnsLogPipelineBuilder::new().build().unwrap();
    let err = pipeline
        .process_file("/nonexistent/dir/queries.log", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(err.is_file_not_found());
    assert!(err.to_string().contains("/nonexistent/dir/queries.log"));
}

/// 취소된 토큰으로 실행하면 중단 결과를 반환
#[tokio::test]
async fn test_cancelled_run_is_interrupted() {
    let file = write_log(&[query_line("10.0.0.1", "a.com")]);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let (mut pipeline, _rx) = DnsLogPipelineBuilder::new().build().unwrap();
    let summary = pipeline.process_file(file.path(), &cancel).await.unwrap();

    assert_eq!(summary.outcome, RunOutcome::Interrupted);
    assert_eq!(pipeline.report().total_records, 0);
}

/// 빈 파일은 빈 리포트를 생성
#[tokio::test]
async fn test_empty_file_produces_empty_report() {
    let file = write_log(&[]);
    let (mut pipeline, _rx) = DnsLogPipelineBuilder::new().build().unwrap();
    let summary = pipeline
        .process_file(file.path(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.lines_read, 0);
    let report = pipeline.report();
    assert_eq!(report.total_records, 0);
    assert!(report.client_ips.rows.is_empty());
    assert!(report.hostnames.rows.is_empty());
}
