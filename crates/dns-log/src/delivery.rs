//! collector API 전송 클라이언트
//!
//! [`BatchSink`]는 배치 하나를 외부로 전달하는 확장 지점입니다.
//! [`CollectorClient`]가 Lumu collector API에 대한 기본 구현을 제공합니다.
//!
//! # 요청 형식
//! ```text
//! POST {api_base_url}/collectors/{collector_id}/dns/queries?key={client_key}
//! Content-Type: application/json
//! Accept: application/json
//!
//! [{"timestamp": "...", "name": "a.com", "client_ip": "10.0.0.1"}, ...]
//! ```
//!
//! # 결과 분류
//! - 200 / 201 -> [`DeliveryResult::Delivered`]
//! - 그 외 상태 코드 -> [`DeliveryResult::Rejected`]
//! - 연결/프로토콜 에러, 타임아웃 -> [`DeliveryResult::Failed`]
//!
//! 어느 결과도 실행을 중단시키지 않습니다. 배치 간 연결은 재사용하지 않습니다.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use serde::Serialize;

use crate::config::DeliveryConfig;
use crate::error::DnsLogError;
use crate::record::{LogRecord, WireRecord};

/// 배치 하나의 전송 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum DeliveryResult {
    /// collector가 배치를 수락함 (200/201)
    Delivered {
        count: usize,
        status: u16,
        reason: String,
    },
    /// collector가 다른 상태 코드로 응답함
    Rejected { status: u16, reason: String },
    /// 전송 계층 실패 (연결 실패, 타임아웃 등)
    Failed { error: String },
}

impl DeliveryResult {
    /// 전송 성공 여부
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }

    /// HTTP 상태 코드 (전송 계층 실패 시 `None`)
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Delivered { status, .. } | Self::Rejected { status, .. } => Some(*status),
            Self::Failed { .. } => None,
        }
    }

    /// 재시도 대상인지 확인합니다 (전송 실패 또는 5xx).
    fn is_retryable(&self) -> bool {
        match self {
            Self::Delivered { .. } => false,
            Self::Rejected { status, .. } => *status >= 500,
            Self::Failed { .. } => true,
        }
    }
}

impl fmt::Display for DeliveryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delivered {
                count,
                status,
                reason,
            } => write!(f, "Successfully sent {count} records -> {status} - {reason}"),
            Self::Rejected { status, reason } => {
                write!(f, "Error sending data to API: {status} - {reason}")
            }
            Self::Failed { error } => write!(f, "Connection error: {error}"),
        }
    }
}

/// 배치 전달 trait
///
/// 배치는 한 단위로 전달되며, 구현체는 결과를 [`DeliveryResult`]로 보고합니다.
/// 에러를 반환하지 않으므로 호출자는 실패 시에도 다음 배치를 계속 처리합니다.
pub trait BatchSink: Send + Sync {
    /// 배치 하나를 전달합니다.
    fn deliver(&self, batch: &[LogRecord]) -> impl Future<Output = DeliveryResult> + Send;
}

/// 실패한 배치 재시도 정책
///
/// 기본값은 재시도 없음입니다 (실패한 배치는 버려짐).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 최대 재시도 횟수
    pub max_retries: u32,
    /// 재시도 간 대기 시간
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::from_millis(500),
        }
    }
}

/// Lumu collector API 클라이언트
pub struct CollectorClient {
    http: reqwest::Client,
    /// `{api_base_url}/collectors/{collector_id}/dns/queries`
    endpoint: String,
    client_key: String,
    retry: RetryPolicy,
}

impl CollectorClient {
    /// 전송 설정으로 클라이언트를 생성합니다.
    ///
    /// 유휴 연결을 보관하지 않으므로 배치마다 새 연결을 열고 요청 후 닫습니다.
    pub fn new(config: &DeliveryConfig) -> Result<Self, DnsLogError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .pool_max_idle_per_host(0)
            .build()?;

        let collector_id = config.collector_id.as_deref().unwrap_or_default();
        if collector_id.is_empty() {
            tracing::warn!("collector id is not set, requests will likely be rejected");
        }
        if config.client_key.as_deref().unwrap_or_default().is_empty() {
            tracing::warn!("client key is not set, requests will likely be rejected");
        }

        Ok(Self {
            http,
            endpoint: format!(
                "{}/collectors/{}/dns/queries",
                config.api_base_url.trim_end_matches('/'),
                collector_id
            ),
            client_key: config.client_key.clone().unwrap_or_default(),
            retry: RetryPolicy {
                max_retries: config.max_retries,
                backoff: Duration::from_millis(config.retry_backoff_ms),
            },
        })
    }

    /// 재시도 정책을 교체합니다.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// 요청 URL (쿼리 파라미터 제외)
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// 재시도 없이 요청을 한 번 보냅니다.
    async fn send_once(&self, wire: &[WireRecord<'_>]) -> DeliveryResult {
        let response = self
            .http
            .post(&self.endpoint)
            .query(&[("key", self.client_key.as_str())])
            .header(ACCEPT, "application/json")
            .json(wire)
            .send()
            .await;

        match response {
            Ok(resp) => {
                let status = resp.status();
                let reason = status.canonical_reason().unwrap_or_default().to_owned();
                if status == StatusCode::OK || status == StatusCode::CREATED {
                    DeliveryResult::Delivered {
                        count: wire.len(),
                        status: status.as_u16(),
                        reason,
                    }
                } else {
                    DeliveryResult::Rejected {
                        status: status.as_u16(),
                        reason,
                    }
                }
            }
            // URL에 API 키가 포함되므로 에러 메시지에서 제거한다
            Err(e) => DeliveryResult::Failed {
                error: e.without_url().to_string(),
            },
        }
    }
}

impl BatchSink for CollectorClient {
    async fn deliver(&self, batch: &[LogRecord]) -> DeliveryResult {
        let wire: Vec<WireRecord<'_>> = batch.iter().map(LogRecord::to_wire).collect();

        let mut attempt = 0;
        loop {
            let result = self.send_once(&wire).await;
            if !result.is_retryable() || attempt >= self.retry.max_retries {
                return result;
            }

            attempt += 1;
            tracing::warn!(
                attempt,
                max_retries = self.retry.max_retries,
                outcome = %result,
                "batch delivery failed, retrying"
            );
            tokio::time::sleep(self.retry.backoff).await;
        }
    }
}
