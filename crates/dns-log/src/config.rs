//! 파이프라인 설정
//!
//! [`PipelineConfig`]는 배치 크기, collector API 전송 설정([`DeliveryConfig`]),
//! 리포트 레이아웃([`ReportConfig`])을 담습니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경 파일 / 환경변수 ([`PipelineConfig::apply_env_overrides`])
//! 3. 기본값 (`Default` 구현)
//!
//! 자격 증명(`LUMU_CLIENT_KEY`, `COLLECTOR_ID`)은 검증하지 않습니다.
//! 값이 없으면 빈 문자열로 요청 URL에 들어갑니다.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::env::EnvFile;
use crate::error::DnsLogError;

/// 기본 배치 크기 (이 개수만큼 모이면 전송)
pub const BATCH_SIZE: usize = 500;

/// 기본 collector API 주소
pub const DEFAULT_API_BASE_URL: &str = "https://api.lumu.io";

/// API 키 환경변수
pub const CLIENT_KEY_VAR: &str = "LUMU_CLIENT_KEY";

/// collector ID 환경변수
pub const COLLECTOR_ID_VAR: &str = "COLLECTOR_ID";

/// API 주소 환경변수
pub const API_BASE_URL_VAR: &str = "LUMU_API_BASE_URL";

/// 배치 크기 환경변수
pub const BATCH_SIZE_VAR: &str = "LUMU_BATCH_SIZE";

/// 요청 타임아웃 환경변수
pub const REQUEST_TIMEOUT_VAR: &str = "LUMU_REQUEST_TIMEOUT_SECS";

/// 재시도 횟수 환경변수
pub const MAX_RETRIES_VAR: &str = "LUMU_MAX_RETRIES";

const MAX_BATCH_SIZE: usize = 100_000;
const MAX_REQUEST_TIMEOUT_SECS: u64 = 3600;
const MAX_RETRIES: u32 = 10;

/// 파이프라인 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// collector API 전송 여부
    pub send_to_api: bool,
    /// 배치 크기
    pub batch_size: usize,
    /// 전송 설정
    pub delivery: DeliveryConfig,
    /// 리포트 설정
    pub report: ReportConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            send_to_api: false,
            batch_size: BATCH_SIZE,
            delivery: DeliveryConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

/// collector API 전송 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// API 주소 (스킴 포함, 경로 없음)
    pub api_base_url: String,
    /// API 키
    #[serde(skip_serializing)]
    pub client_key: Option<String>,
    /// collector 식별자
    pub collector_id: Option<String>,
    /// 배치 요청 타임아웃 (초)
    pub request_timeout_secs: u64,
    /// 실패한 배치 재시도 횟수 (0 = 재시도 없음)
    pub max_retries: u32,
    /// 재시도 간격 (밀리초)
    pub retry_backoff_ms: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            client_key: None,
            collector_id: None,
            request_timeout_secs: 30,
            max_retries: 0,
            retry_backoff_ms: 500,
        }
    }
}

/// 순위 리포트 레이아웃
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// 테이블당 최대 출력 항목 수
    pub top_n: usize,
    /// IP 컬럼 폭
    pub ip_column_width: usize,
    /// 호스트명 컬럼 폭
    pub host_column_width: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_n: 15,
            ip_column_width: 20,
            host_column_width: 60,
        }
    }
}

impl PipelineConfig {
    /// 환경 파일과 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 파일 값이 프로세스 환경변수보다 우선합니다 ([`EnvFile::lookup`]).
    pub fn apply_env_overrides(&mut self, env: &EnvFile) {
        override_option(&mut self.delivery.client_key, env, CLIENT_KEY_VAR);
        override_option(&mut self.delivery.collector_id, env, COLLECTOR_ID_VAR);
        override_string(&mut self.delivery.api_base_url, env, API_BASE_URL_VAR);
        override_parsed(&mut self.batch_size, env, BATCH_SIZE_VAR);
        override_parsed(
            &mut self.delivery.request_timeout_secs,
            env,
            REQUEST_TIMEOUT_VAR,
        );
        override_parsed(&mut self.delivery.max_retries, env, MAX_RETRIES_VAR);
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), DnsLogError> {
        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(DnsLogError::Config {
                field: "batch_size".to_owned(),
                reason: format!("must be 1-{}", MAX_BATCH_SIZE),
            });
        }

        if self.report.top_n == 0 {
            return Err(DnsLogError::Config {
                field: "report.top_n".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        if self.send_to_api {
            self.delivery.validate()?;
        }

        Ok(())
    }
}

impl DeliveryConfig {
    /// 전송 설정의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), DnsLogError> {
        if !(self.api_base_url.starts_with("https://") || self.api_base_url.starts_with("http://"))
        {
            return Err(DnsLogError::Config {
                field: "delivery.api_base_url".to_owned(),
                reason: format!("'{}' must be an http(s) URL", self.api_base_url),
            });
        }

        if self.request_timeout_secs == 0 || self.request_timeout_secs > MAX_REQUEST_TIMEOUT_SECS {
            return Err(DnsLogError::Config {
                field: "delivery.request_timeout_secs".to_owned(),
                reason: format!("must be 1-{}", MAX_REQUEST_TIMEOUT_SECS),
            });
        }

        if self.max_retries > MAX_RETRIES {
            return Err(DnsLogError::Config {
                field: "delivery.max_retries".to_owned(),
                reason: format!("must be 0-{}", MAX_RETRIES),
            });
        }

        Ok(())
    }
}

/// 파이프라인 설정 빌더
#[derive(Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 기존 설정에서 빌더를 시작합니다.
    pub fn from_config(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// collector API 전송 여부를 설정합니다.
    pub fn send_to_api(mut self, enabled: bool) -> Self {
        self.config.send_to_api = enabled;
        self
    }

    /// 배치 크기를 설정합니다.
    pub fn batch_size(mut self, size: usize) -> Self {
        self.config.batch_size = size;
        self
    }

    /// API 주소를 설정합니다.
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.delivery.api_base_url = url.into();
        self
    }

    /// API 키를 설정합니다.
    pub fn client_key(mut self, key: impl Into<String>) -> Self {
        self.config.delivery.client_key = Some(key.into());
        self
    }

    /// collector ID를 설정합니다.
    pub fn collector_id(mut self, id: impl Into<String>) -> Self {
        self.config.delivery.collector_id = Some(id.into());
        self
    }

    /// 요청 타임아웃(초)을 설정합니다.
    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.delivery.request_timeout_secs = secs;
        self
    }

    /// 재시도 횟수와 간격을 설정합니다.
    pub fn retries(mut self, max_retries: u32, backoff_ms: u64) -> Self {
        self.config.delivery.max_retries = max_retries;
        self.config.delivery.retry_backoff_ms = backoff_ms;
        self
    }

    /// 리포트 상위 항목 수를 설정합니다.
    pub fn top_n(mut self, n: usize) -> Self {
        self.config.report.top_n = n;
        self
    }

    /// 설정을 검증하고 `PipelineConfig`를 생성합니다.
    pub fn build(self) -> Result<PipelineConfig, DnsLogError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env: &EnvFile, key: &str) {
    if let Some(val) = env.lookup(key) {
        *target = val;
    }
}

fn override_option(target: &mut Option<String>, env: &EnvFile, key: &str) {
    if let Some(val) = env.lookup(key) {
        *target = Some(val);
    }
}

fn override_parsed<T: std::str::FromStr>(target: &mut T, env: &EnvFile, key: &str) {
    if let Some(val) = env.lookup(key) {
        match val.trim().parse::<T>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key = key,
                value = val.as_str(),
                "failed to parse numeric env var, ignoring"
            ),
        }
    }
}
