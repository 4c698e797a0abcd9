#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`extractor`]: 로그 라인에서 타임스탬프, 클라이언트 IP, 호스트명 추출
//! - [`aggregator`]: 클라이언트 IP / 호스트명 빈도 집계
//! - [`batch`]: 레코드 버퍼링 및 배치 플러시
//! - [`delivery`]: collector API 전송 클라이언트 (BatchSink trait 구현)
//! - [`report`]: 상위 N개 순위 리포트 생성 및 텍스트 렌더링
//! - [`pipeline`]: 전체 파이프라인 오케스트레이션
//! - [`config`]: 파이프라인 설정 및 환경변수 오버라이드
//! - [`env`]: `.env` 파일 로더
//! - [`metrics`]: 메트릭 이름 상수
//! - [`record`]: 추출 레코드와 전송 형식
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! File -> LineExtractor -> Aggregator ------------------------> StatsReport
//!               |
//!               +--------> BatchDispatcher -> CollectorClient -> Lumu API
//!                           (batch_size)        (BatchSink)
//! ```

pub mod aggregator;
pub mod batch;
pub mod config;
pub mod delivery;
pub mod env;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod record;
pub mod report;

pub mod extractor;

// --- 주요 타입 re-export ---

// 파이프라인
pub use pipeline::{DnsLogPipeline, DnsLogPipelineBuilder, RunOutcome, RunSummary};

// 설정
pub use config::{DeliveryConfig, PipelineConfig, PipelineConfigBuilder, ReportConfig};
pub use env::EnvFile;

// 에러
pub use error::DnsLogError;

// 추출기
pub use extractor::LineExtractor;
pub use record::LogRecord;

// 집계 / 리포트
pub use aggregator::{Aggregator, FrequencyTable};
pub use report::StatsReport;

// 배치 전송
pub use batch::{BatchDispatcher, DispatchStats};
pub use delivery::{BatchSink, CollectorClient, DeliveryResult, RetryPolicy};
