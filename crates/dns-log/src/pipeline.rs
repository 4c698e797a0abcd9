//! 파이프라인 오케스트레이션 -- 읽기/추출/집계/배치 전송의 전체 흐름을 관리합니다.
//!
//! # 내부 아키텍처
//! ```text
//! file -> lines -> LineExtractor -> Aggregator
//!                                \-> BatchDispatcher -> BatchSink -> mpsc(DeliveryResult) -> CLI
//! ```
//!
//! 집계기와 디스패처는 파이프라인이 소유하며 `&mut self`로만 갱신됩니다 (단일 writer).
//! 취소 토큰은 라인 사이와 읽기/전송 대기 중에 확인됩니다.

use std::path::Path;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::aggregator::Aggregator;
use crate::batch::{BatchDispatcher, DispatchStats};
use crate::config::PipelineConfig;
use crate::delivery::{BatchSink, CollectorClient, DeliveryResult};
use crate::error::DnsLogError;
use crate::extractor::LineExtractor;
use crate::metrics as names;
use crate::report::StatsReport;

/// 실행 종료 사유
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// 입력 끝까지 처리함
    Completed,
    /// 취소 토큰으로 중단됨
    Interrupted,
}

/// 한 번의 실행 요약
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// 종료 사유
    pub outcome: RunOutcome,
    /// 읽은 라인 수
    pub lines_read: u64,
    /// 추출된 레코드 수
    pub records_extracted: u64,
    /// 문법 불일치 라인 수
    pub extraction_misses: u64,
    /// 배치 전송 통계 (전송 비활성화 시 기본값)
    pub delivery: DispatchStats,
}

/// DNS 로그 파이프라인
///
/// # 사용 예시
/// ```ignore
/// use lumu_dns_log::{CollectorClient, DnsLogPipelineBuilder};
///
/// let (mut pipeline, outcome_rx) = DnsLogPipelineBuilder::new()
///     .config(config)
///     .sink(CollectorClient::new(&config.delivery)?)
///     .build()?;
///
/// let summary = pipeline.process_file("queries.log", &cancel).await?;
/// let report = pipeline.report();
/// ```
pub struct DnsLogPipeline<S = CollectorClient> {
    config: PipelineConfig,
    extractor: LineExtractor,
    aggregator: Aggregator,
    /// 전송 비활성화 시 `None`
    dispatcher: Option<BatchDispatcher<S>>,
    /// 배치 결과 전송 채널
    outcome_tx: mpsc::Sender<DeliveryResult>,
    lines_read: u64,
    extraction_misses: u64,
}

impl<S: BatchSink> DnsLogPipeline<S> {
    /// 파일을 한 줄씩 처리합니다.
    ///
    /// 파일이 없으면 [`DnsLogError::FileNotFound`]를 반환합니다.
    pub async fn process_file(
        &mut self,
        path: impl AsRef<Path>,
        cancel: &CancellationToken,
    ) -> Result<RunSummary, DnsLogError> {
        let path = path.as_ref();
        let file = tokio::fs::File::open(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DnsLogError::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                DnsLogError::Io(e)
            }
        })?;

        tracing::info!(path = %path.display(), "processing log file");
        self.process_reader(BufReader::new(file), cancel).await
    }

    /// 비동기 리더에서 라인을 읽어 처리합니다.
    ///
    /// 입력이 끝나면 남은 부분 배치를 플러시합니다. 취소되면 진행 중인 라인은
    /// 집계하지 않고 즉시 반환하며, 버퍼에 남은 레코드는 전송하지 않습니다.
    /// 전송 중이던 배치는 드롭으로 집계됩니다.
    pub async fn process_reader<R>(
        &mut self,
        mut reader: R,
        cancel: &CancellationToken,
    ) -> Result<RunSummary, DnsLogError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut line = Vec::with_capacity(512);

        loop {
            line.clear();
            let read = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(self.interrupted()),
                read = reader.read_until(b'\n', &mut line) => read?,
            };
            if read == 0 {
                break;
            }

            self.lines_read += 1;
            ::metrics::counter!(names::LINES_READ_TOTAL).increment(1);

            let Some(record) = self.extractor.extract_bytes(&line) else {
                self.extraction_misses += 1;
                ::metrics::counter!(names::EXTRACTION_MISSES_TOTAL).increment(1);
                continue;
            };

            ::metrics::counter!(names::RECORDS_EXTRACTED_TOTAL).increment(1);
            self.aggregator.record(&record);

            if let Some(dispatcher) = self.dispatcher.as_mut() {
                let result = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Ok(self.interrupted()),
                    result = dispatcher.push(record) => result,
                };
                if let Some(result) = result {
                    self.publish(result);
                }
            }
        }

        if let Some(dispatcher) = self.dispatcher.as_mut() {
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(self.interrupted()),
                result = dispatcher.finish() => result,
            };
            if let Some(result) = result {
                self.publish(result);
            }
        }

        let summary = self.summary(RunOutcome::Completed);
        tracing::info!(
            lines = summary.lines_read,
            records = summary.records_extracted,
            misses = summary.extraction_misses,
            "log processing completed"
        );
        Ok(summary)
    }

    /// 배치 결과를 결과 채널로 보냅니다.
    ///
    /// 채널이 가득 찼거나 닫혀 있어도 수집을 막지 않습니다.
    fn publish(&self, result: DeliveryResult) {
        if let Err(e) = self.outcome_tx.try_send(result) {
            tracing::debug!(error = %e, "delivery outcome not forwarded");
        }
    }

    fn interrupted(&self) -> RunSummary {
        tracing::warn!(lines = self.lines_read, "log processing interrupted");
        self.summary(RunOutcome::Interrupted)
    }

    fn summary(&self, outcome: RunOutcome) -> RunSummary {
        RunSummary {
            outcome,
            lines_read: self.lines_read,
            records_extracted: self.aggregator.total_records(),
            extraction_misses: self.extraction_misses,
            delivery: self
                .dispatcher
                .as_ref()
                .map(BatchDispatcher::stats)
                .unwrap_or_default(),
        }
    }

    /// 집계 상태로 순위 리포트를 생성합니다.
    pub fn report(&self) -> StatsReport {
        StatsReport::build(&self.aggregator, &self.config.report)
    }

    /// 집계기에 대한 참조를 반환합니다.
    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    /// 전송이 활성화되어 있는지 확인합니다.
    pub fn delivery_enabled(&self) -> bool {
        self.dispatcher.is_some()
    }

    /// 파이프라인 설정을 반환합니다.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}

/// DNS 로그 파이프라인 빌더
///
/// 파이프라인을 구성하고 배치 결과 채널을 생성합니다.
pub struct DnsLogPipelineBuilder<S = CollectorClient> {
    config: PipelineConfig,
    sink: Option<S>,
    outcome_tx: Option<mpsc::Sender<DeliveryResult>>,
    outcome_channel_capacity: usize,
}

impl DnsLogPipelineBuilder<CollectorClient> {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            sink: None,
            outcome_tx: None,
            outcome_channel_capacity: 1024,
        }
    }
}

impl Default for DnsLogPipelineBuilder<CollectorClient> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: BatchSink> DnsLogPipelineBuilder<S> {
    /// 파이프라인 설정을 지정합니다.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// 배치 전송 대상을 지정합니다.
    ///
    /// `send_to_api`가 꺼져 있으면 지정해도 사용하지 않습니다.
    pub fn sink<T: BatchSink>(self, sink: T) -> DnsLogPipelineBuilder<T> {
        DnsLogPipelineBuilder {
            config: self.config,
            sink: Some(sink),
            outcome_tx: self.outcome_tx,
            outcome_channel_capacity: self.outcome_channel_capacity,
        }
    }

    /// 외부 배치 결과 채널을 설정합니다.
    ///
    /// 설정하지 않으면 빌더가 새 채널을 생성합니다.
    pub fn outcome_sender(mut self, tx: mpsc::Sender<DeliveryResult>) -> Self {
        self.outcome_tx = Some(tx);
        self
    }

    /// 결과 채널 용량을 설정합니다 (외부 채널 미사용 시).
    pub fn outcome_channel_capacity(mut self, capacity: usize) -> Self {
        self.outcome_channel_capacity = capacity.max(1);
        self
    }

    /// 파이프라인을 빌드합니다.
    ///
    /// # Returns
    /// - `DnsLogPipeline`: 파이프라인 인스턴스
    /// - `Option<mpsc::Receiver<DeliveryResult>>`: 배치 결과 수신 채널
    ///   (외부 outcome_sender를 설정한 경우 None)
    pub fn build(
        self,
    ) -> Result<(DnsLogPipeline<S>, Option<mpsc::Receiver<DeliveryResult>>), DnsLogError> {
        self.config.validate()?;

        let dispatcher = match (self.config.send_to_api, self.sink) {
            (true, Some(sink)) => Some(BatchDispatcher::new(sink, self.config.batch_size)),
            (true, None) => {
                return Err(DnsLogError::Config {
                    field: "send_to_api".to_owned(),
                    reason: "delivery enabled but no batch sink configured".to_owned(),
                });
            }
            (false, Some(_)) => {
                tracing::debug!("delivery disabled, ignoring configured sink");
                None
            }
            (false, None) => None,
        };

        let (outcome_tx, outcome_rx) = match self.outcome_tx {
            Some(tx) => (tx, None),
            None => {
                let (tx, rx) = mpsc::channel(self.outcome_channel_capacity);
                (tx, Some(rx))
            }
        };

        let pipeline = DnsLogPipeline {
            config: self.config,
            extractor: LineExtractor::new()?,
            aggregator: Aggregator::new(),
            dispatcher,
            outcome_tx,
            lines_read: 0,
            extraction_misses: 0,
        };

        Ok((pipeline, outcome_rx))
    }
}
