//! 배치 디스패처 -- 레코드 버퍼링 및 배치 단위 전송
//!
//! [`BatchDispatcher`]는 레코드를 `batch_size`까지 모았다가 [`BatchSink`]에
//! 한 번에 넘깁니다.
//!
//! # 상태 전이
//! ```text
//!            push (len == batch_size) / finish (len > 0)
//! Accumulating ------------------------------------------> Flushing
//!      ^                                                      |
//!      +---------------- 버퍼 비움, 결과 보고 ----------------+
//! ```
//!
//! 전송 결과와 무관하게 버퍼는 플러시 시점에 비워집니다.
//! 실패한 배치는 재큐잉하지 않고 통계에 드롭으로 기록합니다.

use std::time::Instant;

use crate::delivery::{BatchSink, DeliveryResult};
use crate::metrics as names;
use crate::record::LogRecord;

/// 디스패처 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    /// 버퍼가 임계값 미만
    Accumulating,
    /// 배치 전송 중
    Flushing,
}

/// 배치 전송 통계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// 전송 시도한 배치 수
    pub batches_attempted: u64,
    /// 수락된 배치 수
    pub batches_succeeded: u64,
    /// 실패한 배치 수
    pub batches_failed: u64,
    /// 수락된 레코드 수
    pub records_delivered: u64,
    /// 실패로 버려진 레코드 수
    pub records_dropped: u64,
}

/// 배치 디스패처
pub struct BatchDispatcher<S> {
    sink: S,
    buffer: Vec<LogRecord>,
    batch_size: usize,
    state: DispatchState,
    stats: DispatchStats,
}

impl<S: BatchSink> BatchDispatcher<S> {
    /// 새 디스패처를 생성합니다.
    ///
    /// `batch_size`가 0이면 1로 취급합니다.
    pub fn new(sink: S, batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            sink,
            buffer: Vec::with_capacity(batch_size.min(10_000)),
            batch_size,
            state: DispatchState::Accumulating,
            stats: DispatchStats::default(),
        }
    }

    /// 레코드를 버퍼에 추가합니다.
    ///
    /// 버퍼가 정확히 `batch_size`에 도달하면 플러시하고 결과를 반환합니다.
    pub async fn push(&mut self, record: LogRecord) -> Option<DeliveryResult> {
        self.buffer.push(record);
        if self.buffer.len() >= self.batch_size {
            Some(self.flush().await)
        } else {
            None
        }
    }

    /// 스트림 종료 시 남은 부분 배치를 플러시합니다.
    ///
    /// 버퍼가 비어있으면 아무것도 전송하지 않습니다.
    pub async fn finish(&mut self) -> Option<DeliveryResult> {
        if self.buffer.is_empty() {
            return None;
        }
        Some(self.flush().await)
    }

    /// 현재 버퍼 전체를 한 배치로 전송합니다.
    ///
    /// 전송 도중 future가 drop되면 배치는 실패로 집계되고 상태는
    /// `Accumulating`으로 돌아갑니다.
    async fn flush(&mut self) -> DeliveryResult {
        self.state = DispatchState::Flushing;
        let batch = std::mem::replace(
            &mut self.buffer,
            Vec::with_capacity(self.batch_size.min(10_000)),
        );
        let count = batch.len() as u64;

        let mut in_flight = InFlight {
            state: &mut self.state,
            stats: &mut self.stats,
            count,
            settled: false,
        };

        tracing::debug!(records = count, "flushing batch");
        let started = Instant::now();
        let result = self.sink.deliver(&batch).await;
        ::metrics::histogram!(names::DELIVERY_DURATION_SECONDS)
            .record(started.elapsed().as_secs_f64());

        in_flight.settle(&result);
        result
    }

    /// 현재 버퍼에 있는 레코드 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// 버퍼가 비어있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// 배치 크기를 반환합니다.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// 현재 상태를 반환합니다.
    pub fn state(&self) -> DispatchState {
        self.state
    }

    /// 전송 통계를 반환합니다.
    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    /// 전송 대상에 대한 참조를 반환합니다.
    pub fn sink(&self) -> &S {
        &self.sink
    }
}

/// 전송 중인 배치의 통계 정산
///
/// `settle` 없이 drop되면 (취소) 배치를 실패로 기록합니다.
/// 어느 경우든 drop 시 상태를 `Accumulating`으로 되돌립니다.
struct InFlight<'a> {
    state: &'a mut DispatchState,
    stats: &'a mut DispatchStats,
    count: u64,
    settled: bool,
}

impl InFlight<'_> {
    fn settle(&mut self, result: &DeliveryResult) {
        self.settled = true;
        self.stats.batches_attempted += 1;
        if result.is_ok() {
            self.stats.batches_succeeded += 1;
            self.stats.records_delivered += self.count;
            ::metrics::counter!(names::BATCHES_TOTAL, names::LABEL_RESULT => "success")
                .increment(1);
            ::metrics::counter!(names::RECORDS_DELIVERED_TOTAL).increment(self.count);
            tracing::info!(records = self.count, outcome = %result, "batch delivered");
        } else {
            self.record_drop();
            tracing::warn!(records = self.count, outcome = %result, "batch delivery failed, dropping batch");
        }
    }

    fn record_drop(&mut self) {
        self.stats.batches_failed += 1;
        self.stats.records_dropped += self.count;
        ::metrics::counter!(names::BATCHES_TOTAL, names::LABEL_RESULT => "failure").increment(1);
        ::metrics::counter!(names::RECORDS_DROPPED_TOTAL).increment(self.count);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.stats.batches_attempted += 1;
            self.record_drop();
            tracing::warn!(records = self.count, "batch delivery cancelled, dropping batch");
        }
        *self.state = DispatchState::Accumulating;
    }
}
