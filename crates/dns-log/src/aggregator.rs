//! 빈도 집계 -- 클라이언트 IP / 호스트명별 출현 횟수
//!
//! [`Aggregator`]는 파이프라인이 소유하는 단일 인스턴스이며,
//! 레코드 하나를 `&mut self` 호출 한 번으로 전체 카운트와 두 테이블에 동시에 반영합니다.
//!
//! # 불변식
//! 어느 관찰 시점에서든
//! `total_records == client_ips.sum() == hostnames.sum()`

use std::collections::HashMap;

use crate::record::LogRecord;

/// 키별 출현 횟수 테이블
///
/// 처음 등장한 순서를 기억하여, 순위 산정 시 동일 카운트는 먼저 등장한 키가 앞섭니다.
#[derive(Debug, Clone, Default)]
pub struct FrequencyTable {
    /// 키 -> `entries` 인덱스
    index: HashMap<String, usize>,
    /// 최초 등장 순서대로 저장된 (키, 카운트)
    entries: Vec<(String, u64)>,
}

impl FrequencyTable {
    /// 빈 테이블을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 키의 카운트를 1 증가시킵니다.
    pub fn increment(&mut self, key: &str) {
        match self.index.get(key) {
            Some(&idx) => self.entries[idx].1 += 1,
            None => {
                self.index.insert(key.to_owned(), self.entries.len());
                self.entries.push((key.to_owned(), 1));
            }
        }
    }

    /// 키의 카운트를 반환합니다. 없으면 0입니다.
    pub fn get(&self, key: &str) -> u64 {
        self.index
            .get(key)
            .map(|&idx| self.entries[idx].1)
            .unwrap_or(0)
    }

    /// 서로 다른 키의 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 테이블이 비어있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 모든 카운트의 합을 반환합니다.
    pub fn sum(&self) -> u64 {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    /// 최초 등장 순서대로 (키, 카운트)를 순회합니다.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(key, count)| (key.as_str(), *count))
    }

    /// 카운트 내림차순으로 상위 `limit`개를 반환합니다.
    ///
    /// 안정 정렬이므로 동일 카운트는 최초 등장 순서를 유지합니다.
    pub fn ranked(&self, limit: usize) -> Vec<(&str, u64)> {
        let mut ranked: Vec<(&str, u64)> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(limit);
        ranked
    }
}

/// 집계 상태의 읽기 전용 스냅샷
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub total_records: u64,
    pub client_ips: &'a FrequencyTable,
    pub hostnames: &'a FrequencyTable,
}

/// 레코드 스트림의 빈도 집계기
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    total_records: u64,
    client_ips: FrequencyTable,
    hostnames: FrequencyTable,
}

impl Aggregator {
    /// 빈 집계기를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 레코드 하나를 집계합니다.
    ///
    /// 전체 카운트, IP 테이블, 호스트명 테이블을 한 단위로 갱신합니다.
    pub fn record(&mut self, entry: &LogRecord) {
        self.total_records += 1;
        self.client_ips.increment(&entry.client_ip);
        self.hostnames.increment(&entry.hostname);
    }

    /// 전체 레코드 대비 백분율을 계산합니다.
    ///
    /// 집계된 레코드가 없으면 0을 반환합니다.
    pub fn percentage(&self, count: u64) -> f64 {
        if self.total_records == 0 {
            return 0.0;
        }
        count as f64 / self.total_records as f64 * 100.0
    }

    /// 현재 상태의 스냅샷을 반환합니다.
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            total_records: self.total_records,
            client_ips: &self.client_ips,
            hostnames: &self.hostnames,
        }
    }

    /// 집계된 전체 레코드 수를 반환합니다.
    pub fn total_records(&self) -> u64 {
        self.total_records
    }

    /// 클라이언트 IP 테이블을 반환합니다.
    pub fn client_ips(&self) -> &FrequencyTable {
        &self.client_ips
    }

    /// 호스트명 테이블을 반환합니다.
    pub fn hostnames(&self) -> &FrequencyTable {
        &self.hostnames
    }
}
