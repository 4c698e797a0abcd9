//! 집계 결과 순위 리포트
//!
//! [`StatsReport`]는 [`Aggregator`] 상태에서 상위 N개 순위 테이블을 만들고
//! 텍스트로 렌더링합니다. `Serialize`를 구현하므로 JSON 출력에도 쓰입니다.
//!
//! # 텍스트 형식
//! ```text
//!
//! Total records 3
//!
//! Client IPs Rank
//! -------------------- ------ --------
//! 10.0.0.1                 2   66.67%
//! 10.0.0.2                 1   33.33%
//! -------------------- ------ --------
//! ```

use std::io::Write;

use serde::Serialize;

use crate::aggregator::{Aggregator, FrequencyTable};
use crate::config::ReportConfig;

/// 순위 테이블의 한 행
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankRow {
    pub key: String,
    pub count: u64,
    pub percentage: f64,
}

/// 순위 테이블
#[derive(Debug, Clone, Serialize)]
pub struct RankTable {
    pub title: String,
    #[serde(skip)]
    pub column_width: usize,
    pub rows: Vec<RankRow>,
}

impl RankTable {
    fn build(
        title: &str,
        table: &FrequencyTable,
        aggregator: &Aggregator,
        top_n: usize,
        column_width: usize,
    ) -> Self {
        let rows = table
            .ranked(top_n)
            .into_iter()
            .map(|(key, count)| RankRow {
                key: key.to_owned(),
                count,
                percentage: aggregator.percentage(count),
            })
            .collect();

        Self {
            title: title.to_owned(),
            column_width,
            rows,
        }
    }

    fn write_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        let width = self.column_width;
        let separator = "-".repeat(width);

        writeln!(w)?;
        writeln!(w, "{} Rank", self.title)?;
        writeln!(w, "{separator} ------ --------")?;
        for row in &self.rows {
            writeln!(
                w,
                "{:<width$} {:>5}  {:>6.2}%",
                row.key, row.count, row.percentage
            )?;
        }
        writeln!(w, "{separator} ------ --------")?;
        Ok(())
    }
}

/// 최종 통계 리포트
#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    pub total_records: u64,
    pub client_ips: RankTable,
    pub hostnames: RankTable,
}

impl StatsReport {
    /// 집계 상태로부터 리포트를 생성합니다.
    pub fn build(aggregator: &Aggregator, layout: &ReportConfig) -> Self {
        let snapshot = aggregator.snapshot();
        Self {
            total_records: snapshot.total_records,
            client_ips: RankTable::build(
                "Client IPs",
                snapshot.client_ips,
                aggregator,
                layout.top_n,
                layout.ip_column_width,
            ),
            hostnames: RankTable::build(
                "Host",
                snapshot.hostnames,
                aggregator,
                layout.top_n,
                layout.host_column_width,
            ),
        }
    }

    /// 리포트를 텍스트로 렌더링합니다.
    pub fn write_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w)?;
        writeln!(w, "Total records {}", self.total_records)?;
        self.client_ips.write_text(w)?;
        self.hostnames.write_text(w)?;
        Ok(())
    }
}
