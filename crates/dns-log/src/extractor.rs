//! DNS 쿼리 로그 라인 추출기
//!
//! BIND 스타일 query 로그 한 줄에서 클라이언트 IP, 질의 호스트명,
//! 타임스탬프를 추출하여 [`LogRecord`]를 만듭니다.
//!
//! # 라인 문법
//! ```text
//! 15-Jan-2024 10:30:45.123 queries: info: client @0x7f.. 10.0.0.1#53321 (a.com): query: a.com IN A +E(0)K (10.0.0.53)
//! ```
//!
//! - 쿼리 패턴은 라인 어디에서든 매칭됩니다 (선행 `.*` 허용).
//! - 타임스탬프는 라인 시작에 고정된 `DD-MMM-YYYY HH:MM:SS.mmm` 형식만 인식합니다.
//!
//! # 타임스탬프 정책
//! | 입력 | 결과 |
//! |------|------|
//! | 형식 일치 + 파싱 성공 | ISO-8601 (`2024-01-15T10:30:45.123000`) |
//! | 형식 일치 + 파싱 실패 | 매칭된 원문 그대로 |
//! | 타임스탬프 없음 | 현재 로컬 시각 (ISO-8601) |
//!
//! # 사용 예시
//! ```ignore
//! use lumu_dns_log::LineExtractor;
//!
//! let extractor = LineExtractor::new()?;
//! let record = extractor.extract(line).expect("query line");
//! assert_eq!(record.client_ip, "10.0.0.1");
//! ```

use chrono::{Datelike, Local, NaiveDateTime, Timelike};
use regex::Regex;

use crate::error::DnsLogError;
use crate::record::LogRecord;

/// 쿼리 라인 패턴: 그룹 1 = 클라이언트 IP, 그룹 2 = 호스트명
const QUERY_PATTERN: &str = r".*client.*?\s(\d+\.\d+\.\d+\.\d+)#\d+\s*\((.*?)\):\squery:";

/// 라인 시작 타임스탬프 패턴
const TIMESTAMP_PATTERN: &str = r"^(\d{1,2}-\w{3}-\d{4}\s\d{2}:\d{2}:\d{2}\.\d{3})";

/// 로그 타임스탬프의 chrono 파싱 형식 (`15-Jan-2024 10:30:45.123`)
const LOG_TIMESTAMP_FORMAT: &str = "%d-%b-%Y %H:%M:%S%.3f";

/// DNS 쿼리 로그 라인 추출기
///
/// 상태가 없으며 정규식은 생성 시 한 번만 컴파일됩니다.
/// `&self`만 요구하므로 여러 태스크에서 공유해도 안전합니다.
#[derive(Debug, Clone)]
pub struct LineExtractor {
    query_pattern: Regex,
    timestamp_pattern: Regex,
}

impl LineExtractor {
    /// 정규식을 컴파일하여 새 추출기를 생성합니다.
    pub fn new() -> Result<Self, DnsLogError> {
        Ok(Self {
            query_pattern: Regex::new(QUERY_PATTERN)?,
            timestamp_pattern: Regex::new(TIMESTAMP_PATTERN)?,
        })
    }

    /// 한 줄을 레코드로 추출합니다.
    ///
    /// 쿼리 패턴에 매칭되지 않으면 `None`을 반환합니다. 에러는 발생하지 않습니다.
    pub fn extract(&self, line: &str) -> Option<LogRecord> {
        let caps = self.query_pattern.captures(line)?;
        let client_ip = caps.get(1)?.as_str();
        let hostname = caps.get(2)?.as_str().trim();

        Some(LogRecord::new(
            self.timestamp_of(line),
            client_ip,
            hostname,
        ))
    }

    /// 원시 바이트 라인을 추출합니다.
    ///
    /// UTF-8로 손실 허용 디코딩하고 줄 끝의 `\n` / `\r\n`을 제거합니다.
    pub fn extract_bytes(&self, raw: &[u8]) -> Option<LogRecord> {
        let line = String::from_utf8_lossy(raw);
        self.extract(line.trim_end_matches(['\n', '\r']))
    }

    /// 라인의 타임스탬프를 ISO-8601 문자열로 정규화합니다.
    fn timestamp_of(&self, line: &str) -> String {
        match self.timestamp_pattern.captures(line).and_then(|c| c.get(1)) {
            Some(matched) => {
                let raw = matched.as_str();
                match parse_log_timestamp(raw) {
                    Some(dt) => to_iso8601(&dt),
                    None => {
                        tracing::trace!(timestamp = raw, "timestamp drift, passing through raw value");
                        raw.to_owned()
                    }
                }
            }
            None => to_iso8601(&Local::now().naive_local()),
        }
    }
}

/// 로그 타임스탬프를 파싱합니다.
///
/// 윤초(초 = 60)와 1년 이전 연도는 유효한 시각으로 보지 않습니다.
fn parse_log_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let dt = NaiveDateTime::parse_from_str(raw, LOG_TIMESTAMP_FORMAT).ok()?;
    if dt.nanosecond() >= 1_000_000_000 || dt.year() < 1 {
        return None;
    }
    Some(dt)
}

/// `YYYY-MM-DDTHH:MM:SS[.ffffff]` 형식으로 렌더링합니다.
///
/// 마이크로초가 0이면 소수부를 생략합니다.
pub fn to_iso8601(dt: &NaiveDateTime) -> String {
    let base = dt.format("%Y-%m-%dT%H:%M:%S");
    // 윤초 표현(>= 1s)은 마이크로초 범위로 접는다
    let micros = (dt.nanosecond() % 1_000_000_000) / 1_000;
    if micros == 0 {
        base.to_string()
    } else {
        format!("{base}.{micros:06}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUERY_LINE: &str = "15-Jan-2024 10:30:45.123 queries: info: client @0x7f8b2c0a1b40 10.0.0.1#53321 (a.com): query: a.com IN A +E(0)K (10.0.0.53)";

    fn extractor() -> LineExtractor {
        LineExtractor::new().unwrap()
    }

    #[test]
    fn extracts_ip_hostname_and_timestamp() {
        let record = extractor().extract(QUERY_LINE).unwrap();
        assert_eq!(record.client_ip, "10.0.0.1");
        assert_eq!(record.hostname, "a.com");
        assert_eq!(record.timestamp, "2024-01-15T10:30:45.123000");
    }

    #[test]
    fn non_matching_line_yields_none() {
        let ex = extractor();
        assert!(ex.extract("").is_none());
        assert!(ex.extract("15-Jan-2024 10:30:45.123 general: info: zone loaded").is_none());
        // '#port' 누락
        assert!(ex.extract("client 10.0.0.1 (a.com): query: a.com IN A").is_none());
        // 'query:' 누락
        assert!(ex.extract("client x 10.0.0.1#53 (a.com): update: a.com").is_none());
    }

    #[test]
    fn hostname_is_trimmed() {
        let line = "client @0x1 192.168.1.7#4000 (  padded.example.org ): query: padded.example.org IN A";
        let record = extractor().extract(line).unwrap();
        assert_eq!(record.hostname, "padded.example.org");
        assert_eq!(record.client_ip, "192.168.1.7");
    }

    #[test]
    fn matches_anywhere_in_line() {
        let line = "<30>Jan 15 named[42]: client @0xabc 172.16.0.9#1234 (b.net): query: b.net IN AAAA";
        let record = extractor().extract(line).unwrap();
        assert_eq!(record.client_ip, "172.16.0.9");
        assert_eq!(record.hostname, "b.net");
    }

    #[test]
    fn ip_is_taken_verbatim_without_validation() {
        let line = "client @0x1 999.300.0.1#53 (weird.example): query: weird.example IN A";
        let record = extractor().extract(line).unwrap();
        assert_eq!(record.client_ip, "999.300.0.1");
    }

    #[test]
    fn hostname_stops_at_first_query_marker() {
        let line = "client @0x1 10.0.0.3#53 (c.org): query: c.org IN A (d.org): query: d.org";
        let record = extractor().extract(line).unwrap();
        assert_eq!(record.hostname, "c.org");
    }

    #[test]
    fn zero_millis_omits_fraction() {
        let line = "01-Mar-2023 00:00:00.000 client @0x1 10.0.0.1#53 (a.com): query: a.com IN A";
        let record = extractor().extract(line).unwrap();
        assert_eq!(record.timestamp, "2023-03-01T00:00:00");
    }

    #[test]
    fn single_digit_day_is_accepted() {
        let line = "5-Dec-2023 23:59:59.999 client @0x1 10.0.0.1#53 (a.com): query: a.com IN A";
        let record = extractor().extract(line).unwrap();
        assert_eq!(record.timestamp, "2023-12-05T23:59:59.999000");
    }

    #[test]
    fn unparseable_timestamp_passes_through_raw() {
        let line = "31-Feb-2024 10:30:45.123 client @0x1 10.0.0.1#53 (a.com): query: a.com IN A";
        let record = extractor().extract(line).unwrap();
        assert_eq!(record.timestamp, "31-Feb-2024 10:30:45.123");

        let line = "15-Foo-2024 10:30:45.123 client @0x1 10.0.0.1#53 (a.com): query: a.com IN A";
        let record = extractor().extract(line).unwrap();
        assert_eq!(record.timestamp, "15-Foo-2024 10:30:45.123");

        // 윤초
        let line = "15-Jan-2024 10:30:60.123 client @0x1 10.0.0.1#53 (a.com): query: a.com IN A";
        let record = extractor().extract(line).unwrap();
        assert_eq!(record.timestamp, "15-Jan-2024 10:30:60.123");

        // 0년
        let line = "15-Jan-0000 10:30:45.123 client @0x1 10.0.0.1#53 (a.com): query: a.com IN A";
        let record = extractor().extract(line).unwrap();
        assert_eq!(record.timestamp, "15-Jan-0000 10:30:45.123");
    }

    #[test]
    fn missing_timestamp_uses_current_time() {
        let before = Local::now().naive_local();
        let line = "client @0x1 10.0.0.1#53 (a.com): query: a.com IN A";
        let record = extractor().extract(line).unwrap();
        let after = Local::now().naive_local();

        let parsed = NaiveDateTime::parse_from_str(&record.timestamp, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(&record.timestamp, "%Y-%m-%dT%H:%M:%S"))
            .unwrap();
        // 렌더링 시 마이크로초 미만은 버려지므로 1ms 여유를 둔다
        assert!(parsed >= before - chrono::Duration::milliseconds(1));
        assert!(parsed <= after);
    }

    #[test]
    fn extract_bytes_strips_line_ending_and_decodes_lossily() {
        let ex = extractor();
        let raw = b"client @0x1 10.0.0.1#53 (a.com): query: a.com IN A\r\n";
        assert_eq!(ex.extract_bytes(raw).unwrap().hostname, "a.com");

        let raw = b"client @0x1 10.0.0.2#53 (caf\xe9.com): query: x IN A\n";
        let record = ex.extract_bytes(raw).unwrap();
        assert_eq!(record.client_ip, "10.0.0.2");
        assert!(record.hostname.starts_with("caf"));
    }

    #[test]
    fn iso8601_rendering() {
        let dt = NaiveDateTime::parse_from_str("15-Jan-2024 10:30:45.123", LOG_TIMESTAMP_FORMAT)
            .unwrap();
        assert_eq!(to_iso8601(&dt), "2024-01-15T10:30:45.123000");
    }
}
