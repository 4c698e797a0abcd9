//! 파싱된 DNS 쿼리 레코드와 전송용 와이어 레코드

use serde::{Deserialize, Serialize};

/// DNS 쿼리 로그 한 줄에서 추출한 레코드
///
/// 라인이 문법에 매칭된 경우에만 생성됩니다.
/// 생성 후에는 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// ISO-8601 타임스탬프 (타임존 오프셋 없음)
    pub timestamp: String,
    /// 클라이언트 IP (점 표기 문자열, 매칭된 그대로)
    pub client_ip: String,
    /// 질의된 호스트명 (앞뒤 공백 제거)
    pub hostname: String,
}

impl LogRecord {
    /// 새 레코드를 생성합니다.
    pub fn new(
        timestamp: impl Into<String>,
        client_ip: impl Into<String>,
        hostname: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            client_ip: client_ip.into(),
            hostname: hostname.into(),
        }
    }

    /// collector API로 전송할 와이어 형식으로 변환합니다.
    pub fn to_wire(&self) -> WireRecord<'_> {
        WireRecord {
            timestamp: &self.timestamp,
            name: &self.hostname,
            client_ip: &self.client_ip,
        }
    }
}

/// collector API 요청 본문의 원소
///
/// `hostname` 필드는 와이어 상에서 `name`으로 전송됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WireRecord<'a> {
    pub timestamp: &'a str,
    pub name: &'a str,
    pub client_ip: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_record_renames_hostname() {
        let record = LogRecord::new("2024-01-15T10:30:45.123000", "10.0.0.1", "a.com");
        let json = serde_json::to_value(record.to_wire()).unwrap();
        assert_eq!(json["name"], "a.com");
        assert_eq!(json["client_ip"], "10.0.0.1");
        assert_eq!(json["timestamp"], "2024-01-15T10:30:45.123000");
        assert!(json.get("hostname").is_none());
    }

    #[test]
    fn wire_record_field_order() {
        let record = LogRecord::new("t", "1.2.3.4", "h");
        let json = serde_json::to_string(&record.to_wire()).unwrap();
        assert_eq!(json, r#"{"timestamp":"t","name":"h","client_ip":"1.2.3.4"}"#);
    }
}
