//! 메트릭 상수 및 설명 등록
//!
//! 파이프라인이 기록하는 메트릭의 이름과 설명을 정의합니다.
//! `metrics` 파사드로 기록하므로 레코더가 설치되지 않으면 아무 비용도 들지 않습니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `lumu_dns_`
//! - 접미어: `_total` (counter), `_seconds` (histogram)

/// 결과 레이블 키 (success, failure)
pub const LABEL_RESULT: &str = "result";

/// 읽은 전체 라인 수 (counter)
pub const LINES_READ_TOTAL: &str = "lumu_dns_lines_read_total";

/// 추출된 레코드 수 (counter)
pub const RECORDS_EXTRACTED_TOTAL: &str = "lumu_dns_records_extracted_total";

/// 문법 불일치로 건너뛴 라인 수 (counter)
pub const EXTRACTION_MISSES_TOTAL: &str = "lumu_dns_extraction_misses_total";

/// 전송 시도한 배치 수 (counter, label: result)
pub const BATCHES_TOTAL: &str = "lumu_dns_batches_total";

/// collector가 수락한 레코드 수 (counter)
pub const RECORDS_DELIVERED_TOTAL: &str = "lumu_dns_records_delivered_total";

/// 전송 실패로 버려진 레코드 수 (counter)
pub const RECORDS_DROPPED_TOTAL: &str = "lumu_dns_records_dropped_total";

/// 배치 전송 소요 시간 (histogram, 초)
pub const DELIVERY_DURATION_SECONDS: &str = "lumu_dns_delivery_duration_seconds";

/// 모든 메트릭의 설명을 등록합니다.
///
/// 레코더 설치 직후 한 번 호출합니다.
pub fn describe_all() {
    use ::metrics::{Unit, describe_counter, describe_histogram};

    describe_counter!(LINES_READ_TOTAL, "Total log lines read from the input");
    describe_counter!(
        RECORDS_EXTRACTED_TOTAL,
        "Log lines that matched the DNS query grammar"
    );
    describe_counter!(
        EXTRACTION_MISSES_TOTAL,
        "Log lines skipped because they did not match the grammar"
    );
    describe_counter!(BATCHES_TOTAL, "Batches handed to the collector");
    describe_counter!(
        RECORDS_DELIVERED_TOTAL,
        "Records accepted by the collector"
    );
    describe_counter!(
        RECORDS_DROPPED_TOTAL,
        "Records dropped after a failed delivery"
    );
    describe_histogram!(
        DELIVERY_DURATION_SECONDS,
        Unit::Seconds,
        "Time spent delivering one batch"
    );
}
