//! DNS 로그 파이프라인 에러 타입
//!
//! [`DnsLogError`]는 파이프라인 초기화와 입력 처리 중 발생하는 에러를 표현합니다.
//! 라인 단위 실패(문법 불일치, 타임스탬프 형식 불일치)와 배치 단위 전송 실패는
//! 에러가 아니며 이 타입으로 전파되지 않습니다. 실행을 중단시키는 것은
//! 입력 파일 열기 실패와 설정 에러뿐입니다.

/// DNS 로그 파이프라인 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum DnsLogError {
    /// 입력 파일을 찾을 수 없음 (치명적)
    #[error("file {path} not found")]
    FileNotFound {
        /// 요청된 파일 경로
        path: String,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 환경 파일(.env) 읽기 실패
    #[error("env file error: {path}: {reason}")]
    EnvFile {
        /// 환경 파일 경로
        path: String,
        /// 에러 사유
        reason: String,
    },

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// 정규식 컴파일 에러
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),

    /// HTTP 클라이언트 생성 실패
    #[error("http client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl DnsLogError {
    /// 입력 파일 부재로 인한 에러인지 확인합니다.
    pub fn is_file_not_found(&self) -> bool {
        matches!(self, Self::FileNotFound { .. })
    }
}
