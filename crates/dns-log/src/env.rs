//! `.env` 형식 환경 파일 로더
//!
//! `KEY=VALUE` 형식의 간단한 텍스트 파일을 읽습니다.
//!
//! # 규칙
//! - 앞뒤 공백 제거 후 빈 줄과 `#`으로 시작하는 줄은 무시
//! - 첫 번째 `=`를 기준으로 키와 값을 분리
//! - 값의 바깥쪽 작은따옴표, 큰따옴표 제거
//! - `=`가 없는 줄은 경고 후 건너뜀
//!
//! 파일 값은 프로세스 환경변수보다 우선합니다. 프로세스 환경을 직접 수정하지 않고
//! [`EnvFile::lookup`]에서 두 소스를 합쳐 조회합니다.

use std::collections::HashMap;
use std::path::Path;

use crate::error::DnsLogError;

/// 기본 환경 파일 경로
pub const DEFAULT_ENV_PATH: &str = ".env";

/// 파싱된 환경 파일
#[derive(Debug, Clone, Default)]
pub struct EnvFile {
    vars: HashMap<String, String>,
}

impl EnvFile {
    /// 빈 환경 파일 (프로세스 환경변수만 조회)
    pub fn empty() -> Self {
        Self::default()
    }

    /// 파일 내용을 파싱합니다.
    pub fn parse(content: &str) -> Self {
        let mut vars = HashMap::new();

        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                tracing::warn!(line = line_no + 1, "env file line without '=', skipping");
                continue;
            };

            let value = value.trim().trim_matches('\'').trim_matches('"');
            vars.insert(key.trim().to_owned(), value.to_owned());
        }

        Self { vars }
    }

    /// 파일에서 환경 변수를 로드합니다.
    ///
    /// 파일이 없으면 경고만 남기고 빈 환경 파일을 반환합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, DnsLogError> {
        let path = path.as_ref();
        match tokio::fs::read_to_string(path).await {
            Ok(content) => {
                let env = Self::parse(&content);
                tracing::debug!(path = %path.display(), vars = env.len(), "loaded env file");
                Ok(env)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "env file not found, using process environment");
                Ok(Self::empty())
            }
            Err(e) => Err(DnsLogError::EnvFile {
                path: path.display().to_string(),
                reason: e.to_string(),
            }),
        }
    }

    /// 파일에 정의된 값만 조회합니다.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// 파일 값, 없으면 프로세스 환경변수를 조회합니다.
    pub fn lookup(&self, key: &str) -> Option<String> {
        self.get(key)
            .map(str::to_owned)
            .or_else(|| std::env::var(key).ok())
    }

    /// 파일에 정의된 변수 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// 파일에 정의된 변수가 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}
