//! 데이터 모듈 오류 타입.

use thiserror::Error;

/// 수집/저장 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// HTTP 비정상 상태 코드 (호출자가 재시도/건너뜀을 결정)
    #[error("Fetch error: HTTP status {status}")]
    Fetch {
        /// 응답 상태 코드
        status: u16,
    },

    /// 네트워크 오류 (타임아웃, 연결 실패 등)
    #[error("Network error: {0}")]
    Network(String),

    /// 문서 구조 또는 값 파싱 오류
    #[error("Parse error: {0}")]
    Parse(String),

    /// 적재 오류 (staging/merge/commit 단계)
    #[error("Load error: {0}")]
    Load(String),

    /// 조회 쿼리 오류
    #[error("Query error: {0}")]
    Query(String),

    /// 설정 오류
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        DataError::Network(err.to_string())
    }
}

impl From<sqlx::Error> for DataError {
    fn from(err: sqlx::Error) -> Self {
        DataError::Query(err.to_string())
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::Parse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
