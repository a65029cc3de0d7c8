//! # CoinCharts Data
//!
//! cryptocoincharts.info 수집 파이프라인의 데이터 계층:
//! - 문서 파서 (HTML/JSON → 도메인 레코드, 순수 함수)
//! - 요청 간 최소 간격을 강제하는 HTTP 클라이언트
//! - PostgreSQL 증분 적재 스토리지 (스테이징 테이블 경유 멱등 병합)
//! - 원시 응답 아카이브

pub mod error;
pub mod parser;
pub mod provider;
pub mod storage;

pub use error::{DataError, Result};
pub use parser::{parse_exchange_detail, parse_exchange_list, parse_price_volume};
pub use provider::ChartsClient;
pub use storage::{database_url_from_pgpass, PriceVolumeStore, ResponseArchive};
