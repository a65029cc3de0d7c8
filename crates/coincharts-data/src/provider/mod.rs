//! 데이터 Provider 모듈.
//!
//! ## cryptocoincharts.info
//! - `ChartsClient`: 고정 base URL에 대한 GET 요청 클라이언트
//! - 요청 사이 최소 간격 강제 + 지터 (원격 서비스의 비공식 rate limit 존중)
//! - 거래소 목록 / 거래소 상세 / 가격·거래량 시계열 엔드포인트

pub mod charts_api;

pub use charts_api::ChartsClient;
