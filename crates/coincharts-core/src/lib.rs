//! # CoinCharts Core
//!
//! cryptocoincharts.info 수집기의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 수집 파이프라인 전반에서 사용되는 기본 타입을 제공합니다:
//! - 거래소 및 트레이딩 페어 구조체
//! - 가격/거래량 시계열 행과 시간 버킷
//! - 로깅 인프라

pub mod domain;
pub mod logging;

pub use domain::*;
pub use logging::*;
