//! 거래소 및 트레이딩 페어 모델.
//!
//! 거래소 목록/상세 페이지에서 파싱되는 레코드들입니다. 모든 값은 스크랩
//! 응답마다 새로 구성되며, 구성 후에는 변경되지 않습니다.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 거래소 목록 페이지의 한 행.
///
/// 정렬용 원본 값(`data-sort-value`)은 표시 텍스트와 달리 포맷이 고정되어
/// 있지 않으므로 문자열 그대로 보존합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    /// 거래소 이름
    pub name: String,
    /// 상세 페이지 URL
    pub url: String,
    /// 짧은 식별자 (URL 마지막 경로 세그먼트)
    pub slug: String,
    /// 마지막 갱신 시각 (epoch 문자열)
    pub last_update: String,
    /// 트레이딩 페어 수 (정렬용 원본 값)
    pub num_trading_pairs: String,
    /// 총 거래량 (정렬용 원본 값)
    pub total_volume: String,
}

/// 거래소 요약의 거래량 항목 (금액 + 통화 단위).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeStat {
    /// 거래량
    pub amount: Decimal,
    /// 통화 단위 (소문자)
    pub unit: String,
}

/// 거래소 상세 페이지의 요약 통계.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeSummary {
    /// 트레이딩 페어 수
    pub num_trading_pairs: u32,
    /// 통화별 거래량 (문서 순서 유지)
    pub volumes: Vec<VolumeStat>,
    /// 마지막 갱신 시각 (없으면 None)
    pub last_updated: Option<chrono::NaiveDateTime>,
    /// 거래소 공식 URL
    pub url: String,
}

/// 거래량 컬럼의 통화 역할.
///
/// 거래량 셀의 통화 코드를 페어의 source/sink 통화와 비교해 분류하는
/// 결정 테이블입니다. 문서 구조와 무관하게 독립적으로 검증할 수 있도록
/// 인라인 조건 대신 명시적 타입으로 둡니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VolumeRole {
    /// source 통화 기준 거래량
    Source,
    /// sink 통화 기준 거래량
    Sink,
    /// 페어와 무관한 통화 (통화 코드를 그대로 키로 사용)
    Other(String),
}

impl VolumeRole {
    /// 통화 코드를 source/sink와 비교하여 역할을 결정합니다.
    pub fn classify(currency: &str, source: &str, sink: &str) -> Self {
        if currency == source {
            Self::Source
        } else if currency == sink {
            Self::Sink
        } else {
            Self::Other(currency.to_string())
        }
    }
}

/// 거래소 상세 페이지의 트레이딩 페어 한 행.
///
/// 거래소와는 slug 문자열 키로만 연결됩니다 (참조 없음).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TradingPair {
    /// 표시 이름 (예: "LTC/USD")
    pub name: String,
    /// 페어 상세 URL
    pub url: String,
    /// source 통화 코드
    pub source: String,
    /// sink 통화 코드
    pub sink: String,
    /// source 통화 기준 가격. 셀에 값이 전혀 없으면 None으로 남겨
    /// 미확정 상태를 그대로 드러냅니다 (0으로 기본값 처리하지 않음).
    pub source_price: Option<Decimal>,
    /// source 통화 기준 거래량
    pub source_volume: Option<Decimal>,
    /// sink 통화 기준 거래량
    pub sink_volume: Option<Decimal>,
    /// btc 표시 거래량 (역할과 무관하게 통화가 btc이면 기록)
    pub btc_volume: Option<Decimal>,
    /// source/sink 어느 쪽도 아닌 통화의 거래량 (통화 코드 키)
    pub other_volumes: BTreeMap<String, Decimal>,
}

impl TradingPair {
    /// 거래량 값을 통화 역할에 따라 기록합니다.
    ///
    /// 통화가 "btc"인 경우 역할과 무관하게 `btc_volume`에도 기록합니다.
    pub fn record_volume(&mut self, amount: Decimal, currency: &str) {
        match VolumeRole::classify(currency, &self.source, &self.sink) {
            VolumeRole::Source => self.source_volume = Some(amount),
            VolumeRole::Sink => self.sink_volume = Some(amount),
            VolumeRole::Other(code) => {
                self.other_volumes.insert(code, amount);
            }
        }

        if currency == "btc" {
            self.btc_volume = Some(amount);
        }
    }
}
