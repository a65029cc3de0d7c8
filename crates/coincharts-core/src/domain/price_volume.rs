//! 가격/거래량 시계열 모델.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 시계열 행의 시간 버킷.
///
/// 업스트림 타임스탬프 문자열의 길이만으로 해상도를 결정합니다:
/// 10자(`YYYY-MM-DD`)는 일 단위, 13자(`YYYY-MM-DD HH`)는 시간 단위.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeBucket {
    /// 일 단위 버킷
    Day(NaiveDate),
    /// 시간 단위 버킷
    Hour(NaiveDateTime),
}

impl TimeBucket {
    /// 저장용 타임스탬프를 반환합니다. 일 단위 버킷은 자정으로 매핑됩니다.
    pub fn hour(&self) -> NaiveDateTime {
        match self {
            Self::Day(date) => date.and_time(NaiveTime::MIN),
            Self::Hour(hour) => *hour,
        }
    }
}

impl std::str::FromStr for TimeBucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.len() {
            10 => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map(Self::Day)
                .map_err(|e| format!("invalid date '{}': {}", s, e)),
            13 => NaiveDateTime::parse_from_str(&format!("{}:00", s), "%Y-%m-%d %H:%M")
                .map(Self::Hour)
                .map_err(|e| format!("invalid hour timestamp '{}': {}", s, e)),
            len => Err(format!(
                "timestamp '{}' has length {}, expected 10 or 13",
                s, len
            )),
        }
    }
}

/// 한 시간 버킷의 가격/거래량 통계.
///
/// (source, sink, exchange) 시리즈 안에서 버킷은 유일해야 하며, 증분
/// 적재가 같은 키의 중복 버킷을 만들지 않아야 합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceVolumeRow {
    /// source 통화 코드
    pub source: String,
    /// sink 통화 코드
    pub sink: String,
    /// 거래소 slug
    pub exchange: String,
    /// 시간 버킷
    pub bucket: TimeBucket,
    /// 최저가
    pub price_low: Decimal,
    /// 25퍼센타일 가격
    pub price_25th_percentile: Decimal,
    /// 75퍼센타일 가격
    pub price_75th_percentile: Decimal,
    /// 최고가
    pub price_high: Decimal,
    /// 중앙값 가격
    pub price_median: Decimal,
    /// 20기간 지수이동평균 가격
    pub price_ema20: Decimal,
    /// 거래량
    pub volume: Decimal,
    /// 업스트림 배열 인덱스 7의 미해석 값
    pub field_7: Decimal,
    /// 업스트림 배열 인덱스 8의 미해석 값
    pub field_8: Decimal,
}
