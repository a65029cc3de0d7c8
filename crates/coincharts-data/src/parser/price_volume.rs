//! 가격/거래량 시계열 JSON 파서.

use coincharts_core::{PriceVolumeRow, TimeBucket};
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

use crate::error::{DataError, Result};

// 고정 폭 배열의 인덱스 → 필드 매핑. 업스트림 응답의 순서를 그대로
// 보존한다. EMA는 인덱스 9에 있어 이웃 필드(7, 8)와 순서가 어긋나지만
// 업스트림 형식이므로 재배열하지 않는다.
const IDX_PRICE_LOW: usize = 1;
const IDX_PRICE_25TH: usize = 2;
const IDX_PRICE_75TH: usize = 3;
const IDX_PRICE_HIGH: usize = 4;
const IDX_PRICE_MEDIAN: usize = 5;
const IDX_VOLUME: usize = 6;
const IDX_FIELD_7: usize = 7;
const IDX_FIELD_8: usize = 8;
const IDX_PRICE_EMA20: usize = 9;

/// 행당 최소 요소 수 (타임스탬프 1개 + 통계 9개).
const ROW_ARITY: usize = 10;

/// 가격/거래량 JSON을 파싱합니다.
///
/// 입력은 고정 폭 배열의 JSON 배열입니다. 각 행의 첫 요소는 타임스탬프
/// 문자열이며 길이(10 또는 13)만으로 일/시간 해상도를 결정합니다.
/// JSON이 깨졌거나 행 길이가 모자라면 `DataError::Parse`로 실패합니다.
pub fn parse_price_volume(
    json: &str,
    source: &str,
    sink: &str,
    exchange: &str,
) -> Result<Vec<PriceVolumeRow>> {
    let raw_rows: Vec<Vec<Value>> = serde_json::from_str(json)?;

    let mut rows = Vec::with_capacity(raw_rows.len());
    for (row_num, raw) in raw_rows.iter().enumerate() {
        if raw.len() < ROW_ARITY {
            return Err(DataError::Parse(format!(
                "price/volume row {} has {} elements, expected at least {}",
                row_num,
                raw.len(),
                ROW_ARITY
            )));
        }

        let timestamp = raw[0].as_str().ok_or_else(|| {
            DataError::Parse(format!(
                "price/volume row {} first element is not a timestamp string",
                row_num
            ))
        })?;
        let bucket = TimeBucket::from_str(timestamp)
            .map_err(|e| DataError::Parse(format!("price/volume row {}: {}", row_num, e)))?;

        rows.push(PriceVolumeRow {
            source: source.to_string(),
            sink: sink.to_string(),
            exchange: exchange.to_string(),
            bucket,
            price_low: decimal_at(raw, IDX_PRICE_LOW, row_num)?,
            price_25th_percentile: decimal_at(raw, IDX_PRICE_25TH, row_num)?,
            price_75th_percentile: decimal_at(raw, IDX_PRICE_75TH, row_num)?,
            price_high: decimal_at(raw, IDX_PRICE_HIGH, row_num)?,
            price_median: decimal_at(raw, IDX_PRICE_MEDIAN, row_num)?,
            price_ema20: decimal_at(raw, IDX_PRICE_EMA20, row_num)?,
            volume: decimal_at(raw, IDX_VOLUME, row_num)?,
            field_7: decimal_at(raw, IDX_FIELD_7, row_num)?,
            field_8: decimal_at(raw, IDX_FIELD_8, row_num)?,
        });
    }

    Ok(rows)
}

/// 행의 지정 인덱스 요소를 Decimal로 변환합니다.
///
/// JSON 숫자는 원문 표기를 거쳐 변환해 이진 부동소수점 노이즈를 피합니다.
fn decimal_at(row: &[Value], idx: usize, row_num: usize) -> Result<Decimal> {
    match &row[idx] {
        Value::Number(n) => Decimal::from_str(&n.to_string()).map_err(|_| {
            DataError::Parse(format!(
                "price/volume row {} index {} is not a representable number: {}",
                row_num, idx, n
            ))
        }),
        Value::String(s) => Decimal::from_str(s.trim()).map_err(|_| {
            DataError::Parse(format!(
                "price/volume row {} index {} is not a number: '{}'",
                row_num, idx, s
            ))
        }),
        other => Err(DataError::Parse(format!(
            "price/volume row {} index {} has unexpected type: {}",
            row_num, idx, other
        ))),
    }
}
