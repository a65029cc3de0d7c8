//! 거래소 상세 페이지 파서.
//!
//! 문서 안의 두 `.col-md-6` 영역을 위치로 찾습니다: 첫 번째는 요약
//! 테이블, 두 번째는 트레이딩 페어 테이블입니다. 요약은 행 인덱스 기반의
//! 위치 추출이라 구조가 어긋나면 바로 `DataError::Parse`로 실패합니다.

use chrono::NaiveDateTime;
use coincharts_core::{ExchangeSummary, TradingPair, VolumeStat};
use scraper::{ElementRef, Html};

use super::{element_text, parse_decimal, selector};
use crate::error::{DataError, Result};

/// 거래량 셀의 금액/통화 구분자 (non-breaking space).
const VOLUME_SEPARATOR: char = '\u{a0}';

/// 거래소 상세 HTML을 파싱하여 요약과 트레이딩 페어 목록을 반환합니다.
pub fn parse_exchange_detail(html: &str) -> Result<(ExchangeSummary, Vec<TradingPair>)> {
    let document = Html::parse_document(html);
    let region_selector = selector(".col-md-6")?;
    let regions: Vec<ElementRef> = document.select(&region_selector).collect();
    if regions.len() < 2 {
        return Err(DataError::Parse(format!(
            "expected 2 .col-md-6 regions, found {}",
            regions.len()
        )));
    }

    let summary = parse_summary(&regions[0])?;
    let pairs = parse_pairs(&regions[1])?;
    Ok((summary, pairs))
}

/// 요약 테이블 추출 (행 인덱스 → 의미).
///
/// - 행 0: 트레이딩 페어 수 (span)
/// - 행 1: 줄 단위로 나뉜 거래량 항목들, 각각 `금액␣단위` (nbsp 구분)
/// - 행 2: 마지막 갱신 시각 `YYYY-MM-DD HH:MM:SS` (비어 있으면 None)
/// - 행 3: 거래소 공식 URL (앵커)
fn parse_summary(region: &ElementRef<'_>) -> Result<ExchangeSummary> {
    let row_selector = selector("table > tbody > tr")?;
    let cell_selector = selector("td")?;
    let span_selector = selector("span")?;
    let link_selector = selector("a")?;

    let mut num_trading_pairs = None;
    let mut volumes = Vec::new();
    let mut last_updated = None;
    let mut url = None;

    for (row_num, row) in region.select(&row_selector).enumerate() {
        match row_num {
            0 => {
                let span = row.select(&span_selector).next().ok_or_else(|| {
                    DataError::Parse("summary row 0 missing pair count span".to_string())
                })?;
                let raw = element_text(&span);
                let count = raw.trim().parse::<u32>().map_err(|_| {
                    DataError::Parse(format!("invalid pair count '{}'", raw.trim()))
                })?;
                num_trading_pairs = Some(count);
            }
            1 => {
                let cell = value_cell(&row, &cell_selector, row_num)?;
                for entry in element_text(&cell).split('\n') {
                    let entry = entry.trim();
                    if entry.is_empty() {
                        continue;
                    }
                    let parts: Vec<&str> = entry.split(VOLUME_SEPARATOR).collect();
                    if parts.len() < 2 {
                        return Err(DataError::Parse(format!(
                            "malformed summary volume entry '{}'",
                            entry
                        )));
                    }
                    volumes.push(VolumeStat {
                        amount: parse_decimal(parts[0])?,
                        unit: parts[1].trim().to_lowercase(),
                    });
                }
            }
            2 => {
                let cell = value_cell(&row, &cell_selector, row_num)?;
                // 첫 텍스트 노드만 사용 (<br/> 뒤의 상대 시각 표기는 무시)
                let candidate = cell.text().next().unwrap_or("").trim();
                if !candidate.is_empty() {
                    let parsed = NaiveDateTime::parse_from_str(candidate, "%Y-%m-%d %H:%M:%S")
                        .map_err(|e| {
                            DataError::Parse(format!(
                                "invalid last-updated timestamp '{}': {}",
                                candidate, e
                            ))
                        })?;
                    last_updated = Some(parsed);
                }
            }
            3 => {
                let link = row.select(&link_selector).next().ok_or_else(|| {
                    DataError::Parse("summary row 3 missing url anchor".to_string())
                })?;
                url = link.value().attr("href").map(str::to_string);
            }
            _ => {}
        }
    }

    Ok(ExchangeSummary {
        num_trading_pairs: num_trading_pairs
            .ok_or_else(|| DataError::Parse("summary missing pair count row".to_string()))?,
        volumes,
        last_updated,
        url: url.ok_or_else(|| DataError::Parse("summary missing url row".to_string()))?,
    })
}

/// 페어 테이블 추출.
///
/// - 컬럼 0: 이름/URL, URL 경로 세그먼트에서 통화 코드 유도
///   (뒤에서 두 번째 = sink, 세 번째 = source)
/// - 컬럼 1: source 통화 기준 가격 (공백 앞 숫자 토큰, 쉼표 제거)
/// - 컬럼 2 이후: `금액␣통화` 거래량, 역할은 결정 테이블로 분류
fn parse_pairs(region: &ElementRef<'_>) -> Result<Vec<TradingPair>> {
    let row_selector = selector("table > tbody > tr")?;
    let cell_selector = selector("td")?;
    let link_selector = selector("a")?;

    let mut pairs = Vec::new();
    for (row_num, row) in region.select(&row_selector).enumerate() {
        let cells: Vec<ElementRef> = row.select(&cell_selector).collect();
        if cells.len() < 2 {
            return Err(DataError::Parse(format!(
                "pair row {} has {} columns, expected at least 2",
                row_num,
                cells.len()
            )));
        }

        let link = cells[0].select(&link_selector).next().ok_or_else(|| {
            DataError::Parse(format!("pair row {} missing anchor in first column", row_num))
        })?;
        let url = link
            .value()
            .attr("href")
            .ok_or_else(|| DataError::Parse(format!("pair row {} anchor missing href", row_num)))?
            .to_string();
        let segments: Vec<&str> = url.split('/').collect();
        if segments.len() < 3 {
            return Err(DataError::Parse(format!(
                "pair row {} url '{}' has too few path segments",
                row_num, url
            )));
        }

        let mut pair = TradingPair {
            name: element_text(&link),
            source: segments[segments.len() - 3].to_string(),
            sink: segments[segments.len() - 2].to_string(),
            url,
            ..Default::default()
        };

        // 가격 셀이 비어 있으면 미확정(None)으로 남긴다
        let price_text = cells[1].text().next().unwrap_or("").trim().to_string();
        let price_token = price_text.split(' ').next().unwrap_or("");
        if !price_token.is_empty() {
            pair.source_price = Some(parse_decimal(price_token)?);
        }

        for cell in &cells[2..] {
            let raw = cell.text().next().unwrap_or("").trim().to_string();
            let token = raw.split(' ').next().unwrap_or("");
            let parts: Vec<&str> = token.split(VOLUME_SEPARATOR).collect();
            if parts.len() < 2 {
                return Err(DataError::Parse(format!(
                    "pair row {} malformed volume cell '{}'",
                    row_num, raw
                )));
            }
            let amount = parse_decimal(parts[0])?;
            let currency = parts[1].trim().to_lowercase();
            pair.record_volume(amount, &currency);
        }

        pairs.push(pair);
    }

    Ok(pairs)
}

/// 라벨 다음의 값 셀 (인덱스 1)을 반환합니다.
fn value_cell<'a>(
    row: &ElementRef<'a>,
    cell_selector: &scraper::Selector,
    row_num: usize,
) -> Result<ElementRef<'a>> {
    row.select(cell_selector).nth(1).ok_or_else(|| {
        DataError::Parse(format!("summary row {} missing value cell", row_num))
    })
}
