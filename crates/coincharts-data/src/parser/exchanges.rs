//! 거래소 목록 페이지 파서.

use coincharts_core::Exchange;
use scraper::{ElementRef, Html};

use super::{element_text, selector};
use crate::error::{DataError, Result};

/// 거래소 목록 HTML을 파싱합니다.
///
/// `#tableMarkets` 테이블의 각 행에서 첫 컬럼 앵커의 이름/URL/slug를,
/// 이후 컬럼들의 `data-sort-value` 속성(표시 텍스트가 아닌 정렬용 원본
/// 값)을 추출합니다. 행 순서는 문서 순서를 유지합니다.
///
/// 기대하는 테이블이나 컬럼이 없으면 `DataError::Parse`를 반환합니다.
pub fn parse_exchange_list(html: &str) -> Result<Vec<Exchange>> {
    let document = Html::parse_document(html);
    let row_selector = selector("#tableMarkets > tbody > tr")?;
    let cell_selector = selector("td")?;
    let link_selector = selector("a")?;

    let mut exchanges = Vec::new();
    for (row_num, row) in document.select(&row_selector).enumerate() {
        let cells: Vec<ElementRef> = row.select(&cell_selector).collect();
        if cells.len() < 4 {
            return Err(DataError::Parse(format!(
                "exchange row {} has {} columns, expected 4",
                row_num,
                cells.len()
            )));
        }

        let link = cells[0].select(&link_selector).next().ok_or_else(|| {
            DataError::Parse(format!("exchange row {} missing anchor in first column", row_num))
        })?;
        let url = link
            .value()
            .attr("href")
            .ok_or_else(|| {
                DataError::Parse(format!("exchange row {} anchor missing href", row_num))
            })?
            .to_string();
        // slug는 URL의 마지막 경로 세그먼트
        let slug = url.rsplit('/').next().unwrap_or_default().to_string();

        exchanges.push(Exchange {
            name: element_text(&link),
            url,
            slug,
            last_update: sort_value(&cells[1], row_num, "last_update")?,
            num_trading_pairs: sort_value(&cells[2], row_num, "num_trading_pairs")?,
            total_volume: sort_value(&cells[3], row_num, "total_volume")?,
        });
    }

    if exchanges.is_empty() {
        return Err(DataError::Parse(
            "exchange table #tableMarkets not found or empty".to_string(),
        ));
    }

    Ok(exchanges)
}

/// 셀의 `data-sort-value` 속성 값을 읽습니다.
fn sort_value(cell: &ElementRef<'_>, row_num: usize, field: &str) -> Result<String> {
    cell.value()
        .attr("data-sort-value")
        .map(str::to_string)
        .ok_or_else(|| {
            DataError::Parse(format!(
                "exchange row {} missing data-sort-value for {}",
                row_num, field
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXCHANGES_HTML: &str = r#"
<html><body>
<table id="tableMarkets" class="table table-striped">
<thead><tr><th>Exchange</th><th>Last update</th><th>Trading pairs</th><th>Volume (BTC)</th></tr></thead>
<tbody>
<tr><td><a href="/v2/markets/show/bitstamp">Bitstamp</a></td><td data-sort-value="1405977102">a minute ago</td><td data-sort-value="15">15</td><td data-sort-value="9001">9,001.00</td></tr>
<tr><td><a href="/v2/markets/show/btc-e">BTC-e</a></td><td data-sort-value="1405977068">2 minutes ago</td><td data-sort-value="23">23</td><td data-sort-value="8120">8,120.44</td></tr>
<tr><td><a href="/v2/markets/show/btcchina">BTC China</a></td><td data-sort-value="1405977001">3 minutes ago</td><td data-sort-value="12">12</td><td data-sort-value="7543">7,543.10</td></tr>
<tr><td><a href="/v2/markets/show/bitfinex">Bitfinex</a></td><td data-sort-value="1405976990">4 minutes ago</td><td data-sort-value="41">41</td><td data-sort-value="6220">6,220.75</td></tr>
<tr><td><a href="/v2/markets/show/cryptsy">Cryptsy</a></td><td data-sort-value="1405976811">7 minutes ago</td><td data-sort-value="389">389</td><td data-sort-value="4101">4,101.92</td></tr>
<tr><td><a href="/v2/markets/show/kraken">Kraken</a></td><td data-sort-value="1405976745">8 minutes ago</td><td data-sort-value="21">21</td><td data-sort-value="635">635</td></tr>
</tbody>
</table>
</body></html>
"#;

    #[test]
    fn test_parse_exchange_list() {
        let data = parse_exchange_list(EXCHANGES_HTML).unwrap();

        assert_eq!(data.len(), 6);
        assert_eq!(data[0].name, "Bitstamp");
        assert_eq!(data[1].last_update, "1405977068");
        assert_eq!(data[2].url, "/v2/markets/show/btcchina");
        assert_eq!(data[2].slug, "btcchina");
        assert_eq!(data[4].num_trading_pairs, "389");
        assert_eq!(data[5].total_volume, "635");
    }

    #[test]
    fn test_parse_exchange_list_preserves_document_order() {
        let data = parse_exchange_list(EXCHANGES_HTML).unwrap();
        let slugs: Vec<&str> = data.iter().map(|e| e.slug.as_str()).collect();
        assert_eq!(
            slugs,
            ["bitstamp", "btc-e", "btcchina", "bitfinex", "cryptsy", "kraken"]
        );
    }

    #[test]
    fn test_parse_exchange_list_missing_table() {
        let err = parse_exchange_list("<html><body><p>maintenance</p></body></html>").unwrap_err();
        assert!(matches!(err, DataError::Parse(_)));
    }

    #[test]
    fn test_parse_exchange_list_missing_anchor() {
        let html = r#"
<table id="tableMarkets"><tbody>
<tr><td>Bitstamp</td><td data-sort-value="1">x</td><td data-sort-value="2">x</td><td data-sort-value="3">x</td></tr>
</tbody></table>
"#;
        let err = parse_exchange_list(html).unwrap_err();
        assert!(matches!(err, DataError::Parse(_)));
    }

    #[test]
    fn test_parse_exchange_list_missing_sort_value() {
        let html = r#"
<table id="tableMarkets"><tbody>
<tr><td><a href="/v2/markets/show/bitstamp">Bitstamp</a></td><td>a minute ago</td><td data-sort-value="2">x</td><td data-sort-value="3">x</td></tr>
</tbody></table>
"#;
        let err = parse_exchange_list(html).unwrap_err();
        assert!(matches!(err, DataError::Parse(_)));
    }
}
