//! 거래소 목록/상세 동기화 모듈.

use crate::{CollectionStats, CollectorError, Result};
use coincharts_data::{parse_exchange_detail, parse_exchange_list, ChartsClient, ResponseArchive};
use std::time::Instant;

/// 가격/거래량 수집 대상이 되는 (source, sink, exchange) 키.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairKey {
    /// source 통화 코드
    pub source: String,
    /// sink 통화 코드
    pub sink: String,
    /// 거래소 slug
    pub exchange: String,
}

impl PairKey {
    /// `"{exchange}-{source}-{sink}"` 형태의 시리즈 키.
    ///
    /// 저장소의 `latest_hours` 결과와 같은 형식입니다.
    pub fn series_key(&self) -> String {
        format!("{}-{}-{}", self.exchange, self.source, self.sink)
    }
}

/// 거래소 목록과 각 거래소의 트레이딩 페어를 수집합니다.
///
/// 목록/상세 단계의 fetch/parse 실패는 복구 대상이 아니므로 그대로
/// 전파되어 실행을 중단시킵니다 (부분 목록으로는 이어갈 수 없음).
pub async fn sync_exchanges(
    client: &mut ChartsClient,
    archive: &ResponseArchive,
) -> Result<(Vec<PairKey>, CollectionStats)> {
    let start = Instant::now();
    let mut stats = CollectionStats::new();

    tracing::info!("거래소 목록 수집 시작");
    let list_html = client.fetch_exchange_list().await?;
    archive.store("exchanges", "html", &list_html);
    let exchanges = parse_exchange_list(&list_html)?;
    tracing::info!(count = exchanges.len(), "거래소 목록 수집 완료");

    let mut pair_keys = Vec::new();
    for exchange in &exchanges {
        stats.total += 1;
        tracing::info!(exchange = %exchange.slug, "거래소 상세 수집 시작");

        let detail_html = client.fetch_exchange_detail(&exchange.slug).await?;
        archive.store(&format!("exchange_{}", exchange.slug), "html", &detail_html);
        let (_summary, pairs) = parse_exchange_detail(&detail_html)?;

        for pair in &pairs {
            pair_keys.push(PairKey {
                source: pair.source.clone(),
                sink: pair.sink.clone(),
                exchange: exchange.slug.clone(),
            });
        }

        stats.success += 1;
        tracing::info!(
            exchange = %exchange.slug,
            pairs = pairs.len(),
            "거래소 상세 수집 완료"
        );
    }

    stats.elapsed = start.elapsed();
    Ok((pair_keys, stats))
}

/// `"exchange:source:sink"` 형식의 쉼표 구분 목록을 PairKey로 파싱합니다.
pub fn parse_pair_args(raw: &str) -> Result<Vec<PairKey>> {
    raw.split(',')
        .map(|entry| {
            let entry = entry.trim();
            let fields: Vec<&str> = entry.split(':').collect();
            if fields.len() != 3 || fields.iter().any(|f| f.is_empty()) {
                return Err(CollectorError::Config(format!(
                    "잘못된 페어 형식 '{}' (exchange:source:sink)",
                    entry
                )));
            }
            Ok(PairKey {
                exchange: fields[0].to_string(),
                source: fields[1].to_string(),
                sink: fields[2].to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use coincharts_data::DataError;
    use std::time::Duration;

    const EXCHANGES_HTML: &str = r#"
<table id="tableMarkets"><tbody>
<tr><td><a href="/v2/markets/show/btc-e">BTC-e</a></td><td data-sort-value="1405977068">x</td><td data-sort-value="2">2</td><td data-sort-value="100">100</td></tr>
</tbody></table>
"#;

    const DETAIL_HTML: &str = r#"
<div class="col-md-6">
  <table><tbody>
    <tr><td>Trading pairs</td><td><span>2</span></td></tr>
    <tr><td>Volume</td><td>1.00&#160;BTC</td></tr>
    <tr><td>Last updated</td><td>2014-07-21 23:53:04</td></tr>
    <tr><td>Website</td><td><a href="https://btc-e.com/">btc-e.com</a></td></tr>
  </tbody></table>
</div>
<div class="col-md-6">
  <table><tbody>
    <tr><td><a href="/v2/pair/usd/btc/btc-e">BTC/USD</a></td><td>614.5 USD</td></tr>
    <tr><td><a href="/v2/pair/usd/ltc/btc-e">LTC/USD</a></td><td>9.9 USD</td></tr>
  </tbody></table>
</div>
"#;

    #[test]
    fn test_parse_pair_args() {
        let keys = parse_pair_args("btc-e:usd:btc, btc-e:usd:ltc").unwrap();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].exchange, "btc-e");
        assert_eq!(keys[0].source, "usd");
        assert_eq!(keys[0].sink, "btc");
        assert_eq!(keys[1].series_key(), "btc-e-usd-ltc");
    }

    #[test]
    fn test_parse_pair_args_rejects_malformed_entries() {
        assert!(parse_pair_args("btc-e:usd").is_err());
        assert!(parse_pair_args("btc-e:usd:btc:extra").is_err());
        assert!(parse_pair_args("btc-e::btc").is_err());
    }

    #[tokio::test]
    async fn test_sync_exchanges_collects_pair_keys() {
        let mut server = mockito::Server::new_async().await;
        let _list_mock = server
            .mock("GET", "/v2/markets/info")
            .with_status(200)
            .with_body(EXCHANGES_HTML)
            .create_async()
            .await;
        let _detail_mock = server
            .mock("GET", "/v2/markets/show/btc-e")
            .with_status(200)
            .with_body(DETAIL_HTML)
            .create_async()
            .await;

        let archive_dir = tempfile::tempdir().unwrap();
        let archive = ResponseArchive::new(archive_dir.path());
        let mut client =
            ChartsClient::with_base_url(server.url(), Duration::from_millis(0));

        let (pairs, stats) = sync_exchanges(&mut client, &archive).await.unwrap();

        assert_eq!(
            pairs,
            vec![
                PairKey {
                    source: "usd".to_string(),
                    sink: "btc".to_string(),
                    exchange: "btc-e".to_string()
                },
                PairKey {
                    source: "usd".to_string(),
                    sink: "ltc".to_string(),
                    exchange: "btc-e".to_string()
                },
            ]
        );
        assert_eq!(stats.total, 1);
        assert_eq!(stats.success, 1);
    }

    #[tokio::test]
    async fn test_sync_exchanges_aborts_on_detail_fetch_error() {
        let mut server = mockito::Server::new_async().await;
        let _list_mock = server
            .mock("GET", "/v2/markets/info")
            .with_status(200)
            .with_body(EXCHANGES_HTML)
            .create_async()
            .await;
        let _detail_mock = server
            .mock("GET", "/v2/markets/show/btc-e")
            .with_status(503)
            .create_async()
            .await;

        let archive_dir = tempfile::tempdir().unwrap();
        let archive = ResponseArchive::new(archive_dir.path());
        let mut client =
            ChartsClient::with_base_url(server.url(), Duration::from_millis(0));

        let err = sync_exchanges(&mut client, &archive).await.unwrap_err();
        assert!(matches!(
            err,
            CollectorError::Data(DataError::Fetch { status: 503 })
        ));
    }
}
