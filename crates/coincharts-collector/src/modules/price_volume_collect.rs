//! 가격/거래량 증분 수집 모듈.

use crate::config::CrawlConfig;
use crate::modules::exchange_sync::PairKey;
use crate::{CollectionStats, CollectorConfig, Result};
use chrono::NaiveDateTime;
use coincharts_data::{parse_price_volume, ChartsClient, PriceVolumeStore, ResponseArchive};
use sqlx::PgPool;
use std::collections::HashMap;
use std::time::Instant;

/// 페어별 가격/거래량 시계열을 수집하고 증분 병합합니다.
///
/// 이미 저장된 시리즈는 최근 구간만, 처음 보는 시리즈는 전체 구간을
/// 요청합니다. 개별 페어의 fetch 실패는 기록 후 건너뛰고 다음 페어를
/// 계속 처리하지만(부분 실패 격리), parse/load 실패는 실행 전체를
/// 중단시킵니다.
pub async fn collect_price_volumes(
    pool: &PgPool,
    client: &mut ChartsClient,
    archive: &ResponseArchive,
    config: &CollectorConfig,
    pairs: &[PairKey],
) -> Result<CollectionStats> {
    let start = Instant::now();
    let mut stats = CollectionStats::new();

    let store = PriceVolumeStore::new(pool.clone()).with_batch_limit(config.crawl.batch_limit);

    // 시리즈별 마지막 버킷을 한 번만 조회해 요청 구간 결정에 재사용
    let latest = store.latest_hours().await?;
    tracing::info!(series = latest.len(), "기존 시리즈 확인 완료");

    for (idx, pair) in pairs.iter().enumerate() {
        stats.total += 1;
        let key = pair.series_key();
        let window = choose_window(&latest, &key, &config.crawl);

        tracing::debug!(
            pair = %key,
            window = window,
            progress = format!("{}/{}", idx + 1, pairs.len()),
            "시계열 수집 시작"
        );

        let body = match client
            .fetch_price_volume(
                &pair.source,
                &pair.sink,
                &pair.exchange,
                window,
                &config.crawl.resolution,
            )
            .await
        {
            Ok(body) => body,
            Err(e) => {
                stats.errors += 1;
                tracing::error!(pair = %key, error = %e, "시계열 요청 실패, 건너뜀");
                continue;
            }
        };
        archive.store(
            &format!(
                "price_volume_{}_{}_{}_{}_{}",
                pair.source, pair.sink, pair.exchange, window, config.crawl.resolution
            ),
            "json",
            &body,
        );

        let rows = parse_price_volume(&body, &pair.source, &pair.sink, &pair.exchange)?;
        if rows.is_empty() {
            stats.empty += 1;
            tracing::debug!(pair = %key, "데이터 없음");
            continue;
        }

        let loaded = store.upsert(&rows).await?;
        stats.success += 1;
        stats.total_rows += loaded;
        tracing::info!(pair = %key, rows = loaded, "시계열 병합 완료");
    }

    stats.elapsed = start.elapsed();
    Ok(stats)
}

/// 시리즈 존재 여부에 따라 요청 구간을 선택합니다.
fn choose_window<'a>(
    latest: &HashMap<String, NaiveDateTime>,
    series_key: &str,
    crawl: &'a CrawlConfig,
) -> &'a str {
    if latest.contains_key(series_key) {
        crawl.incremental_window.as_str()
    } else {
        crawl.initial_window.as_str()
    }
}
