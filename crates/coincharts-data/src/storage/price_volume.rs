//! 가격/거래량 증분 적재 스토리지.
//!
//! 대상 테이블 `exchange_pair_hour`에 네이티브 upsert 없이 멱등 병합을
//! 수행합니다: 스테이징 테이블을 만들어 배치 삽입한 뒤, 키가 겹치는 기존
//! 행을 지우고 스테이징 내용을 통째로 옮깁니다. 전 과정이 한 트랜잭션
//! 안에서 실행되므로 실패 시 대상 테이블은 변경되지 않습니다.

use chrono::NaiveDateTime;
use coincharts_core::PriceVolumeRow;
use rand::Rng;
use rust_decimal::Decimal;
use sqlx::postgres::PgPool;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::error::{DataError, Result};

/// 기본 대상 테이블 이름.
const DEFAULT_TARGET_TABLE: &str = "exchange_pair_hour";

/// 배치당 기본 최대 행 수 (statement 크기 제한).
const DEFAULT_BATCH_LIMIT: usize = 1000;

/// 가격/거래량 시계열 저장소.
#[derive(Clone)]
pub struct PriceVolumeStore {
    pool: PgPool,
    target_table: String,
    batch_limit: usize,
}

impl PriceVolumeStore {
    /// 기본 대상 테이블로 저장소를 생성합니다.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            target_table: DEFAULT_TARGET_TABLE.to_string(),
            batch_limit: DEFAULT_BATCH_LIMIT,
        }
    }

    /// 대상 테이블을 변경합니다 (테스트용).
    pub fn with_target_table(mut self, table: impl Into<String>) -> Self {
        self.target_table = table.into();
        self
    }

    /// 배치당 행 수를 변경합니다.
    pub fn with_batch_limit(mut self, batch_limit: usize) -> Self {
        self.batch_limit = batch_limit;
        self
    }

    /// 파싱된 행 배치를 대상 테이블에 멱등 병합합니다.
    ///
    /// 하나의 트랜잭션 안에서 순서대로 수행합니다:
    /// 1. 대상과 동일한 스키마의 스테이징 테이블 생성 (임의 숫자 접미사로
    ///    동시 실행 간 이름 충돌 회피)
    /// 2. 행을 배치 단위로 스테이징 테이블에 삽입
    /// 3. (exchange, source, sink, hour) 키가 겹치는 기존 행을 대상에서 삭제
    /// 4. 스테이징 행 전체를 대상 테이블로 삽입
    /// 5. 스테이징 테이블 삭제
    /// 6. 커밋
    ///
    /// 같은 키는 마지막 쓰기가 이기고, 배치에 없는 키의 기존 이력은 건드리지
    /// 않습니다. 실패 시 트랜잭션이 롤백되어 대상 테이블은 그대로이며,
    /// 트랜잭션 안에서 만든 스테이징 테이블도 함께 사라집니다.
    pub async fn upsert(&self, rows: &[PriceVolumeRow]) -> Result<usize> {
        if rows.is_empty() {
            return Ok(0);
        }

        let staging_table = format!(
            "{}_{:010}",
            self.target_table,
            rand::thread_rng().gen_range(0u64..10_000_000_000)
        );
        debug!(staging = %staging_table, rows = rows.len(), "병합 시작");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DataError::Load(format!("begin transaction: {}", e)))?;

        sqlx::query(&format!(
            "CREATE TABLE {} (LIKE {})",
            staging_table, self.target_table
        ))
        .execute(&mut *tx)
        .await
        .map_err(|e| DataError::Load(format!("create staging table {}: {}", staging_table, e)))?;

        for chunk in rows.chunks(self.batch_limit) {
            let exchanges: Vec<&str> = chunk.iter().map(|r| r.exchange.as_str()).collect();
            let sources: Vec<&str> = chunk.iter().map(|r| r.source.as_str()).collect();
            let sinks: Vec<&str> = chunk.iter().map(|r| r.sink.as_str()).collect();
            let hours: Vec<NaiveDateTime> = chunk.iter().map(|r| r.bucket.hour()).collect();
            let price_lows: Vec<Decimal> = chunk.iter().map(|r| r.price_low).collect();
            let price_25ths: Vec<Decimal> =
                chunk.iter().map(|r| r.price_25th_percentile).collect();
            let price_75ths: Vec<Decimal> =
                chunk.iter().map(|r| r.price_75th_percentile).collect();
            let price_highs: Vec<Decimal> = chunk.iter().map(|r| r.price_high).collect();
            let price_medians: Vec<Decimal> = chunk.iter().map(|r| r.price_median).collect();
            let price_ema20s: Vec<Decimal> = chunk.iter().map(|r| r.price_ema20).collect();
            let volumes: Vec<Decimal> = chunk.iter().map(|r| r.volume).collect();
            let field_7s: Vec<Decimal> = chunk.iter().map(|r| r.field_7).collect();
            let field_8s: Vec<Decimal> = chunk.iter().map(|r| r.field_8).collect();

            sqlx::query(&format!(
                r#"
                INSERT INTO {} (
                    exchange, source, sink, hour,
                    price_low, price_25th_percentile, price_75th_percentile,
                    price_high, price_median, price_ema20, volume,
                    field_7, field_8)
                SELECT * FROM UNNEST(
                    $1::text[], $2::text[], $3::text[], $4::timestamp[],
                    $5::numeric[], $6::numeric[], $7::numeric[],
                    $8::numeric[], $9::numeric[], $10::numeric[], $11::numeric[],
                    $12::numeric[], $13::numeric[])
                "#,
                staging_table
            ))
            .bind(&exchanges)
            .bind(&sources)
            .bind(&sinks)
            .bind(&hours)
            .bind(&price_lows)
            .bind(&price_25ths)
            .bind(&price_75ths)
            .bind(&price_highs)
            .bind(&price_medians)
            .bind(&price_ema20s)
            .bind(&volumes)
            .bind(&field_7s)
            .bind(&field_8s)
            .execute(&mut *tx)
            .await
            .map_err(|e| DataError::Load(format!("insert into staging table: {}", e)))?;
        }

        // 곧 삽입할 내용과 키가 겹치는 기존 행 제거 (중복 버킷 방지)
        sqlx::query(&format!(
            r#"
            DELETE FROM {0} AS tgt
            USING {1} AS stg
            WHERE tgt.exchange = stg.exchange
              AND tgt.source = stg.source
              AND tgt.sink = stg.sink
              AND tgt.hour = stg.hour
            "#,
            self.target_table, staging_table
        ))
        .execute(&mut *tx)
        .await
        .map_err(|e| DataError::Load(format!("delete overlapping keys: {}", e)))?;

        let inserted = sqlx::query(&format!(
            "INSERT INTO {} SELECT * FROM {}",
            self.target_table, staging_table
        ))
        .execute(&mut *tx)
        .await
        .map_err(|e| DataError::Load(format!("insert into target table: {}", e)))?
        .rows_affected() as usize;

        sqlx::query(&format!("DROP TABLE {}", staging_table))
            .execute(&mut *tx)
            .await
            .map_err(|e| DataError::Load(format!("drop staging table: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| DataError::Load(format!("commit: {}", e)))?;

        info!(table = %self.target_table, rows = inserted, "가격/거래량 병합 완료");
        Ok(inserted)
    }

    /// 시리즈별 가장 최근 hour를 조회합니다.
    ///
    /// `"{exchange}-{source}-{sink}"` 키로 MAX(hour)를 돌려주며, 수집기가
    /// 증분 구간과 전체 구간 중 무엇을 요청할지 결정하는 데 사용합니다.
    pub async fn latest_hours(&self) -> Result<HashMap<String, NaiveDateTime>> {
        let rows: Vec<(String, NaiveDateTime)> = sqlx::query_as(&format!(
            r#"
            SELECT CONCAT(exchange, '-', source, '-', sink) AS exchange_pair,
                   MAX(hour) AS last_hour
            FROM {}
            GROUP BY exchange, source, sink
            ORDER BY exchange, source, sink
            "#,
            self.target_table
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DataError::Query(e.to_string()))?;

        Ok(rows.into_iter().collect())
    }

    /// 대상 테이블이 없으면 생성합니다 (테스트 및 초기 구성용).
    pub async fn ensure_target_table(&self) -> Result<()> {
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                exchange              text NOT NULL,
                source                text NOT NULL,
                sink                  text NOT NULL,
                hour                  timestamp NOT NULL,
                price_low             numeric,
                price_25th_percentile numeric,
                price_75th_percentile numeric,
                price_high            numeric,
                price_median          numeric,
                price_ema20           numeric,
                volume                numeric,
                field_7               numeric,
                field_8               numeric
            )
            "#,
            self.target_table
        ))
        .execute(&self.pool)
        .await
        .map_err(|e| DataError::Query(e.to_string()))?;
        Ok(())
    }
}
