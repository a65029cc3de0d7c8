//! Standalone scraper CLI.

use clap::{Parser, Subcommand};
use coincharts_collector::{modules, CollectorConfig};
use coincharts_core::logging::{init_logging, LogConfig};
use coincharts_data::{ChartsClient, ResponseArchive};
use sqlx::PgPool;

#[derive(Parser)]
#[command(name = "coincharts-collector")]
#[command(about = "CoinCharts Standalone Data Collector", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// 거래소 목록/상세 동기화 (트레이딩 페어 확인만)
    SyncExchanges,

    /// 가격/거래량 시계열 수집
    Collect {
        /// 특정 페어만 수집 (쉼표로 구분, 예: "btc-e:usd:btc,btc-e:usd:ltc")
        #[arg(long)]
        pairs: Option<String>,
    },

    /// 전체 워크플로우 실행 (거래소 동기화 → 시계열 수집)
    RunAll,

    /// 데몬 모드: 주기적으로 전체 워크플로우 실행
    Daemon,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    init_logging(LogConfig::new(format!(
        "coincharts_collector={0},coincharts_data={0}",
        cli.log_level
    )))?;

    tracing::info!("CoinCharts Data Collector 시작");

    let config = CollectorConfig::from_env()?;
    let pool = PgPool::connect(&config.database_url).await?;
    tracing::info!("데이터베이스 연결 성공");

    let mut client = ChartsClient::with_interval(config.crawl.min_request_interval());
    let archive = ResponseArchive::new(&config.crawl.archive_dir);

    match cli.command {
        Commands::SyncExchanges => {
            let (pairs, stats) = modules::sync_exchanges(&mut client, &archive).await?;
            tracing::info!(pairs = pairs.len(), "트레이딩 페어 확인 완료");
            stats.log_summary("거래소 동기화");
        }
        Commands::Collect { pairs } => {
            let pair_keys = match pairs {
                Some(ref raw) => modules::parse_pair_args(raw)?,
                None => modules::sync_exchanges(&mut client, &archive).await?.0,
            };
            let stats =
                modules::collect_price_volumes(&pool, &mut client, &archive, &config, &pair_keys)
                    .await?;
            stats.log_summary("시계열 수집");
        }
        Commands::RunAll => {
            run_workflow(&pool, &mut client, &archive, &config).await?;
        }
        Commands::Daemon => {
            tracing::info!(
                "=== 데몬 모드 시작 (주기: {}분) ===",
                config.daemon.interval_minutes
            );

            let mut interval = tokio::time::interval(config.daemon.interval());
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("종료 신호 수신, 데몬 종료 중...");
                        break;
                    }
                    _ = interval.tick() => {
                        if let Err(e) = run_workflow(&pool, &mut client, &archive, &config).await {
                            tracing::error!(error = %e, "워크플로우 실패");
                        }
                        tracing::info!(
                            "다음 실행: {}분 후",
                            config.daemon.interval_minutes
                        );
                    }
                }
            }
        }
    }

    pool.close().await;
    tracing::info!("CoinCharts Data Collector 종료");

    Ok(())
}

/// 전체 워크플로우: 거래소 동기화 후 발견된 페어 전체를 수집합니다.
async fn run_workflow(
    pool: &PgPool,
    client: &mut ChartsClient,
    archive: &ResponseArchive,
    config: &CollectorConfig,
) -> coincharts_collector::Result<()> {
    tracing::info!("=== 전체 워크플로우 시작 ===");

    tracing::info!("Step 1/2: 거래소 동기화");
    let (pairs, sync_stats) = modules::sync_exchanges(client, archive).await?;
    sync_stats.log_summary("거래소 동기화");

    tracing::info!("Step 2/2: 시계열 수집");
    let collect_stats =
        modules::collect_price_volumes(pool, client, archive, config, &pairs).await?;
    collect_stats.log_summary("시계열 수집");

    tracing::info!("=== 전체 워크플로우 완료 ===");
    Ok(())
}
