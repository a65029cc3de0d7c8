//! 환경변수 기반 설정 모듈.

use crate::Result;
use std::path::Path;
use std::time::Duration;

/// Collector 전체 설정
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// 데이터베이스 URL
    pub database_url: String,
    /// 크롤 설정
    pub crawl: CrawlConfig,
    /// 데몬 모드 설정
    pub daemon: DaemonConfig,
}

/// 크롤 설정
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// 요청 사이 최소 간격 (밀리초)
    pub min_request_interval_ms: u64,
    /// 적재 배치당 행 수
    pub batch_limit: usize,
    /// 시계열 해상도 토큰 (원격 API에 그대로 전달)
    pub resolution: String,
    /// 기존 시리즈에 요청할 구간 토큰
    pub incremental_window: String,
    /// 처음 보는 시리즈에 요청할 구간 토큰
    pub initial_window: String,
    /// 원시 응답 아카이브 디렉터리
    pub archive_dir: String,
}

/// 데몬 모드 설정
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// 워크플로우 실행 주기 (분 단위)
    pub interval_minutes: u64,
}

impl CollectorConfig {
    /// 환경변수에서 설정 로드
    ///
    /// 접속 정보는 `DATABASE_URL`을 우선 사용하고, 없으면 `PGPASS_FILE`이
    /// 가리키는 콜론 구분 자격증명 파일에서 구성합니다.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = match std::env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => {
                let pgpass = std::env::var("PGPASS_FILE").map_err(|_| {
                    crate::error::CollectorError::Config(
                        "DATABASE_URL 또는 PGPASS_FILE 환경변수가 설정되지 않았습니다"
                            .to_string(),
                    )
                })?;
                coincharts_data::database_url_from_pgpass(Path::new(&pgpass))?
            }
        };

        Ok(Self {
            database_url,
            crawl: CrawlConfig {
                min_request_interval_ms: env_var_parse("CRAWL_REQUEST_INTERVAL_MS", 2000),
                batch_limit: env_var_parse("LOAD_BATCH_LIMIT", 1000),
                resolution: env_var_string("CRAWL_RESOLUTION", "1h"),
                incremental_window: env_var_string("CRAWL_INCREMENTAL_WINDOW", "10d"),
                initial_window: env_var_string("CRAWL_INITIAL_WINDOW", "alltime"),
                archive_dir: env_var_string("ARCHIVE_DIR", "data"),
            },
            daemon: DaemonConfig {
                interval_minutes: env_var_parse("DAEMON_INTERVAL_MINUTES", 60),
            },
        })
    }
}

impl CrawlConfig {
    /// 요청 사이 최소 간격을 Duration으로 반환
    pub fn min_request_interval(&self) -> Duration {
        Duration::from_millis(self.min_request_interval_ms)
    }
}

impl DaemonConfig {
    /// 워크플로우 실행 주기를 Duration으로 반환
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes * 60)
    }
}

/// 환경변수에서 값을 파싱 (실패 시 기본값 사용)
fn env_var_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// 환경변수에서 문자열 값 읽기 (없으면 기본값 사용)
fn env_var_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
