//! cryptocoincharts.info HTTP 클라이언트.
//!
//! 프로세스 전역 상태 대신 클라이언트 구조체가 요청 횟수와 마지막 요청
//! 시각을 직접 들고 있어, 실행 단위로 생성하고 단위 테스트할 수 있습니다.
//! 요청 사이에 최소 간격이 지나지 않았으면 지터가 섞인 시간만큼 대기한 뒤
//! 요청을 발행합니다.
//!
//! ## 사용 예시
//! ```rust,ignore
//! let mut client = ChartsClient::new();
//! let html = client.fetch_exchange_list().await?;
//! ```

use rand::Rng;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::error::{DataError, Result};

/// 기본 base URL.
const DEFAULT_BASE_URL: &str = "http://www.cryptocoincharts.info";

/// 요청 사이 기본 최소 간격.
const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(2);

/// 요청 페이싱 상태.
#[derive(Debug)]
struct RequestPacer {
    /// 요청 사이 최소 간격
    min_interval: Duration,
    /// 마지막 요청이 끝난 시각
    last_request: Option<Instant>,
    /// 지금까지 발행한 요청 수
    count_requested: u64,
}

impl RequestPacer {
    fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: None,
            count_requested: 0,
        }
    }

    /// 다음 요청 전 대기 시간을 계산합니다.
    ///
    /// 남은 간격에 [1.0, 2.0) 배율의 지터를 적용합니다. 대기 시간이 남은
    /// 간격보다 짧아지지 않으므로 두 요청 사이 간격은 항상 최소 간격
    /// 이상이고, 배율이 매번 달라 요청 주기가 일정한 패턴을 띠지 않습니다.
    fn next_delay(&self) -> Option<Duration> {
        let elapsed = self.last_request?.elapsed();
        if elapsed >= self.min_interval {
            return None;
        }
        let remaining = self.min_interval - elapsed;
        let factor = 1.0 + rand::thread_rng().gen::<f64>();
        Some(remaining.mul_f64(factor))
    }

    fn record_request(&mut self) {
        self.last_request = Some(Instant::now());
        self.count_requested += 1;
    }
}

/// cryptocoincharts.info 클라이언트.
pub struct ChartsClient {
    client: reqwest::Client,
    base_url: String,
    pacer: RequestPacer,
}

impl ChartsClient {
    /// 기본 설정으로 생성 (최소 간격 2초).
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, DEFAULT_MIN_INTERVAL)
    }

    /// 커스텀 최소 간격으로 생성.
    pub fn with_interval(min_interval: Duration) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, min_interval)
    }

    /// base URL과 최소 간격을 지정하여 생성 (테스트용).
    pub fn with_base_url(base_url: impl Into<String>, min_interval: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36")
            .build()
            .expect("HTTP 클라이언트 생성 실패");

        Self {
            client,
            base_url: base_url.into(),
            pacer: RequestPacer::new(min_interval),
        }
    }

    /// 지금까지 발행한 요청 수를 반환합니다.
    pub fn count_requested(&self) -> u64 {
        self.pacer.count_requested
    }

    /// 임의 경로에 GET 요청을 발행하고 응답 본문을 그대로 반환합니다.
    ///
    /// 비정상 상태 코드는 `DataError::Fetch`로 반환하며, 재시도/건너뜀
    /// 여부는 호출자가 결정합니다.
    pub async fn fetch(&mut self, path: &str, params: &[(&str, &str)]) -> Result<String> {
        if let Some(delay) = self.pacer.next_delay() {
            info!(delay_ms = delay.as_millis() as u64, "요청 전 대기");
            tokio::time::sleep(delay).await;
        }

        debug!(path = path, "요청 발행");
        let url = format!("{}/{}", self.base_url, path);
        let response = self.client.get(&url).query(params).send().await?;
        self.pacer.record_request();

        let status = response.status();
        if !status.is_success() {
            return Err(DataError::Fetch {
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }

    /// 거래소 목록 페이지를 요청합니다.
    pub async fn fetch_exchange_list(&mut self) -> Result<String> {
        self.fetch("v2/markets/info", &[]).await
    }

    /// 단일 거래소 상세 페이지를 요청합니다.
    pub async fn fetch_exchange_detail(&mut self, slug: &str) -> Result<String> {
        self.fetch(&format!("v2/markets/show/{}", slug), &[]).await
    }

    /// 특정 거래소/페어의 가격·거래량 시계열을 요청합니다.
    ///
    /// `window`("alltime", "10d" 등)와 `resolution`("1h" 등)은 심볼릭
    /// 토큰으로, 원격 API에 그대로 전달됩니다.
    pub async fn fetch_price_volume(
        &mut self,
        source: &str,
        sink: &str,
        exchange: &str,
        window: &str,
        resolution: &str,
    ) -> Result<String> {
        let pair = format!("{}-{}", sink, source);
        self.fetch(
            "v2/fast/period.php",
            &[
                ("pair", pair.as_str()),
                ("market", exchange),
                ("time", window),
                ("resolution", resolution),
            ],
        )
        .await
    }
}

impl Default for ChartsClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_fetch_returns_body_on_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v2/markets/info")
            .with_status(200)
            .with_body("<html>exchanges</html>")
            .create_async()
            .await;

        let mut client = ChartsClient::with_base_url(server.url(), Duration::from_millis(0));
        let body = client.fetch_exchange_list().await.unwrap();

        assert_eq!(body, "<html>exchanges</html>");
        assert_eq!(client.count_requested(), 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_error_carries_status_code() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v2/markets/show/btc-e")
            .with_status(500)
            .create_async()
            .await;

        let mut client = ChartsClient::with_base_url(server.url(), Duration::from_millis(0));
        let err = client.fetch_exchange_detail("btc-e").await.unwrap_err();

        match err {
            DataError::Fetch { status } => assert_eq!(status, 500),
            other => panic!("expected fetch error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_price_volume_query_encoding() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v2/fast/period.php")
            .match_query(Matcher::AllOf(vec![
                // pair는 "{sink}-{source}" 순서
                Matcher::UrlEncoded("pair".into(), "btc-usd".into()),
                Matcher::UrlEncoded("market".into(), "btc-e".into()),
                Matcher::UrlEncoded("time".into(), "alltime".into()),
                Matcher::UrlEncoded("resolution".into(), "1h".into()),
            ]))
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let mut client = ChartsClient::with_base_url(server.url(), Duration::from_millis(0));
        let body = client
            .fetch_price_volume("usd", "btc", "btc-e", "alltime", "1h")
            .await
            .unwrap();

        assert_eq!(body, "[]");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_back_to_back_fetches_respect_min_interval() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v2/markets/info")
            .with_status(200)
            .with_body("ok")
            .expect_at_least(2)
            .create_async()
            .await;

        for interval_ms in [100u64, 250] {
            let mut client =
                ChartsClient::with_base_url(server.url(), Duration::from_millis(interval_ms));

            let start = Instant::now();
            client.fetch_exchange_list().await.unwrap();
            client.fetch_exchange_list().await.unwrap();
            let elapsed = start.elapsed();

            assert!(
                elapsed >= Duration::from_millis(interval_ms),
                "second fetch completed after {:?}, expected at least {:?}",
                elapsed,
                Duration::from_millis(interval_ms)
            );
            assert_eq!(client.count_requested(), 2);
        }
    }

    #[tokio::test]
    async fn test_first_fetch_has_no_delay() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v2/markets/info")
            .with_status(200)
            .with_body("ok")
            .create_async()
            .await;

        let mut client = ChartsClient::with_base_url(server.url(), Duration::from_secs(5));

        let start = Instant::now();
        client.fetch_exchange_list().await.unwrap();
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
