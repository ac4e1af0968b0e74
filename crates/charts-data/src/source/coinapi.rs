//! CoinAPI OHLCV 히스토리 클라이언트.
//!
//! `GET /v1/ohlcv/{symbol}/history` 엔드포인트에서 6시간 봉을 조회합니다.
//! 인증키는 `X-CoinAPI-Key` 헤더로 전달하며, 응답의
//! `X-RateLimit-Remaining` 헤더로 남은 요청 수를 추적합니다.

use async_trait::async_trait;
use charts_core::bucket::validate_bucket_time;
use charts_core::PriceBar;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{DataError, Result};
use crate::source::QuoteSource;

/// CoinAPI 기본 URL.
const DEFAULT_BASE_URL: &str = "https://rest.coinapi.io";

/// 고정 봉 주기 식별자 (6시간).
const PERIOD_ID: &str = "6HRS";

/// 남은 요청 수 헤더.
const RATE_LIMIT_REMAINING: &str = "X-RateLimit-Remaining";

/// CoinAPI 클라이언트.
#[derive(Clone)]
pub struct CoinApiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

/// OHLCV 응답 행 (CoinAPI 원본 형식).
///
/// `time_open`/`time_close` 등 사용하지 않는 필드는 역직렬화 단계에서
/// 무시됩니다.
#[derive(Debug, Deserialize)]
struct OhlcvRow {
    time_period_start: DateTime<Utc>,
    time_period_end: DateTime<Utc>,
    price_open: f64,
    price_high: f64,
    price_low: f64,
    price_close: f64,
    volume_traded: f64,
    trades_count: i64,
}

impl OhlcvRow {
    fn into_bar(self, symbol: &str) -> PriceBar {
        PriceBar {
            symbol: symbol.to_string(),
            period_start: self.time_period_start,
            period_end: self.time_period_end,
            open: self.price_open,
            high: self.price_high,
            low: self.price_low,
            close: self.price_close,
            volume: self.volume_traded,
            trade_count: self.trades_count,
        }
    }
}

impl CoinApiClient {
    /// 새로운 CoinAPI 클라이언트 생성.
    ///
    /// # Arguments
    /// * `api_key` - CoinAPI 인증키 (`COINAPI_KEY` 환경변수로 전달 권장)
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("HTTP 클라이언트 생성 실패"),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// 기본 URL 교체 (테스트용).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl QuoteSource for CoinApiClient {
    async fn fetch(
        &self,
        symbol: &str,
        start_bucket: DateTime<Utc>,
        max_count: u32,
    ) -> Result<Vec<PriceBar>> {
        // 요청에 실리는 시각도 같은 초크포인트를 거친다
        validate_bucket_time(start_bucket)?;

        let url = format!("{}/v1/ohlcv/{}/history", self.base_url, symbol);
        debug!(
            symbol = symbol,
            start = %start_bucket,
            limit = max_count,
            "CoinAPI OHLCV 요청"
        );

        let response = self
            .client
            .get(&url)
            .query(&[
                ("period_id", PERIOD_ID.to_string()),
                (
                    "time_start",
                    start_bucket.format("%Y-%m-%dT%H:%M:%S").to_string(),
                ),
                ("limit", max_count.to_string()),
            ])
            .header("X-CoinAPI-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| DataError::SourceUnavailable {
                reason: e.to_string(),
                remaining_quota: None,
            })?;

        let remaining_quota = response
            .headers()
            .get(RATE_LIMIT_REMAINING)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<i64>().ok());

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(
                symbol = symbol,
                status = %status,
                remaining_quota = ?remaining_quota,
                "CoinAPI 응답 오류"
            );
            return Err(DataError::SourceUnavailable {
                reason: format!("{}: {}", status, body),
                remaining_quota,
            });
        }

        if let Some(remaining) = remaining_quota {
            info!(remaining = remaining, "이번 기간에 남은 CoinAPI 요청 수");
        }

        let rows: Vec<OhlcvRow> = response
            .json()
            .await
            .map_err(|e| DataError::Parse(e.to_string()))?;

        let mut bars = Vec::with_capacity(rows.len());
        for row in rows {
            // 제공자 측 격자 변경이 조용히 지나가지 않도록 모든 행을 검증
            validate_bucket_time(row.time_period_end)?;
            bars.push(row.into_bar(symbol));
        }

        debug!(symbol = symbol, returned = bars.len(), "CoinAPI 응답 파싱 완료");
        Ok(bars)
    }
}
