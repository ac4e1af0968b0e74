//! OHLCV 가격 바 구조체.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 한 심볼의 6시간 OHLCV 바.
///
/// `period_end`가 정렬과 수집 재개의 기준이 되는 대표 시각이며,
/// 저장소에 들어가는 모든 바의 `period_end`는 6시간 격자 위에 있어야
/// 합니다. 모든 필드는 필수입니다 (부분 레코드는 저장하지 않습니다).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// 거래 심볼 (예: "BITSTAMP_SPOT_BTC_USD")
    pub symbol: String,
    /// 기간 시작 시각
    pub period_start: DateTime<Utc>,
    /// 기간 종료 시각
    pub period_end: DateTime<Utc>,
    /// 시가
    pub open: f64,
    /// 고가
    pub high: f64,
    /// 저가
    pub low: f64,
    /// 종가
    pub close: f64,
    /// 거래량
    pub volume: f64,
    /// 체결 건수
    pub trade_count: i64,
}

impl PriceBar {
    /// 대표 시각 (기간 종료 시각).
    pub fn time(&self) -> DateTime<Utc> {
        self.period_end
    }

    /// 대표 가격 (종가).
    pub fn price(&self) -> f64 {
        self.close
    }
}
