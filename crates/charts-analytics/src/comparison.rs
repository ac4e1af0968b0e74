//! 저장소 기반 심볼 비교 서비스.
//!
//! 수집기가 채워 놓은 저장소에서 심볼별 시계열을 읽어 정규화 평균
//! 스트림을 만듭니다. 읽기 전용이며 수집과 동시에 실행해도 안전합니다.

use charts_core::bucket::{round_up_to_next_bucket, validate_bucket_time};
use charts_data::SeriesStore;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

use crate::alignment::{AlignedAverage, AnalyticsError, NormalizedSeries};

/// 비교 요청 오류.
#[derive(Debug, Error)]
pub enum ComparisonError {
    /// 저장소 조회 실패
    #[error(transparent)]
    Data(#[from] charts_data::DataError),

    /// 정규화 실패
    #[error(transparent)]
    Analytics(#[from] AnalyticsError),
}

/// 저장소에서 시계열을 읽어 비교 스트림을 만드는 서비스.
pub struct ComparisonService {
    store: SeriesStore,
}

impl ComparisonService {
    /// 새 비교 서비스를 생성합니다.
    pub fn new(store: SeriesStore) -> Self {
        Self { store }
    }

    /// 심볼들의 정규화 평균 포인트를 계산합니다.
    ///
    /// `since`가 버킷 경계가 아니면 다음 버킷으로 올림한 뒤 조회합니다.
    /// 출력은 가장 짧은 시계열 길이에 맞춰집니다.
    pub async fn compare(
        &self,
        symbols: &[String],
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<(DateTime<Utc>, f64)>, ComparisonError> {
        let since = since.map(round_since);

        let mut series = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            let bars = self.store.query(symbol, since).await?;
            debug!(symbol = %symbol, bars = bars.len(), "비교용 시계열 조회");
            series.push(NormalizedSeries::from_bars(symbol.clone(), &bars)?);
        }

        Ok(AlignedAverage::new(series).collect())
    }
}

/// `since` 경계를 버킷 격자에 맞춥니다: 이미 격자 위면 그대로,
/// 아니면 다음 버킷으로 올림.
fn round_since(t: DateTime<Utc>) -> DateTime<Utc> {
    if validate_bucket_time(t).is_ok() {
        t
    } else {
        round_up_to_next_bucket(t)
    }
}
