//! 원격 시세 제공자 추상화.

pub mod coinapi;

use async_trait::async_trait;
use charts_core::PriceBar;
use chrono::{DateTime, Utc};

use crate::error::Result;

pub use coinapi::CoinApiClient;

/// 원격 시세 제공자 trait.
///
/// 수집 엔진이 제공자 구현과 무관하게 동작할 수 있도록 하는 seam입니다.
/// 테스트에서는 직접 작성한 대역으로 교체합니다.
///
/// # 계약
///
/// - `start_bucket`(포함) 이후의 바를 시간 순으로 최대 `max_count`개
///   반환합니다.
/// - 제공자에 아직 새 데이터가 없으면 빈 벡터를 반환합니다 (에러 아님).
/// - 반환되는 모든 바의 `period_end`는 6시간 격자 검증을 통과한 상태여야
///   합니다.
///
/// # Errors
///
/// - `DataError::SourceUnavailable`: 전송/인증/요청 한도 실패.
///   제공자가 알려준 남은 요청 수 힌트를 함께 전달합니다.
/// - `DataError::InvalidBucketTime`: 격자를 벗어난 응답.
///   제공자 측 형식 변경이 조용히 지나가지 않도록 데이터 대신 에러를
///   반환합니다.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// 지정한 버킷부터 바를 조회합니다.
    async fn fetch(
        &self,
        symbol: &str,
        start_bucket: DateTime<Utc>,
        max_count: u32,
    ) -> Result<Vec<PriceBar>>;
}
